// 🗓️ Holiday Records - Values fetched from the holiday source
// A holiday is a value, not an entity: (date, country_code) is all the identity it has.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// HOLIDAY
// ============================================================================

/// One public holiday as reported by the upstream source
///
/// Field names follow the upstream JSON (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub date: NaiveDate,

    /// Name in the country's own language
    pub local_name: String,

    /// Common (English) name
    pub name: String,

    /// ISO 3166-1 alpha-2
    pub country_code: String,

    #[serde(default)]
    pub fixed: bool,

    /// Observed nationwide
    #[serde(default)]
    pub global: bool,

    /// Subdivision codes (empty = nationwide)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub counties: Vec<String>,

    #[serde(default)]
    pub launch_year: Option<i32>,

    /// Category tags (Public, Bank, School, ...)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub types: Vec<String>,
}

impl Holiday {
    /// Build a nationwide public holiday with the same local and common name
    pub fn new(date: NaiveDate, local_name: &str, country_code: &str) -> Self {
        Holiday {
            date,
            local_name: local_name.to_string(),
            name: local_name.to_string(),
            country_code: country_code.to_string(),
            fixed: false,
            global: true,
            counties: Vec::new(),
            launch_year: None,
            types: vec!["Public".to_string()],
        }
    }

    /// Saturday or Sunday
    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Strictly earlier than `date` (same day is not past)
    pub fn is_before(&self, date: NaiveDate) -> bool {
        self.date < date
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// COMMON HOLIDAY
// ============================================================================

/// A date both compared countries observe, with each country's local name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonHoliday {
    pub date: NaiveDate,

    #[serde(rename = "localName1")]
    pub local_name1: String,

    #[serde(rename = "localName2")]
    pub local_name2: String,
}

// ============================================================================
// TESTS
// ============================================================================
