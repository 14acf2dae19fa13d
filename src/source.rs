// 🔌 Holiday Source - "all holidays for country X in year Y"
// The only outbound capability the engine depends on.

use crate::error::SourceError;
use crate::holiday::Holiday;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// CAPABILITY
// ============================================================================

/// Fetches one country's holidays for one year
///
/// - `Ok(Some(list))` - upstream answered with data (order unspecified)
/// - `Ok(None)` - upstream answered with nothing (absent, not an error)
/// - `Err(_)` - retrieval failed
#[async_trait]
pub trait HolidaySource: Send + Sync {
    async fn fetch_holidays(
        &self,
        year: i32,
        country_code: &str,
    ) -> Result<Option<Vec<Holiday>>, SourceError>;

    /// Name used in log lines
    fn name(&self) -> &str {
        "HolidaySource"
    }
}

// ============================================================================
// STATIC SOURCE
// ============================================================================

#[derive(Debug, Clone)]
enum Entry {
    Holidays(Vec<Holiday>),
    Absent,
    Failure(SourceError),
}

/// In-memory source seeded per (year, country)
///
/// Unseeded keys answer absent unless a fallback is set. Every call is
/// counted, which lets tests assert how many fetches an operation made.
#[derive(Debug, Default)]
pub struct StaticHolidaySource {
    entries: HashMap<(i32, String), Entry>,
    fallback: Option<Entry>,
    calls: AtomicUsize,
}

impl StaticHolidaySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holidays(mut self, year: i32, country_code: &str, holidays: Vec<Holiday>) -> Self {
        self.entries
            .insert((year, country_code.to_string()), Entry::Holidays(holidays));
        self
    }

    pub fn with_absent(mut self, year: i32, country_code: &str) -> Self {
        self.entries
            .insert((year, country_code.to_string()), Entry::Absent);
        self
    }

    pub fn with_failure(mut self, year: i32, country_code: &str, error: SourceError) -> Self {
        self.entries
            .insert((year, country_code.to_string()), Entry::Failure(error));
        self
    }

    /// Answer for every unseeded (year, country) with this list
    pub fn with_fallback_holidays(mut self, holidays: Vec<Holiday>) -> Self {
        self.fallback = Some(Entry::Holidays(holidays));
        self
    }

    /// Fail every unseeded (year, country) with this error
    pub fn with_fallback_failure(mut self, error: SourceError) -> Self {
        self.fallback = Some(Entry::Failure(error));
        self
    }

    /// Number of fetches served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HolidaySource for StaticHolidaySource {
    async fn fetch_holidays(
        &self,
        year: i32,
        country_code: &str,
    ) -> Result<Option<Vec<Holiday>>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let entry = self
            .entries
            .get(&(year, country_code.to_string()))
            .or(self.fallback.as_ref());

        match entry {
            Some(Entry::Holidays(holidays)) => Ok(Some(holidays.clone())),
            Some(Entry::Failure(error)) => Err(error.clone()),
            Some(Entry::Absent) | None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "StaticHolidaySource"
    }
}
