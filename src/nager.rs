// 🌍 Nager.Date Client - HTTP holiday source
// GET {base_url}/PublicHolidays/{year}/{countryCode}

use crate::error::SourceError;
use crate::holiday::Holiday;
use crate::source::HolidaySource;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://date.nager.at/api/v3";

#[derive(Debug, Clone)]
pub struct NagerDateClient {
    client: Client,
    base_url: String,
}

impl NagerDateClient {
    /// Build a client with its own connection pool and per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        NagerDateClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn holidays_url(&self, year: i32, country_code: &str) -> String {
        format!("{}/PublicHolidays/{}/{}", self.base_url, year, country_code)
    }
}

#[async_trait]
impl HolidaySource for NagerDateClient {
    async fn fetch_holidays(
        &self,
        year: i32,
        country_code: &str,
    ) -> Result<Option<Vec<Holiday>>, SourceError> {
        let url = self.holidays_url(year, country_code);
        debug!("event=holiday_fetch module=nager url={}", url);

        let unreachable = |err: reqwest::Error| SourceError::Unreachable {
            country_code: country_code.to_string(),
            year,
            message: err.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(unreachable)?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status.is_client_error() {
            return Err(SourceError::Rejected {
                country_code: country_code.to_string(),
                year,
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                country_code: country_code.to_string(),
                year,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(unreachable)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        // A literal `null` body is absent too
        serde_json::from_slice::<Option<Vec<Holiday>>>(&body).map_err(|err| SourceError::Decode {
            country_code: country_code.to_string(),
            year,
            message: err.to_string(),
        })
    }

    fn name(&self) -> &str {
        "NagerDateClient"
    }
}
