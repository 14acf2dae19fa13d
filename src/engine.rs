// 🧮 Holiday Aggregation Engine
// Turns raw per-country, per-year holiday lists into three derived answers:
//   1. The N most recent past holidays for a country (backward year walk)
//   2. Per-country count of holidays not falling on a weekend
//   3. Dates two countries share as holidays
//
// Failure policy differs per operation and is part of the contract:
//   - recent walk: a source error stops the walk, accumulated data is returned
//   - weekday count: a source error counts as 0 for that country
//   - common holidays: a source error fails the whole call

use crate::error::{EngineError, SourceError};
use crate::holiday::{CommonHoliday, Holiday};
use crate::source::HolidaySource;
use chrono::{Datelike, Local, NaiveDate};
use log::{debug, error, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::task::{JoinHandle, JoinSet};

/// Hard stop for the backward year walk
pub const DEFAULT_MAX_LOOKBACK_YEARS: u32 = 10;

/// Upper bound on any configured lookback; keeps year arithmetic in i32 range
pub const MAX_LOOKBACK_YEARS: u32 = 1000;

type FetchResult = Result<Option<Vec<Holiday>>, SourceError>;

// ============================================================================
// RECENT HOLIDAYS RESULT
// ============================================================================

/// Why the backward walk stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Enough past holidays were found
    Complete,

    /// The source failed for `year`; holidays gathered before it are kept
    SourceFailed { year: i32, reason: String },

    /// The lookback limit was reached before enough holidays were found
    LookbackExhausted { oldest_year: i32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentHolidays {
    /// Most recent first, at most the requested count
    pub holidays: Vec<Holiday>,
    pub outcome: SearchOutcome,
    pub years_searched: u32,
}

impl RecentHolidays {
    pub fn is_complete(&self) -> bool {
        self.outcome == SearchOutcome::Complete
    }
}

// ============================================================================
// WEEKDAY COUNTS RESULT
// ============================================================================

/// What the source said for one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Fetched { holidays: usize },
    Absent,
    Failed { reason: String },
}

/// Country -> weekday holiday count, plus how each count came about
///
/// `counts` keeps the silent-zero shape: a failed fetch reads as 0.
/// `outcomes` is the side channel that tells a real zero from a failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeekdayHolidayCounts {
    pub counts: BTreeMap<String, u64>,
    pub outcomes: BTreeMap<String, FetchOutcome>,
}

impl WeekdayHolidayCounts {
    pub fn count(&self, country_code: &str) -> Option<u64> {
        self.counts.get(country_code).copied()
    }

    pub fn failed_countries(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FetchOutcome::Failed { .. }))
            .map(|(country, _)| country.as_str())
            .collect()
    }

    fn record(&mut self, country_code: String, count: u64, outcome: FetchOutcome) {
        self.counts.insert(country_code.clone(), count);
        self.outcomes.insert(country_code, outcome);
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Stateless aggregation over a shared holiday source
#[derive(Clone)]
pub struct HolidayEngine {
    source: Arc<dyn HolidaySource>,

    /// Maximum number of years the recent walk may fetch (1 ..= MAX_LOOKBACK_YEARS)
    max_lookback_years: u32,
}

impl HolidayEngine {
    pub fn new(source: Arc<dyn HolidaySource>) -> Self {
        Self::with_max_lookback(source, DEFAULT_MAX_LOOKBACK_YEARS)
    }

    pub fn with_max_lookback(source: Arc<dyn HolidaySource>, max_lookback_years: u32) -> Self {
        HolidayEngine {
            source,
            max_lookback_years: max_lookback_years.clamp(1, MAX_LOOKBACK_YEARS),
        }
    }

    pub fn max_lookback_years(&self) -> u32 {
        self.max_lookback_years
    }

    // ------------------------------------------------------------------------
    // 1. Most recent holidays
    // ------------------------------------------------------------------------

    /// Up to `count` holidays strictly before today, most recent first
    pub async fn most_recent_holidays(&self, country_code: &str, count: usize) -> RecentHolidays {
        let today = Local::now().date_naive();
        self.most_recent_holidays_as_of(country_code, count, today)
            .await
    }

    /// Same as [`most_recent_holidays`](Self::most_recent_holidays) with an explicit "today"
    ///
    /// Walks backward from `today`'s year one year at a time until `count`
    /// past holidays are gathered, the source fails, or the lookback limit
    /// is hit. The result is re-sorted as a whole before truncation, so the
    /// order does not depend on how each year's list arrived.
    pub async fn most_recent_holidays_as_of(
        &self,
        country_code: &str,
        count: usize,
        today: NaiveDate,
    ) -> RecentHolidays {
        let current_year = today.year();
        let mut past: Vec<Holiday> = Vec::new();
        let mut years_searched: u32 = 0;
        let mut outcome = SearchOutcome::Complete;

        while past.len() < count {
            if years_searched >= self.max_lookback_years {
                let oldest_year = current_year - (years_searched as i32 - 1);
                warn!(
                    "event=recent_lookback_exhausted module=engine country={} oldest_year={} found={} wanted={}",
                    country_code,
                    oldest_year,
                    past.len(),
                    count
                );
                outcome = SearchOutcome::LookbackExhausted { oldest_year };
                break;
            }

            let year = current_year - years_searched as i32;
            years_searched += 1;

            match self.source.fetch_holidays(year, country_code).await {
                Ok(Some(holidays)) => {
                    let mut in_year: Vec<Holiday> = holidays
                        .into_iter()
                        .filter(|holiday| holiday.is_before(today))
                        .collect();
                    in_year.sort_by(|a, b| b.date.cmp(&a.date));
                    past.extend(in_year);
                }
                Ok(None) => {
                    debug!(
                        "event=recent_year_absent module=engine country={} year={}",
                        country_code, year
                    );
                }
                Err(err) => {
                    warn!(
                        "event=recent_walk_stopped module=engine source={} country={} year={} error={}",
                        self.source.name(),
                        country_code,
                        year,
                        err
                    );
                    outcome = SearchOutcome::SourceFailed {
                        year,
                        reason: err.to_string(),
                    };
                    break;
                }
            }
        }

        past.sort_by(|a, b| b.date.cmp(&a.date));
        past.truncate(count);

        RecentHolidays {
            holidays: past,
            outcome,
            years_searched,
        }
    }

    // ------------------------------------------------------------------------
    // 2. Holidays not on weekends
    // ------------------------------------------------------------------------

    /// Weekday holiday count per country for `year`
    ///
    /// One fetch per distinct country, all in flight at once. A country
    /// whose fetch fails (or is absent) counts as 0.
    pub async fn holidays_not_on_weekends<S: AsRef<str>>(
        &self,
        year: i32,
        country_codes: &[S],
    ) -> WeekdayHolidayCounts {
        let distinct: BTreeSet<String> = country_codes
            .iter()
            .map(|code| code.as_ref().to_string())
            .collect();

        let mut tasks = JoinSet::new();
        for country_code in distinct.iter().cloned() {
            let source = Arc::clone(&self.source);
            tasks.spawn(async move {
                let fetched = source.fetch_holidays(year, &country_code).await;
                (country_code, fetched)
            });
        }

        let mut result = WeekdayHolidayCounts::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((country_code, Ok(Some(holidays)))) => {
                    let count = count_weekday_holidays(&holidays);
                    let outcome = FetchOutcome::Fetched {
                        holidays: holidays.len(),
                    };
                    result.record(country_code, count, outcome);
                }
                Ok((country_code, Ok(None))) => {
                    result.record(country_code, 0, FetchOutcome::Absent);
                }
                Ok((country_code, Err(err))) => {
                    warn!(
                        "event=weekday_count_failed module=engine country={} year={} error={}",
                        country_code, year, err
                    );
                    let outcome = FetchOutcome::Failed {
                        reason: err.to_string(),
                    };
                    result.record(country_code, 0, outcome);
                }
                Err(join_err) => {
                    // Country is unknown here; filled in below
                    warn!(
                        "event=weekday_task_lost module=engine year={} error={}",
                        year, join_err
                    );
                }
            }
        }

        for country_code in distinct {
            if !result.counts.contains_key(&country_code) {
                let outcome = FetchOutcome::Failed {
                    reason: SourceError::Interrupted("fetch task did not complete".to_string())
                        .to_string(),
                };
                result.record(country_code, 0, outcome);
            }
        }

        result
    }

    // ------------------------------------------------------------------------
    // 3. Common holidays
    // ------------------------------------------------------------------------

    /// Dates on which both countries have a holiday in `year`
    ///
    /// Both fetches run concurrently; the first error fails the call.
    /// An absent result on either side yields an empty list.
    pub async fn common_holidays(
        &self,
        year: i32,
        country_code1: &str,
        country_code2: &str,
    ) -> Result<Vec<CommonHoliday>, EngineError> {
        let first = self.spawn_fetch(year, country_code1);
        let second = self.spawn_fetch(year, country_code2);

        let (first, second) = tokio::try_join!(join_fetch(first), join_fetch(second))
            .map_err(|source| {
                error!(
                    "event=comparison_fetch_failed module=engine year={} error={}",
                    year, source
                );
                EngineError::ComparisonFetch { source }
            })?;

        let (Some(first), Some(second)) = (first, second) else {
            return Ok(Vec::new());
        };

        Ok(common_by_date(&first, &second))
    }

    fn spawn_fetch(&self, year: i32, country_code: &str) -> JoinHandle<FetchResult> {
        let source = Arc::clone(&self.source);
        let country_code = country_code.to_string();
        tokio::spawn(async move { source.fetch_holidays(year, &country_code).await })
    }
}

async fn join_fetch(handle: JoinHandle<FetchResult>) -> FetchResult {
    match handle.await {
        Ok(fetched) => fetched,
        Err(join_err) => Err(SourceError::Interrupted(join_err.to_string())),
    }
}

// ============================================================================
// PURE HELPERS
// ============================================================================

/// Holidays falling Monday through Friday
pub fn count_weekday_holidays(holidays: &[Holiday]) -> u64 {
    holidays.iter().filter(|holiday| !holiday.is_weekend()).count() as u64
}

/// Pair up holidays sharing a date, in `second`'s order
///
/// If `first` has several holidays on one date, the last one wins.
pub fn common_by_date(first: &[Holiday], second: &[Holiday]) -> Vec<CommonHoliday> {
    let by_date: HashMap<NaiveDate, &Holiday> =
        first.iter().map(|holiday| (holiday.date, holiday)).collect();

    second
        .iter()
        .filter_map(|holiday2| {
            by_date.get(&holiday2.date).map(|holiday1| CommonHoliday {
                date: holiday2.date,
                local_name1: holiday1.local_name.clone(),
                local_name2: holiday2.local_name.clone(),
            })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticHolidaySource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday(y: i32, m: u32, d: u32, name: &str, country: &str) -> Holiday {
        Holiday::new(date(y, m, d), name, country)
    }

    fn engine(source: StaticHolidaySource) -> (HolidayEngine, Arc<StaticHolidaySource>) {
        let source = Arc::new(source);
        let shared: Arc<dyn HolidaySource> = source.clone();
        (HolidayEngine::new(shared), source)
    }

    fn rejected(country: &str, year: i32) -> SourceError {
        SourceError::Rejected {
            country_code: country.to_string(),
            year,
            status: 404,
        }
    }

    /// Sleeps on every fetch and records how many fetches overlapped
    #[derive(Default)]
    struct SlowSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl HolidaySource for SlowSource {
        async fn fetch_holidays(&self, year: i32, country_code: &str) -> FetchResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(vec![holiday(year, 1, 1, "New Year", country_code)]))
        }
    }

    /// Panics for "PP", answers a New Year's Day for anything else
    struct PanickingSource;

    #[async_trait]
    impl HolidaySource for PanickingSource {
        async fn fetch_holidays(&self, year: i32, country_code: &str) -> FetchResult {
            if country_code == "PP" {
                panic!("source blew up for {}", country_code);
            }
            Ok(Some(vec![holiday(year, 1, 1, "New Year", country_code)]))
        }
    }

    fn names(holidays: &[Holiday]) -> Vec<&str> {
        holidays.iter().map(|h| h.local_name.as_str()).collect()
    }

    // ------------------------------------------------------------------------
    // Most recent
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_recent_returns_last_n_before_today() {
        let today = date(2025, 6, 10);
        let (engine, _) = engine(StaticHolidaySource::new().with_holidays(
            2025,
            "NL",
            vec![
                holiday(2025, 6, 7, "Three Days Ago", "NL"),
                holiday(2025, 6, 9, "Yesterday", "NL"),
                holiday(2025, 6, 8, "Day Before", "NL"),
            ],
        ));

        let recent = engine.most_recent_holidays_as_of("NL", 2, today).await;

        assert_eq!(names(&recent.holidays), vec!["Yesterday", "Day Before"]);
        assert!(recent.is_complete());
        assert_eq!(recent.years_searched, 1);
    }

    #[tokio::test]
    async fn test_recent_excludes_today_and_future() {
        let today = date(2025, 4, 27);
        let (engine, _) = engine(
            StaticHolidaySource::new()
                .with_holidays(
                    2025,
                    "NL",
                    vec![
                        holiday(2025, 1, 1, "Nieuwjaarsdag", "NL"),
                        holiday(2025, 4, 27, "Koningsdag", "NL"),
                        holiday(2025, 12, 25, "Kerstmis", "NL"),
                    ],
                )
                .with_holidays(2024, "NL", vec![holiday(2024, 12, 26, "Tweede Kerstdag", "NL")]),
        );

        let recent = engine.most_recent_holidays_as_of("NL", 2, today).await;

        assert_eq!(names(&recent.holidays), vec!["Nieuwjaarsdag", "Tweede Kerstdag"]);
        assert!(recent.holidays.iter().all(|h| h.date < today));
        assert_eq!(recent.years_searched, 2);
    }

    #[tokio::test]
    async fn test_recent_walks_back_and_orders_globally() {
        let today = date(2025, 3, 1);
        let (engine, source) = engine(
            StaticHolidaySource::new()
                .with_holidays(2025, "GB", vec![holiday(2025, 1, 1, "New Year's Day", "GB")])
                .with_holidays(
                    2024,
                    "GB",
                    vec![
                        holiday(2024, 1, 1, "New Year's Day 2024", "GB"),
                        holiday(2024, 12, 25, "Christmas Day", "GB"),
                        holiday(2024, 12, 26, "Boxing Day", "GB"),
                    ],
                ),
        );

        let recent = engine.most_recent_holidays_as_of("GB", 3, today).await;

        assert_eq!(
            names(&recent.holidays),
            vec!["New Year's Day", "Boxing Day", "Christmas Day"]
        );
        assert!(recent
            .holidays
            .windows(2)
            .all(|pair| pair[0].date > pair[1].date));
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_recent_zero_count_fetches_nothing() {
        let (engine, source) =
            engine(StaticHolidaySource::new().with_fallback_holidays(vec![holiday(2020, 1, 1, "x", "NL")]));

        let recent = engine.most_recent_holidays_as_of("NL", 0, date(2025, 1, 2)).await;

        assert!(recent.holidays.is_empty());
        assert!(recent.is_complete());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_recent_source_failure_returns_empty_not_error() {
        let (engine, source) = engine(
            StaticHolidaySource::new().with_fallback_failure(SourceError::Unreachable {
                country_code: "NL".to_string(),
                year: 2025,
                message: "API is not reachable".to_string(),
            }),
        );

        let recent = engine.most_recent_holidays_as_of("NL", 3, date(2025, 6, 1)).await;

        assert!(recent.holidays.is_empty());
        assert!(matches!(
            recent.outcome,
            SearchOutcome::SourceFailed { year: 2025, .. }
        ));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_recent_failure_keeps_accumulated() {
        let today = date(2025, 6, 1);
        let (engine, _) = engine(
            StaticHolidaySource::new()
                .with_holidays(2025, "NL", vec![holiday(2025, 5, 5, "Bevrijdingsdag", "NL")])
                .with_failure(2024, "NL", rejected("NL", 2024)),
        );

        let recent = engine.most_recent_holidays_as_of("NL", 4, today).await;

        assert_eq!(names(&recent.holidays), vec!["Bevrijdingsdag"]);
        assert!(matches!(
            recent.outcome,
            SearchOutcome::SourceFailed { year: 2024, .. }
        ));
    }

    #[tokio::test]
    async fn test_recent_terminates_when_source_never_has_past_dates() {
        // Always succeeds, never returns anything in the past
        let source = Arc::new(
            StaticHolidaySource::new()
                .with_fallback_holidays(vec![holiday(2999, 1, 1, "Far Future", "NL")]),
        );
        let shared: Arc<dyn HolidaySource> = source.clone();
        let engine = HolidayEngine::with_max_lookback(shared, 5);

        let recent = engine.most_recent_holidays_as_of("NL", 3, date(2025, 6, 1)).await;

        assert!(recent.holidays.is_empty());
        assert_eq!(
            recent.outcome,
            SearchOutcome::LookbackExhausted { oldest_year: 2021 }
        );
        assert_eq!(recent.years_searched, 5);
        assert_eq!(source.call_count(), 5);
    }

    #[tokio::test]
    async fn test_recent_absent_years_count_toward_lookback() {
        let source = Arc::new(StaticHolidaySource::new());
        let shared: Arc<dyn HolidaySource> = source.clone();
        let engine = HolidayEngine::with_max_lookback(shared, 3);

        let recent = engine.most_recent_holidays_as_of("NL", 1, date(2025, 6, 1)).await;

        assert!(matches!(recent.outcome, SearchOutcome::LookbackExhausted { .. }));
        assert_eq!(source.call_count(), 3);
    }

    #[test]
    fn test_lookback_is_at_least_one_year() {
        let shared: Arc<dyn HolidaySource> = Arc::new(StaticHolidaySource::new());
        let engine = HolidayEngine::with_max_lookback(shared, 0);
        assert_eq!(engine.max_lookback_years(), 1);
    }

    #[test]
    fn test_lookback_is_capped() {
        let shared: Arc<dyn HolidaySource> = Arc::new(StaticHolidaySource::new());
        let engine = HolidayEngine::with_max_lookback(shared, u32::MAX);
        assert_eq!(engine.max_lookback_years(), MAX_LOOKBACK_YEARS);
    }

    #[tokio::test]
    async fn test_recent_at_cap_reports_oldest_year() {
        let source = Arc::new(StaticHolidaySource::new());
        let shared: Arc<dyn HolidaySource> = source.clone();
        let engine = HolidayEngine::with_max_lookback(shared, u32::MAX);

        let recent = engine.most_recent_holidays_as_of("NL", 1, date(2025, 6, 1)).await;

        assert_eq!(
            recent.outcome,
            SearchOutcome::LookbackExhausted { oldest_year: 2025 - 999 }
        );
        assert_eq!(source.call_count(), MAX_LOOKBACK_YEARS as usize);
    }

    // ------------------------------------------------------------------------
    // Not on weekends
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_weekday_count_scenario() {
        let (engine, _) = engine(StaticHolidaySource::new().with_holidays(
            2025,
            "NL",
            vec![
                holiday(2025, 1, 1, "New Year", "NL"), // Wednesday
                holiday(2025, 1, 4, "Weekend", "NL"),  // Saturday
            ],
        ));

        let counts = engine.holidays_not_on_weekends(2025, &["NL"]).await;

        assert_eq!(counts.count("NL"), Some(1));
        assert_eq!(
            counts.outcomes["NL"],
            FetchOutcome::Fetched { holidays: 2 }
        );
    }

    #[tokio::test]
    async fn test_weekday_count_per_country() {
        let (engine, _) = engine(
            StaticHolidaySource::new()
                .with_holidays(
                    2025,
                    "NL",
                    vec![
                        holiday(2025, 1, 1, "New Year", "NL"),
                        holiday(2025, 1, 4, "Weekend", "NL"),
                        holiday(2025, 1, 5, "Weekend", "NL"),
                    ],
                )
                .with_holidays(
                    2025,
                    "GB",
                    vec![
                        holiday(2025, 1, 1, "New Year", "GB"),
                        holiday(2025, 1, 4, "Weekend", "GB"),
                    ],
                ),
        );

        let codes = vec!["NL".to_string(), "GB".to_string()];
        let counts = engine.holidays_not_on_weekends(2025, &codes).await;

        assert_eq!(counts.counts.len(), 2);
        assert_eq!(counts.count("NL"), Some(1));
        assert_eq!(counts.count("GB"), Some(1));
        assert!(counts.failed_countries().is_empty());
    }

    #[tokio::test]
    async fn test_weekday_count_failure_is_zero_with_diagnostic() {
        let (engine, _) = engine(
            StaticHolidaySource::new()
                .with_holidays(2025, "NL", vec![holiday(2025, 1, 1, "New Year", "NL")])
                .with_failure(2025, "XX", rejected("XX", 2025))
                .with_absent(2025, "GB"),
        );

        let counts = engine
            .holidays_not_on_weekends(2025, &["NL", "XX", "GB"])
            .await;

        assert_eq!(counts.count("NL"), Some(1));
        assert_eq!(counts.count("XX"), Some(0));
        assert_eq!(counts.count("GB"), Some(0));
        assert_eq!(counts.failed_countries(), vec!["XX"]);
        assert_eq!(counts.outcomes["GB"], FetchOutcome::Absent);
    }

    #[tokio::test]
    async fn test_weekday_count_duplicate_codes_fetch_once() {
        let (engine, source) = engine(
            StaticHolidaySource::new()
                .with_holidays(2025, "NL", vec![holiday(2025, 1, 1, "New Year", "NL")]),
        );

        let counts = engine.holidays_not_on_weekends(2025, &["NL", "NL"]).await;

        assert_eq!(counts.counts.len(), 1);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_weekday_count_empty_input() {
        let (engine, source) = engine(StaticHolidaySource::new());
        let codes: Vec<String> = Vec::new();

        let counts = engine.holidays_not_on_weekends(2025, &codes).await;

        assert!(counts.counts.is_empty());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_weekday_fetches_run_concurrently() {
        let source = Arc::new(SlowSource::default());
        let shared: Arc<dyn HolidaySource> = source.clone();
        let engine = HolidayEngine::new(shared);

        let counts = engine
            .holidays_not_on_weekends(2025, &["NL", "GB", "DE"])
            .await;

        assert_eq!(counts.counts.len(), 3);
        assert_eq!(source.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_weekday_lost_task_counts_as_failed_zero() {
        let engine = HolidayEngine::new(Arc::new(PanickingSource));

        let counts = engine
            .holidays_not_on_weekends(2025, &["NL", "PP", "GB"])
            .await;

        assert_eq!(counts.counts.len(), 3);
        assert_eq!(counts.count("PP"), Some(0));
        assert_eq!(counts.count("NL"), Some(1));
        assert_eq!(counts.failed_countries(), vec!["PP"]);
        match &counts.outcomes["PP"] {
            FetchOutcome::Failed { reason } => assert!(reason.contains("interrupted")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_count_weekday_holidays_bounded_by_total() {
        let holidays = vec![
            holiday(2025, 12, 25, "Thu", "GB"),
            holiday(2025, 12, 26, "Fri", "GB"),
            holiday(2025, 12, 27, "Sat", "GB"),
            holiday(2025, 12, 28, "Sun", "GB"),
        ];
        let count = count_weekday_holidays(&holidays);
        assert_eq!(count, 2);
        assert!(count <= holidays.len() as u64);
    }

    // ------------------------------------------------------------------------
    // Common holidays
    // ------------------------------------------------------------------------

    fn nl_gb_source() -> StaticHolidaySource {
        StaticHolidaySource::new()
            .with_holidays(2025, "NL", vec![holiday(2025, 1, 1, "Nieuwjaarsdag", "NL")])
            .with_holidays(
                2025,
                "GB",
                vec![
                    holiday(2025, 1, 1, "New Year's Day", "GB"),
                    holiday(2025, 12, 26, "Boxing Day", "GB"),
                ],
            )
    }

    #[tokio::test]
    async fn test_common_scenario() {
        let (engine, _) = engine(nl_gb_source());

        let common = engine.common_holidays(2025, "NL", "GB").await.unwrap();

        assert_eq!(
            common,
            vec![CommonHoliday {
                date: date(2025, 1, 1),
                local_name1: "Nieuwjaarsdag".to_string(),
                local_name2: "New Year's Day".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_common_swapped_swaps_names_not_dates() {
        let (engine, _) = engine(nl_gb_source());

        let forward = engine.common_holidays(2025, "NL", "GB").await.unwrap();
        let backward = engine.common_holidays(2025, "GB", "NL").await.unwrap();

        let forward_dates: BTreeSet<NaiveDate> = forward.iter().map(|c| c.date).collect();
        let backward_dates: BTreeSet<NaiveDate> = backward.iter().map(|c| c.date).collect();
        assert_eq!(forward_dates, backward_dates);
        assert_eq!(backward[0].local_name1, "New Year's Day");
        assert_eq!(backward[0].local_name2, "Nieuwjaarsdag");
    }

    #[tokio::test]
    async fn test_common_absent_side_is_empty() {
        let (engine, _) = engine(nl_gb_source().with_absent(2025, "BE"));

        assert!(engine.common_holidays(2025, "NL", "BE").await.unwrap().is_empty());
        assert!(engine.common_holidays(2025, "BE", "GB").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_common_failure_propagates() {
        let (engine, _) = engine(nl_gb_source().with_failure(2025, "XX", rejected("XX", 2025)));

        let err = engine.common_holidays(2025, "NL", "XX").await.unwrap_err();

        assert_eq!(err.to_string(), "failed to fetch holidays for comparison");
        assert!(matches!(err.source_error(), SourceError::Rejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_common_fetches_run_concurrently() {
        let source = Arc::new(SlowSource::default());
        let shared: Arc<dyn HolidaySource> = source.clone();
        let engine = HolidayEngine::new(shared);

        let common = engine.common_holidays(2025, "NL", "GB").await.unwrap();

        assert_eq!(common.len(), 1);
        assert_eq!(source.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_common_lost_task_is_interrupted_comparison_error() {
        let engine = HolidayEngine::new(Arc::new(PanickingSource));

        let err = engine.common_holidays(2025, "NL", "PP").await.unwrap_err();

        assert_eq!(err.to_string(), "failed to fetch holidays for comparison");
        assert!(matches!(err.source_error(), SourceError::Interrupted(_)));
    }

    #[test]
    fn test_common_by_date_disjoint_and_identical() {
        let first = vec![
            holiday(2025, 1, 1, "A", "NL"),
            holiday(2025, 4, 27, "B", "NL"),
        ];
        let disjoint = vec![holiday(2025, 7, 4, "C", "US")];

        assert!(common_by_date(&first, &disjoint).is_empty());

        let same = common_by_date(&first, &first);
        assert_eq!(same.len(), first.len());
        let dates: BTreeSet<NaiveDate> = same.iter().map(|c| c.date).collect();
        assert_eq!(dates.len(), first.len());
    }

    #[test]
    fn test_common_by_date_follows_second_order_and_last_write_wins() {
        let first = vec![
            holiday(2025, 1, 1, "Old Name", "NL"),
            holiday(2025, 12, 25, "Kerstmis", "NL"),
            holiday(2025, 1, 1, "Nieuwjaarsdag", "NL"),
        ];
        let second = vec![
            holiday(2025, 12, 25, "Christmas Day", "GB"),
            holiday(2025, 1, 1, "New Year's Day", "GB"),
        ];

        let common = common_by_date(&first, &second);

        assert_eq!(common.len(), 2);
        assert_eq!(common[0].date, date(2025, 12, 25));
        assert_eq!(common[1].local_name1, "Nieuwjaarsdag");
    }
}
