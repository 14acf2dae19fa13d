// Holiday Insights - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod config;
pub mod engine;
pub mod error;
pub mod holiday;
pub mod logging;
pub mod nager;
pub mod source;
pub mod validation;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::AppConfig;
pub use engine::{
    common_by_date, count_weekday_holidays, FetchOutcome, HolidayEngine, RecentHolidays,
    SearchOutcome, WeekdayHolidayCounts, DEFAULT_MAX_LOOKBACK_YEARS,
};
pub use error::{EngineError, SourceError, ValidationError};
pub use holiday::{CommonHoliday, Holiday};
pub use logging::init_logging;
pub use nager::NagerDateClient;
pub use source::{HolidaySource, StaticHolidaySource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
