// Holiday Insights - CLI
//   holiday-insights recent <CC> <COUNT>
//   holiday-insights weekdays <YEAR> <CC> [<CC>...]
//   holiday-insights common <YEAR> <CC1> <CC2>
// Add --json anywhere for machine-readable output.

use anyhow::{anyhow, bail, Context, Result};
use holiday_insights::validation::{validate_country_code, validate_country_codes, validate_year};
use holiday_insights::{
    init_logging, AppConfig, FetchOutcome, HolidayEngine, HolidaySource, NagerDateClient,
    SearchOutcome, ValidationError,
};
use std::env;
use std::sync::Arc;

const USAGE: &str = "Usage:
  holiday-insights recent <CC> <COUNT>
  holiday-insights weekdays <YEAR> <CC> [<CC>...]
  holiday-insights common <YEAR> <CC1> <CC2>
Options:
  --json    print JSON instead of text";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let json = take_flag(&mut args, "--json");

    if args.is_empty() || args[0] == "help" || args[0] == "--help" {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.log_spec)?;

    let client = NagerDateClient::new(&config.api_base_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let source: Arc<dyn HolidaySource> = Arc::new(client);
    let engine = HolidayEngine::with_max_lookback(source, config.max_lookback_years);

    match args[0].as_str() {
        "recent" => run_recent(&engine, &args[1..], json).await,
        "weekdays" => run_weekdays(&engine, &args[1..], json).await,
        "common" => run_common(&engine, &args[1..], json).await,
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|arg| arg != flag);
    args.len() != before
}

fn invalid(errors: Vec<ValidationError>) -> anyhow::Error {
    let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
    anyhow!("Invalid arguments:\n{}", lines.join("\n"))
}

fn parse_year(raw: &str) -> Result<i32> {
    let year: i32 = raw
        .parse()
        .with_context(|| format!("Year must be a whole number, got {:?}", raw))?;
    validate_year(year).map_err(|e| invalid(vec![e]))?;
    Ok(year)
}

async fn run_recent(engine: &HolidayEngine, args: &[String], json: bool) -> Result<()> {
    let [country_code, count] = args else {
        bail!("recent expects <CC> <COUNT>\n\n{}", USAGE);
    };
    validate_country_code("countryCode", country_code).map_err(|e| invalid(vec![e]))?;
    let count: usize = count
        .parse()
        .with_context(|| format!("Count must be a non-negative integer, got {:?}", count))?;

    let recent = engine.most_recent_holidays(country_code, count).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&recent)?);
        return Ok(());
    }

    println!("📅 {} most recent holidays in {}", count, country_code);
    for holiday in &recent.holidays {
        println!("  {}  {} ({})", holiday.date, holiday.local_name, holiday.name);
    }
    match &recent.outcome {
        SearchOutcome::Complete => {}
        SearchOutcome::SourceFailed { year, reason } => {
            eprintln!("⚠️  Stopped at {}: {}", year, reason);
        }
        SearchOutcome::LookbackExhausted { oldest_year } => {
            eprintln!(
                "⚠️  Only {} found back to {} (lookback limit reached)",
                recent.holidays.len(),
                oldest_year
            );
        }
    }
    Ok(())
}

async fn run_weekdays(engine: &HolidayEngine, args: &[String], json: bool) -> Result<()> {
    let Some((year, codes)) = args.split_first() else {
        bail!("weekdays expects <YEAR> <CC> [<CC>...]\n\n{}", USAGE);
    };
    let year = parse_year(year)?;
    validate_country_codes(codes).map_err(invalid)?;

    let counts = engine.holidays_not_on_weekends(year, codes).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    println!("🗓️  Holidays not on weekends in {}", year);
    for (country_code, count) in &counts.counts {
        let note = match counts.outcomes.get(country_code) {
            Some(FetchOutcome::Failed { reason }) => format!("  ⚠️  fetch failed: {}", reason),
            Some(FetchOutcome::Absent) => "  (no data)".to_string(),
            _ => String::new(),
        };
        println!("  {}: {}{}", country_code, count, note);
    }
    Ok(())
}

async fn run_common(engine: &HolidayEngine, args: &[String], json: bool) -> Result<()> {
    let [year, first, second] = args else {
        bail!("common expects <YEAR> <CC1> <CC2>\n\n{}", USAGE);
    };
    let year = parse_year(year)?;
    let errors: Vec<ValidationError> = [
        validate_country_code("countryCode1", first),
        validate_country_code("countryCode2", second),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();
    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    let common = engine.common_holidays(year, first, second).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&common)?);
        return Ok(());
    }

    println!("🤝 Common holidays for {} and {} in {}", first, second, year);
    if common.is_empty() {
        println!("  (none)");
    }
    for holiday in &common {
        println!(
            "  {}  {} / {}",
            holiday.date, holiday.local_name1, holiday.local_name2
        );
    }
    Ok(())
}
