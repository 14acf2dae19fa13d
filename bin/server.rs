// Holiday Insights - Web Server
// REST API with Axum over the Nager.Date holiday source

use anyhow::{Context, Result};
use holiday_insights::api::router;
use holiday_insights::{init_logging, AppConfig, HolidayEngine, HolidaySource, NagerDateClient};
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.log_spec)?;

    println!("🌐 Holiday Insights - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let client = NagerDateClient::new(&config.api_base_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    println!("✓ Holiday API: {}", client.base_url());

    let source: Arc<dyn HolidaySource> = Arc::new(client);
    let engine = HolidayEngine::with_max_lookback(source, config.max_lookback_years);
    let app = router(engine);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", config.bind_addr))?;

    info!(
        "event=server_start module=server bind_addr={} max_lookback_years={}",
        config.bind_addr, config.max_lookback_years
    );
    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: /api/holidays/most-recent/NL/3");
    println!("        /api/holidays/not-weekends?year=2025&countryCodes=NL,GB");
    println!("        /api/holidays/common?year=2025&countryCode1=NL&countryCode2=GB");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
