// 📝 Logging bootstrap
// One stderr logger per process; library code only talks to the `log` facade.

use anyhow::{anyhow, Result};
use flexi_logger::{Logger, LoggerHandle};
use log::info;
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Start the process logger with a flexi_logger spec ("info", "warn, holiday_insights=debug", ...)
///
/// `RUST_LOG` wins over `spec` when set. Calling again after a successful
/// start is a no-op.
pub fn init_logging(spec: &str) -> Result<()> {
    LOGGER.get_or_try_init(|| -> Result<LoggerHandle> {
        let handle = Logger::try_with_env_or_str(spec)
            .map_err(|err| anyhow!("invalid log spec `{}`: {}", spec, err))?
            .log_to_stderr()
            .format(flexi_logger::detailed_format)
            .start()
            .map_err(|err| anyhow!("failed to start logger: {}", err))?;

        info!(
            "event=logging_ready module=logging spec={} version={}",
            spec,
            env!("CARGO_PKG_VERSION")
        );
        Ok(handle)
    })?;

    Ok(())
}
