use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// sqlx logs every statement at info; keep it at warn unless asked otherwise.
const QUIET_DEPENDENCIES: &str = "sqlx=warn";

pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(default_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn default_directives(level: &str) -> String {
    if level.contains("sqlx") {
        level.to_string()
    } else {
        format!("{level},{QUIET_DEPENDENCIES}")
    }
}
