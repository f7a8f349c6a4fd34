//! Tracing subscriber setup shared by the binaries

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Library target; its logs (training warnings, artifact saves) must reach
/// every binary, not only the server.
const LIBRARY_TARGET: &str = "student_pass_predictor";

/// Install the global subscriber. `RUST_LOG` directives are kept; the
/// configured level applies to the library, `target` and `tower_http`.
pub fn init(logging: &LoggingConfig, target: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(logging, target)?);

    match logging.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

fn env_filter(logging: &LoggingConfig, target: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env()
        .add_directive(format!("{}={}", LIBRARY_TARGET, logging.level).parse()?)
        .add_directive(format!("tower_http={}", logging.level).parse()?);

    if target != LIBRARY_TARGET {
        filter = filter.add_directive(format!("{}={}", target, logging.level).parse()?);
    }

    Ok(filter)
}
