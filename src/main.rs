use std::io::Write;

use tracing::info;

use container_probe::{logging, Config, ProbeReport, PKG_VERSION};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;
    logging::init(&config.logging)?;
    config.log_summary();

    info!("container_probe {}", PKG_VERSION);

    let probe = config.probe.probe();
    let report = ProbeReport::collect(&probe, config.probe.host_memory()?);

    writeln!(std::io::stdout(), "{}", report.to_json()?)?;
    Ok(())
}
