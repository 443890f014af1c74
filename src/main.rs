use std::process::ExitCode;

use tracing::{debug, info};

use microthrottle::{lifecycle, metrics, telemetry, ProcThrottler, Shutdown, ThrottleConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = telemetry::init_logging() {
        eprintln!("microthrottle: {}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(iterations) => {
            info!(iterations, "all processes resumed, exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("microthrottle: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> microthrottle::Result<u64> {
    let config = ThrottleConfig::default();

    lifecycle::check_privilege()?;
    lifecycle::check_single_cpu()?;
    lifecycle::raise_priority(config.priority)?;

    let shutdown = Shutdown::new();
    lifecycle::listen_for_shutdown(shutdown.clone())?;

    metrics::init();
    if let Ok(json) = serde_json::to_string(&config) {
        debug!(config = %json, "effective configuration");
    }

    let mut throttler = ProcThrottler::from_config(&config)?;
    info!(
        setpoint = config.setpoint,
        quantum_ms = config.quantum.as_millis() as u64,
        "throttling unprivileged processes"
    );

    let iterations = throttler.run(&shutdown).await?;
    debug!(metrics = %metrics::render(), "final metrics");

    Ok(iterations)
}
