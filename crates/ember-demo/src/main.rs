use std::process::ExitCode;

use ember_engine::device::GpuInit;
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::window::{process_exit_code, BootStrategy, Runtime, RuntimeConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let mut config = RuntimeConfig {
        title: "ember triangle".to_string(),
        ..Default::default()
    };

    // The scheduling variant is an environment choice, not a flag: the demo
    // defaults to the cooperative (event-driven) boot and EMBER_BOOT=blocking
    // selects the synchronous one.
    if std::env::var("EMBER_BOOT").as_deref() == Ok("blocking") {
        config.boot = BootStrategy::Blocking;
    }

    let result = Runtime::run(config, GpuInit::default());
    match &result {
        Ok(outcome) => log::info!("run finished: {outcome:?}"),
        Err(err) => log::error!("fatal: {err:#}"),
    }

    ExitCode::from(process_exit_code(&result))
}
