//! check_haproxy_health binary

use check_haproxy_health::{Args, Config, PluginOutput};
use clap::Parser;
use std::process::ExitCode;

/// Argument errors are UNKNOWN, not clap's default of 2 (CRITICAL).
const EXIT_UNKNOWN: u8 = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_UNKNOWN } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    // Loaded before logging is up; failures are reported on stdout
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return emit(PluginOutput::fatal(e)),
    };
    let settings = config.resolve(&args);

    if let Err(e) = check_haproxy_health::init_logging(&settings) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    tracing::debug!(?settings, "Resolved settings");

    let output = check_haproxy_health::run(&args, &settings)
        .await
        .unwrap_or_else(|e| {
            tracing::debug!(error = ?e, "Check failed");
            PluginOutput::fatal(e)
        });
    emit(output)
}

fn emit(output: PluginOutput) -> ExitCode {
    println!("{}", output.text);
    ExitCode::from(output.exit_code)
}
