use std::fs;
use std::io;
use std::path::Path;

use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use psmplotter::{PSMPlotter, PSMPlotterError};

fn level_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy()
}

/// Log to STDERR, and to `log_file` as well when given.
///
/// The returned guard must be held until the program exits or buffered file output is lost.
fn configure_log(log_file: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .compact()
            .with_timer(fmt::time::ChronoLocal::rfc_3339())
            .with_writer(io::stderr)
            .with_filter(level_filter()),
    );

    match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(fs::File::create(path)?);
            subscriber
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(false)
                        .with_timer(fmt::time::ChronoLocal::rfc_3339())
                        .with_writer(writer)
                        .with_filter(level_filter()),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            subscriber.init();
            Ok(None)
        }
    }
}

fn load_config() -> Result<PSMPlotter, PSMPlotterError> {
    let args = PSMPlotter::parse();
    let mut config = Figment::new()
        .merge(Serialized::defaults(&args))
        .merge(Toml::file("psmplotter.toml"));
    if let Some(path) = args.config_file.as_ref() {
        config = config.merge(Toml::file_exact(path));
    }
    config = config.merge(Env::prefixed("PSMPLOTTER_"));
    Ok(config.extract()?)
}

fn main() -> Result<(), PSMPlotterError> {
    let args = load_config()?;
    let _guard = configure_log(args.log_file.as_deref())?;
    args.main()
}
