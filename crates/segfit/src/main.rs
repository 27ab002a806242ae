//! Command-line driver for a fixed-capacity segregated-fit arena.

use segfit_lib::{app, config, errors};

fn main() {
    let config = match config::AppConfig::try_parse() {
        Ok(config) => config,
        Err(err) => {
            let _ = err.print();
            std::process::exit(errors::parse_exit_code(&err));
        }
    };

    let level = if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(err) = app::run(&config) {
        eprintln!("Error: {err:#}");
        std::process::exit(errors::exit_code(&err));
    }
}
