use chrono::Local;
use log::LevelFilter;
use std::io::Write;

/// Install the stderr logger. `RUST_LOG` still overrides the chosen level.
pub fn init_logging(verbose: bool, debug: bool) -> Result<(), log::SetLoggerError> {
    let log_level = if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()?;

    log::debug!("Logging initialized with level: {log_level}");
    Ok(())
}
