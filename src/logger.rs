use chrono::Local;
use fern::Dispatch;
use log::LevelFilter;
use std::fs;
use std::path::Path;

/// Initializes the global logger.
///
/// This function should be called once at the very beginning of the
/// hook's `main` function.
///
/// Log level is controlled by the `RUST_LOG` environment variable and
/// defaults to `debug`, slurmctld hooks are rarely run by hand.
/// Logs are written to `log_file` and to stderr. A log file that cannot be
/// opened only costs the file sink, the hook itself keeps running.
pub fn init(log_file: &Path) {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string());

    let log_level_filter = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::Debug);

    let console_config = Dispatch::new()
        .format(|out, message, record| {
            let colors = fern::colors::ColoredLevelConfig::new()
                .error(fern::colors::Color::Red)
                .warn(fern::colors::Color::Yellow)
                .info(fern::colors::Color::Green)
                .debug(fern::colors::Color::Blue)
                .trace(fern::colors::Color::BrightBlack);

            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut base_config = Dispatch::new().level(log_level_filter).chain(console_config);

    if let Some(parent) = log_file.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory at '{}': {}", parent.display(), e);
        }
    }

    match fern::log_file(log_file) {
        Ok(file) => {
            let file_config = Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "[{} {} {}] {}",
                        Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file);
            base_config = base_config.chain(file_config);
        }
        Err(e) => eprintln!("Failed to open log file '{}': {}", log_file.display(), e),
    }

    base_config.apply().unwrap_or_else(|e| {
        eprintln!("Failed to apply logger configuration: {}", e);
    });

    log::debug!("Logger initialized. Logging to stderr and '{}'.", log_file.display());
}
