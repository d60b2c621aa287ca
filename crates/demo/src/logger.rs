// File: crates/demo/src/logger.rs
// Summary: fern logging setup: `HH:MM:SS.mmm:LEVEL -- message` to stdout and, optionally, a file.

use std::path::Path;

use anyhow::{Context, Result};

/// Level comes from `RUST_LOG` (a bare level such as `debug`), defaulting to info.
pub fn setup(log_file: Option<&Path>) -> Result<()> {
    let level_filter = std::env::var("RUST_LOG")
        .ok()
        .as_deref()
        .map(str::parse::<log::Level>)
        .transpose()
        .context("RUST_LOG must be a log level")?
        .unwrap_or(log::Level::Info)
        .to_level_filter();

    let mut io_sink = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}:{} -- {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                message
            ));
        })
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        let file = fern::log_file(path).with_context(|| format!("opening log file {}", path.display()))?;
        io_sink = io_sink.chain(file);
    }

    fern::Dispatch::new()
        .level(log::LevelFilter::Off)
        .level_for("chart_core", level_filter)
        .level_for("chart_render_skia", level_filter)
        .level_for("constellation_demo", level_filter)
        .chain(io_sink)
        .apply()?;

    Ok(())
}
