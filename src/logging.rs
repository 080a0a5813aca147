use std::io::{self, Write};

use env_logger::{Builder, Target, fmt::Formatter};
use log::{Level, LevelFilter};

/// Installs a compact stderr logger for embedding hosts that do not bring
/// their own `log` backend. Calling it twice returns an error from
/// `try_init`, mapped to `io::Error`.
pub fn init_logger(level: LevelFilter) -> io::Result<()> {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .write_style(env_logger::WriteStyle::Never)
        .target(Target::Stderr)
        .format(|buf: &mut Formatter, record| {
            writeln!(buf, "{} {}", level_tag(record.level()), record.args())
        });

    builder.try_init().map_err(io::Error::other)
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
