//! Tracing subscriber setup. Lines look like "2024-05-01 12:00:00 [INFO] message", local time.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Wall clock in the host's timezone, second resolution.
pub struct LocalClock;

impl FormatTime for LocalClock {
    #[cfg(unix)]
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        // SAFETY: localtime_r writes only into the zeroed tm we own.
        let tm = unsafe {
            let now = libc::time(std::ptr::null_mut());
            let mut tm: libc::tm = std::mem::zeroed();
            libc::localtime_r(&now, &mut tm);
            tm
        };
        write!(
            w,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            tm.tm_year + 1900,
            tm.tm_mon + 1,
            tm.tm_mday,
            tm.tm_hour,
            tm.tm_min,
            tm.tm_sec
        )
    }

    #[cfg(not(unix))]
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// ANSI colour for a level tag.
fn level_style(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[2m",
    }
}

/// Timestamp, bracketed level, then the event's message and fields.
pub struct BridgeFormat;

impl<S, N> FormatEvent<S, N> for BridgeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        LocalClock.format_time(&mut writer)?;

        let level = event.metadata().level();
        if writer.has_ansi_escapes() {
            write!(writer, " {}[{}]\x1b[0m ", level_style(level), level)?;
        } else {
            write!(writer, " [{}] ", level)?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Map a user facing level name onto a tracing filter directive.
/// CRITICAL has no tracing equivalent and maps to error. Unknown names return None.
pub fn level_filter(level: &str) -> Option<&'static str> {
    match level.trim().to_lowercase().as_str() {
        "critical" | "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}

/// Install the global subscriber. Invalid level names fall back to info.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::prelude::*;

    let directive = level_filter(level).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}'. Using INFO. \
             Valid levels: TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL",
            level
        );
        "info"
    });

    tracing_subscriber::registry()
        .with(EnvFilter::new(directive))
        .with(
            tracing_subscriber::fmt::layer()
                .fmt_fields(DefaultFields::new())
                .event_format(BridgeFormat),
        )
        .init();
}
