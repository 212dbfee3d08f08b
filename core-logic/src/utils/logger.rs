use anyhow::{Context, Result};
use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, FormattedFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer,
};

/// Target used for success lines. See [`crate::success!`].
pub const SUCCESS_TARGET: &str = "success";

/// Logs an INFO event rendered with a `SUCCESS` label.
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        ::tracing::info!(target: $crate::SUCCESS_TARGET, $($arg)+)
    };
}

fn console_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    // Console follows RUST_LOG, INFO when unset
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter)
}

pub fn setup_logger() -> Option<WorkerGuard> {
    // Create logs directory
    std::fs::create_dir_all("logs").ok();

    let file_appender = tracing_appender::rolling::daily("logs", "fintopio");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = tracing_subscriber::filter::Targets::new().with_default(Level::INFO);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    // Combine both layers
    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer())
        .init();

    // Return guard - MUST be kept alive by caller
    Some(guard)
}

/// Same console output as [`setup_logger`], but the file log goes to `log_path`.
pub fn setup_logger_with_file(log_path: &str) -> Result<WorkerGuard> {
    let file = File::create(log_path).context("Failed to create log file")?;
    let (non_blocking, guard) = tracing_appender::non_blocking(BufWriter::new(file));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(Level::INFO));

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer());

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global subscriber")?;

    Ok(guard)
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn event_message(event: &Event<'_>) -> String {
    let mut msg_visitor = MessageVisitor {
        message: String::new(),
    };
    event.record(&mut msg_visitor);
    msg_visitor.message
}

/// Level label, with INFO events on the success target shown as SUCCESS.
fn level_label(event: &Event<'_>) -> &'static str {
    let meta = event.metadata();
    match *meta.level() {
        Level::INFO if meta.target() == SUCCESS_TARGET => "SUCCESS",
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        _ => "TRACE",
    }
}

/// Writes `[fields] ` for every span in the event's scope, root first.
fn write_span_context<S, N>(ctx: &FmtContext<'_, S, N>, writer: &mut Writer<'_>) -> fmt::Result
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    if let Some(scope) = ctx.event_scope() {
        for span in scope.from_root() {
            let ext = span.extensions();
            if let Some(fields) = ext.get::<FormattedFields<N>>() {
                if !fields.is_empty() {
                    write!(writer, "[{}] ", fields)?;
                }
            }
        }
    }
    Ok(())
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
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
        let timestamp = Local::now().format("%H:%M:%S");
        let label = level_label(event);
        let style = match label {
            "SUCCESS" => Style::new().fg(Color::LightGreen).bold(),
            "ERROR" => Style::new().fg(Color::LightRed).bold(),
            "WARN" => Style::new().fg(Color::Yellow).bold(),
            "INFO" => Style::new().fg(Color::Cyan),
            _ => Style::new().fg(Color::DarkGray),
        };

        write!(
            writer,
            "{} {} ",
            Style::new().dimmed().paint(timestamp.to_string()),
            style.paint(format!("{:<7}", label))
        )?;
        write_span_context(ctx, &mut writer)?;
        writeln!(writer, "{}", event_message(event))
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
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
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

        write!(writer, "{} | {} | ", timestamp, level_label(event))?;
        write_span_context(ctx, &mut writer)?;
        writeln!(writer, "{}", event_message(event))
    }
}
