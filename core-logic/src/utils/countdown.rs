use nu_ansi_term::Color;
use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const TICK: Duration = Duration::from_secs(1);

/// Formats a duration as `Hh Mm Ss`, rounding up partial seconds.
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Sleeps for `duration` while redrawing a single transient status line.
///
/// The line is written straight to stdout (not through tracing) and erased
/// when the wait ends. Returns `false` if `token` was cancelled first.
pub async fn wait_with_countdown(
    duration: Duration,
    label: &str,
    token: &CancellationToken,
) -> bool {
    let deadline = Instant::now() + duration;
    let render = std::io::stdout().is_terminal();
    let mut frame = 0usize;

    let completed = loop {
        let now = Instant::now();
        if now >= deadline {
            break true;
        }

        if render {
            let spinner = SPINNER[frame % SPINNER.len()];
            let line = format!(
                "{} Waiting {} to {} {}",
                spinner,
                format_remaining(deadline - now),
                label,
                spinner
            );
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "\r\x1b[2K{}", Color::Cyan.paint(line));
            let _ = out.flush();
        }
        frame += 1;

        let next = (now + TICK).min(deadline);
        tokio::select! {
            _ = token.cancelled() => break false,
            _ = sleep_until(next) => {}
        }
    };

    if render {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r\x1b[2K");
        let _ = out.flush();
    }

    completed
}
