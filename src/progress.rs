//! Progress reporting: events emitted by the pipeline and the status line
//! the CLI draws from them.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Pipeline phase notifications. `current` is monotonic within a run; no
/// other ordering is guaranteed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    Discovering,
    Parsing { current: usize, total: usize },
    Analyzing,
}

pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// A single stderr status line fed directly by pipeline events.
pub struct StatusLine {
    bar: ProgressBar,
}

impl StatusLine {
    pub fn start() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} cyclops: {msg}")
                .expect("valid template"),
        );
        bar.set_message("starting");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    pub fn update(&self, event: &ProgressEvent) {
        let message = match event {
            ProgressEvent::Discovering => "discovering source files".to_string(),
            ProgressEvent::Parsing { current, total } => {
                format!("parsing imports {}/{}", current, total)
            }
            ProgressEvent::Analyzing => "resolving cycles".to_string(),
        };
        self.bar.set_message(message);
    }

    /// Replace the status line with a styled completion note.
    pub fn finish(&self, summary: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", style("cyclops").cyan().bold(), summary);
    }

    /// Drop the status line without a completion note.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Compact wall-clock rendering for summary lines.
pub fn human_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let total = duration.as_secs();
        format!("{}m{:02}s", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::human_duration;
    use std::time::Duration;

    #[test]
    fn renders_millis_below_one_second() {
        assert_eq!(human_duration(Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn renders_fractional_seconds() {
        assert_eq!(human_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn renders_minutes_with_seconds() {
        assert_eq!(human_duration(Duration::from_secs(90)), "1m30s");
    }
}
