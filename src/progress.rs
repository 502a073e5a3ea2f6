//! Progress bar display for long-running phases

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for kernel staging and checksum computation
pub struct ProgressDisplay {
    visible: bool,
    /// Bar of the phase in progress
    bar: Option<ProgressBar>,
}

impl ProgressDisplay {
    /// Create a display, drawn only when `visible` and stderr is a terminal
    pub fn new(visible: bool) -> Self {
        Self {
            visible: visible && console::Term::stderr().features().is_attended(),
            bar: None,
        }
    }

    /// Display that never draws
    pub fn hidden() -> Self {
        Self {
            visible: false,
            bar: None,
        }
    }

    /// Start a bar over `total` items
    pub fn start(&mut self, total: u64, what: &str) {
        let bar = if self.visible {
            ProgressBar::new(total)
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::with_template(&format!(
            "  [{{bar:40.green/yellow}}] {{pos}}/{{len}} {} {{msg}}",
            what
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        self.bar = Some(bar);
    }

    /// Count one item, showing its name
    pub fn advance(&self, item: &str) {
        if let Some(ref bar) = self.bar {
            // Truncate long paths for display
            let count = item.chars().count();
            let display = if count > 50 {
                format!("...{}", item.chars().skip(count - 47).collect::<String>())
            } else {
                item.to_string()
            };
            bar.set_message(display);
            bar.inc(1);
        }
    }

    /// Finish and clear the current bar
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Leave the current bar as is on error
    pub fn abandon(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_display_counts() {
        let mut progress = ProgressDisplay::hidden();
        progress.start(3, "kernels");
        progress.advance("spice_kernels/lsk/naif0012.tls");
        progress.advance(&"x".repeat(80));
        assert_eq!(progress.bar.as_ref().map(ProgressBar::position), Some(2));
        progress.finish();
        assert!(progress.bar.is_none());
    }

    #[test]
    fn test_advance_without_start_is_noop() {
        let mut progress = ProgressDisplay::hidden();
        progress.advance("a");
        progress.abandon();
    }
}
