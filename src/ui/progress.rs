use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc::UnboundedSender;

/// Typed progress events emitted by batch refreshes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { total: usize },
    /// One item finished; events arrive in completion order.
    Item {
        code: String,
        completed: usize,
        total: usize,
        ok: bool,
    },
    Finished { succeeded: usize, failed: usize },
}

/// Send on an optional channel, ignoring a dropped receiver.
pub fn send_progress(tx: &Option<UnboundedSender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event);
    }
}

/// Renders [`ProgressEvent`]s as a progress bar on stderr. Silent in JSON mode.
pub struct ProgressPrinter {
    bar: ProgressBar,
    silent: bool,
}

impl ProgressPrinter {
    pub fn new(json_output: bool) -> Self {
        let bar = if json_output {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            let style = ProgressStyle::default_bar()
                .template("{spinner} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            bar.set_style(style);
            bar
        };
        Self {
            bar,
            silent: json_output,
        }
    }

    pub fn update(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    pub fn handle_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
                self.update("Refreshing quotes...");
            }
            ProgressEvent::Item {
                code,
                completed,
                total,
                ok,
            } => {
                self.bar.set_length(*total as u64);
                self.bar.set_position(*completed as u64);
                if *ok {
                    self.update(code);
                } else {
                    self.update(&format!("{} {}", code, "failed".red()));
                }
            }
            ProgressEvent::Finished { succeeded, failed } => {
                let message = if *failed == 0 {
                    format!("{} funds refreshed", succeeded)
                } else {
                    format!("{} funds refreshed, {} failed", succeeded, failed)
                };
                self.finish(*failed == 0, &message);
            }
        }
    }

    pub fn finish(&self, success: bool, message: &str) {
        self.bar.finish_and_clear();
        if self.silent {
            return;
        }
        if success {
            eprintln!("{} {}", "✓".green(), message);
        } else {
            eprintln!("{} {}", "⚠".yellow(), message);
        }
    }
}
