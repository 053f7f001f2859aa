//! Terminal presentation of an install session.

use std::collections::HashMap;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use devsuite::component::ComponentKey;
use devsuite::session::{FailureReporter, InstallStage, Navigator, ProgressSink, SessionError};

const BAR_TEMPLATE: &str = "{prefix:>12.bold} [{bar:30.cyan/blue}] {bytes:>10}/{total_bytes:10} {msg}";
const SPINNER_TEMPLATE: &str = "{prefix:>12.bold} {spinner} {msg}";

/// One progress line per component.
pub struct BarProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<ComponentKey, ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    /// Add a line for `key`, labelled `name`.
    pub fn add(&self, key: &ComponentKey, name: &str) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(spinner_style());
        bar.set_prefix(name.to_string());
        bar.set_message(style("queued").dim().to_string());
        self.bars.lock().insert(key.clone(), bar);
    }

    fn with_bar(&self, key: &ComponentKey, f: impl FnOnce(&ProgressBar)) {
        if let Some(bar) = self.bars.lock().get(key) {
            f(bar);
        }
    }
}

impl ProgressSink for BarProgress {
    fn update(&self, key: &ComponentKey, stage: InstallStage, status: &str) {
        self.with_bar(key, |bar| {
            let message = match stage {
                InstallStage::Complete => style(status).green().to_string(),
                InstallStage::Failed => style(status).red().to_string(),
                InstallStage::Waiting | InstallStage::Skipped => style(status).yellow().to_string(),
                InstallStage::Downloading | InstallStage::Installing => status.to_string(),
            };
            if stage == InstallStage::Installing || stage == InstallStage::Waiting {
                bar.set_style(spinner_style());
                bar.enable_steady_tick(std::time::Duration::from_millis(120));
            }
            if stage.is_final() {
                bar.finish_with_message(message);
            } else {
                bar.set_message(message);
            }
        });
    }

    fn bytes(&self, key: &ComponentKey, downloaded: u64, total: Option<u64>) {
        self.with_bar(key, |bar| {
            if let Some(total) = total {
                if bar.length() != Some(total) {
                    bar.set_style(bar_style());
                    bar.set_length(total);
                }
            }
            bar.set_position(downloaded);
        });
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Collects failures for the end-of-run summary.
#[derive(Default)]
pub struct FailureLog {
    failures: Mutex<Vec<(ComponentKey, String)>>,
}

impl FailureLog {
    pub fn take(&self) -> Vec<(ComponentKey, String)> {
        std::mem::take(&mut *self.failures.lock())
    }
}

impl FailureReporter for FailureLog {
    fn report(&self, key: &ComponentKey, error: &SessionError) {
        tracing::error!(component = %key, error = %error, "Component failed");
        self.failures.lock().push((key.clone(), error.to_string()));
    }
}

/// Logs when every component has finished.
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn go_to(&self, route: &str) {
        tracing::info!(route, "All components finished");
    }
}
