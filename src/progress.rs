//! Progress display while sources are read.
//!
//! [`ProgressCallback`] is the hook the readers call; [`Progress`] draws it as
//! an indicatif spinner (walks) or bar (manifest lists).

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Phase name used while walking a filesystem root.
pub const PHASE_WALKING: &str = "walking";
/// Phase name used while reading manifests.
pub const PHASE_MANIFESTS: &str = "manifests";

/// Observer of source reading.
///
/// Phases are [`PHASE_WALKING`] (one per root, total unknown) and
/// [`PHASE_MANIFESTS`] (total known up front).
pub trait ProgressCallback: Send + Sync {
    /// A phase begins; `total` is 0 when the item count is unknown.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Item `current` (1-based) at `path` was reached.
    fn on_progress(&self, current: usize, path: &str);

    /// The phase is over.
    fn on_phase_end(&self, phase: &str);

    /// Context for the items that follow, such as the label of a root.
    fn on_message(&self, _message: &str) {}
}

#[derive(Default)]
struct BarState {
    bar: Option<ProgressBar>,
    context: String,
}

/// Terminal progress on stderr, drawn with indicatif.
pub struct Progress {
    state: Mutex<BarState>,
    quiet: bool,
}

impl Progress {
    /// Create a reporter; with `quiet` nothing is drawn.
    ///
    /// ```
    /// use codesweep::progress::{Progress, ProgressCallback, PHASE_MANIFESTS};
    ///
    /// let progress = Progress::new(true);
    /// progress.on_phase_start(PHASE_MANIFESTS, 3);
    /// progress.on_phase_end(PHASE_MANIFESTS);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            state: Mutex::new(BarState::default()),
            quiet,
        }
    }

    fn new_bar(total: usize) -> ProgressBar {
        if total == 0 {
            let bar = ProgressBar::new_spinner().with_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg} ({pos} media files, {elapsed})")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        } else {
            ProgressBar::new(total as u64).with_style(
                ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            )
        }
    }

    fn with_state(&self, f: impl FnOnce(&mut BarState)) {
        if self.quiet {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        self.with_state(|state| {
            let bar = Self::new_bar(total);
            bar.set_message(match phase {
                PHASE_WALKING => "Walking".to_string(),
                PHASE_MANIFESTS => "Reading manifests".to_string(),
                other => other.to_string(),
            });
            if let Some(previous) = state.bar.replace(bar) {
                previous.finish_and_clear();
            }
            state.context.clear();
        });
    }

    fn on_progress(&self, current: usize, path: &str) {
        self.with_state(|state| {
            let shown = truncate_path(path, 30);
            let message = if state.context.is_empty() {
                shown
            } else {
                format!("{} {}", state.context, shown)
            };
            if let Some(ref bar) = state.bar {
                bar.set_position(current as u64);
                bar.set_message(message);
            }
        });
    }

    fn on_phase_end(&self, _phase: &str) {
        self.with_state(|state| {
            if let Some(bar) = state.bar.take() {
                bar.finish_and_clear();
            }
        });
    }

    fn on_message(&self, message: &str) {
        self.with_state(|state| {
            state.context = format!("[{message}]");
            if let Some(ref bar) = state.bar {
                bar.set_message(state.context.clone());
            }
        });
    }
}

/// Shorten `path` to at most `max_len` characters, keeping the file name.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_owned();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
