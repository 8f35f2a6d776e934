//! Terminal progress for the scan phases.
//!
//! [`ProgressCallback`] is the seam the walker and the hashing pool report
//! through; [`Progress`] draws it with indicatif on stderr. Two phases are
//! known: `"walking"` (spinner, count unknown up front) and `"hashing"` (bar
//! over the files that survived size grouping).

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Receiver for progress events. Implementations must be cheap to call from
/// worker threads.
pub trait ProgressCallback: Send + Sync {
    /// A phase began. `total` is 0 when the item count is unknown.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// `current` items of the active phase are done; `path` is the latest.
    fn on_progress(&self, current: usize, path: &str);

    /// One item finished, covering `bytes` of file content.
    fn on_item_completed(&self, _bytes: u64) {}

    /// The phase ended.
    fn on_phase_end(&self, phase: &str);

    /// Free-form status text.
    fn on_message(&self, _message: &str) {}
}

/// indicatif renderer for [`ProgressCallback`].
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a renderer. A quiet renderer ignores every event.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            "walking" => Some(&self.walking),
            "hashing" => Some(&self.hashing),
            _ => None,
        }
    }

    /// The bar of the latest phase still running.
    fn active(&self) -> Option<ProgressBar> {
        [&self.hashing, &self.walking]
            .into_iter()
            .find_map(|slot| slot.lock().ok().and_then(|bar| bar.clone()))
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let bar = match phase {
            "walking" => {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(Self::walking_style());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
            _ => {
                let bar = self.multi.add(ProgressBar::new(total as u64));
                bar.set_style(Self::hashing_style());
                bar
            }
        };
        bar.set_message(phase.to_string());

        if let Some(Ok(mut guard)) = self.slot(phase).map(Mutex::lock) {
            *guard = Some(bar);
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        if let Some(bar) = self.active() {
            bar.set_position(current as u64);
            bar.set_message(truncate_path(path, 40));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        let finished = self
            .slot(phase)
            .and_then(|slot| slot.lock().ok().and_then(|mut guard| guard.take()));
        if let Some(bar) = finished {
            bar.finish_with_message(format!("{} done", phase));
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(bar) = self.active() {
            bar.set_message(message.to_string());
        }
    }
}

/// Shorten a path to its file name when it exceeds `max_len` characters.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name_len = name.chars().count();

    if name_len + 4 > max_len {
        let keep = max_len.saturating_sub(3);
        let tail: String = name.chars().skip(name_len.saturating_sub(keep)).collect();
        return format!("...{}", tail);
    }

    format!(".../{}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_path_unchanged() {
        assert_eq!(truncate_path("/a/b.txt", 40), "/a/b.txt");
    }

    #[test]
    fn test_truncate_long_path_keeps_name() {
        let path = format!("/{}/photo.jpg", "x".repeat(60));
        assert_eq!(truncate_path(&path, 20), ".../photo.jpg");
    }

    #[test]
    fn test_truncate_long_name() {
        let path = format!("/dir/{}.bin", "é".repeat(50));
        let shown = truncate_path(&path, 12);
        assert!(shown.starts_with("..."));
        assert_eq!(shown.chars().count(), 12);
        assert!(shown.ends_with(".bin"));
    }

    #[test]
    fn test_quiet_progress_ignores_events() {
        let progress = Progress::new(true);
        progress.on_phase_start("walking", 0);
        progress.on_progress(1, "/a");
        progress.on_phase_end("walking");
        assert!(progress.walking.lock().unwrap().is_none());
    }

    #[test]
    fn test_phase_lifecycle() {
        let progress = Progress::new(false);
        progress.on_phase_start("hashing", 3);
        assert!(progress.hashing.lock().unwrap().is_some());

        progress.on_progress(2, "/data/file.txt");
        assert_eq!(progress.active().map(|bar| bar.position()), Some(2));

        progress.on_phase_end("hashing");
        assert!(progress.hashing.lock().unwrap().is_none());
        assert!(progress.active().is_none());
    }
}
