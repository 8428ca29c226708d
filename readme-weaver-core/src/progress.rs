//! Scoped progress indicators on stderr, drawn with `indicatif`.
//!
//! [`Progress::start`] hands back a spinner guard and [`Progress::counter`] a
//! bounded bar. Dropping either finishes and clears its line, so output printed
//! afterwards never interleaves with the animation. Release happens in `Drop`,
//! so early returns and `?` stop it too.

use std::borrow::Cow;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);
const SPINNER_TEMPLATE: &str = "{msg} {spinner}";
const COUNTER_TEMPLATE: &str = "{spinner} {msg} [{bar:30}] {pos}/{len}";

#[must_use = "the indicator stops as soon as the guard is dropped"]
pub struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Start a spinner with `message`. When `enabled` is false nothing is drawn.
    pub fn start(message: impl Into<Cow<'static, str>>, enabled: bool) -> Self {
        Self::build(enabled, ProgressBar::new_spinner, SPINNER_TEMPLATE, message)
    }

    /// Start a bar counting up to `total`, e.g. the files of one directory.
    pub fn counter(message: impl Into<Cow<'static, str>>, total: u64, enabled: bool) -> Self {
        Self::build(enabled, || ProgressBar::new(total), COUNTER_TEMPLATE, message)
    }

    fn build(
        enabled: bool,
        bar: impl FnOnce() -> ProgressBar,
        template: &str,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let bar = enabled.then(|| {
            let style = ProgressStyle::with_template(template)
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            let bar = bar().with_style(style).with_message(message);
            bar.enable_steady_tick(TICK);
            bar
        });
        Self { bar }
    }

    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }

    pub fn set_message(&self, message: impl Into<Cow<'static, str>>) {
        if let Some(bar) = &self.bar {
            bar.set_message(message);
        }
    }

    pub fn inc(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_progress_draws_nothing() {
        let progress = Progress::start("Processing", false);
        assert!(!progress.is_active());
        progress.set_message("still nothing");
        progress.inc();
    }

    #[test]
    fn enabled_spinner_finishes_on_drop() {
        let bar = {
            let progress = Progress::start("Processing", true);
            assert!(progress.is_active());
            progress.bar.clone().unwrap()
        };
        assert!(bar.is_finished());
    }

    #[test]
    fn counter_tracks_position() {
        let progress = Progress::counter("Reading files", 3, true);
        progress.inc();
        progress.inc();
        let bar = progress.bar.clone().unwrap();
        assert_eq!(bar.position(), 2);
        assert_eq!(bar.length(), Some(3));
        drop(progress);
        assert!(bar.is_finished());
    }

    #[test]
    fn progress_is_released_on_error_path() {
        fn fails(seen: &mut Option<ProgressBar>) -> Result<(), String> {
            let progress = Progress::start("Working", true);
            *seen = progress.bar.clone();
            let outcome: Result<(), String> = Err("backend failed".to_string());
            outcome?;
            Ok(())
        }

        let mut seen = None;
        assert!(fails(&mut seen).is_err());
        assert!(seen.unwrap().is_finished());
    }
}
