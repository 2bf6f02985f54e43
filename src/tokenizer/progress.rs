// src/tokenizer/progress.rs

// With the "progressbar" feature this re-exports indicatif; without it the
// same calls compile to nothing.

#[cfg(feature = "progressbar")]
pub use indicatif::{ProgressBar, ProgressStyle};

#[cfg(not(feature = "progressbar"))]
mod noop {
    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new_spinner() -> Self {
            Self {}
        }

        pub fn hidden() -> Self {
            Self {}
        }

        pub fn set_style(&self, _style: ProgressStyle) {}
        pub fn inc(&self, _inc: u64) {}
        pub fn finish(&self) {}
    }

    pub struct ProgressStyle;

    impl ProgressStyle {
        pub fn default_spinner() -> Self {
            Self {}
        }

        pub fn template(self, _template: &str) -> Result<Self, String> {
            Ok(self)
        }
    }
}

#[cfg(not(feature = "progressbar"))]
pub use noop::{ProgressBar, ProgressStyle};

/// A spinner counting segmented sentences, or a hidden one when `show` is
/// false. Input is read in batches, so the total is not known up front.
pub fn sentence_bar(show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner} [{elapsed_precise}] {pos} sentences")
    {
        bar.set_style(style);
    }
    bar
}
