/// What the observer wants the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Receives percentage updates (`0.0..=100.0`) from the conversion driver.
///
/// Called synchronously between rendered entries, so implementations must return
/// quickly. Returning [`Flow::Stop`] aborts the conversion.
pub trait ProgressObserver {
    fn on_progress(&mut self, percent: f64) -> Flow;
}

impl<F> ProgressObserver for F
where
    F: FnMut(f64) -> Flow,
{
    fn on_progress(&mut self, percent: f64) -> Flow {
        self(percent)
    }
}

/// Observer for callers that do not care.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _percent: f64) -> Flow {
        Flow::Continue
    }
}

/// Drives an `indicatif` bar scaled to 100.
pub struct BarProgress {
    bar: indicatif::ProgressBar,
}

impl BarProgress {
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            let bar = indicatif::ProgressBar::new(100);
            let style = indicatif::ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar());
            bar.set_style(style);
            bar.set_message("rendering");
            bar
        } else {
            indicatif::ProgressBar::hidden()
        };
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarProgress {
    fn on_progress(&mut self, percent: f64) -> Flow {
        self.bar.set_position(percent.clamp(0.0, 100.0).round() as u64);
        Flow::Continue
    }
}
