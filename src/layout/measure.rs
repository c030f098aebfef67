//! Text measurement oracle
//!
//! The splitter needs one question answered: how many lines does this text
//! take at this width? The rendering layer answers it with whatever surface
//! it has (an off-document text box in the web reader, a shaping library on
//! the server); [`MonospaceMeasurer`] answers it without any surface.

use crate::document::markup::visible_text;
use crate::layout::config::PaginationConfig;
use crate::layout::font::FontMetrics;
use crate::layout::line_break::LineBreaker;

/// Measures rendered text.
///
/// `acquire`/`release` bracket a batch of probes so an implementation can set
/// up and tear down a throwaway measurement surface. Callers hold a
/// [`SurfaceGuard`] rather than calling them directly.
pub trait TextMeasurer {
    /// Rendered line count of `text` (which may carry inline markup) at `width`
    fn line_count(&self, text: &str, width: f32) -> usize;

    fn acquire(&self) {}

    fn release(&self) {}

    /// Follow a configuration change (column width, characters per line)
    fn reconfigure(&mut self, _config: &PaginationConfig) {}
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn line_count(&self, text: &str, width: f32) -> usize {
        (**self).line_count(text, width)
    }

    fn acquire(&self) {
        (**self).acquire()
    }

    fn release(&self) {
        (**self).release()
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for Box<M> {
    fn line_count(&self, text: &str, width: f32) -> usize {
        (**self).line_count(text, width)
    }

    fn acquire(&self) {
        (**self).acquire()
    }

    fn release(&self) {
        (**self).release()
    }

    fn reconfigure(&mut self, config: &PaginationConfig) {
        (**self).reconfigure(config)
    }
}

/// Holds a measurement surface open; releases it when dropped, however the
/// holder exits.
pub struct SurfaceGuard<'a, M: TextMeasurer + ?Sized> {
    measurer: &'a M,
}

impl<'a, M: TextMeasurer + ?Sized> SurfaceGuard<'a, M> {
    pub fn acquire(measurer: &'a M) -> Self {
        measurer.acquire();
        Self { measurer }
    }

    pub fn line_count(&self, text: &str, width: f32) -> usize {
        self.measurer.line_count(text, width)
    }
}

impl<M: TextMeasurer + ?Sized> Drop for SurfaceGuard<'_, M> {
    fn drop(&mut self) {
        self.measurer.release();
    }
}

/// Fixed-advance measurer matching the estimator's characters-per-line model
#[derive(Debug, Clone, Default)]
pub struct MonospaceMeasurer {
    metrics: FontMetrics,
    breaker: LineBreaker,
}

impl MonospaceMeasurer {
    pub fn new(metrics: FontMetrics) -> Self {
        Self {
            metrics,
            breaker: LineBreaker::new(),
        }
    }

    /// Advance chosen so `chars_per_line` characters fill `render_width`
    pub fn from_config(config: &PaginationConfig) -> Self {
        let chars = config.sizing.chars_per_line.max(1) as f32;
        Self::new(FontMetrics::monospace(
            config.render_width / chars,
            config.sizing.line_height,
        ))
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn line_count(&self, text: &str, width: f32) -> usize {
        self.breaker
            .count_lines(&visible_text(text), width, &self.metrics)
    }

    fn reconfigure(&mut self, config: &PaginationConfig) {
        *self = Self::from_config(config);
    }
}
