//! Line breaking algorithm
//!
//! Greedy line filling over UAX #14 break opportunities. Used by the built-in
//! measurer to count how many lines a run of text occupies at a given width.

use crate::layout::font::FontMetrics;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Line breaker
#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Byte ranges of the lines `text` wraps into at `max_width`.
    ///
    /// Blank text occupies no lines. A segment wider than the whole line is
    /// broken between grapheme clusters.
    pub fn break_lines(&self, text: &str, max_width: f32, metrics: &FontMetrics) -> Vec<Range<usize>> {
        let mut lines = Vec::new();
        if text.trim().is_empty() {
            return lines;
        }

        let mut line_start = 0;
        let mut line_width: f32 = 0.0;
        let mut seg_start = 0;

        for (pos, opportunity) in linebreaks(text) {
            let segment = &text[seg_start..pos];
            let visible = metrics.text_width(segment);

            // Soft wrap before this segment
            if line_width > 0.0 && line_width + visible > max_width {
                lines.push(line_start..seg_start);
                line_start = seg_start;
                line_width = 0.0;
            }

            if line_width == 0.0 && visible > max_width {
                // Emergency break inside an overlong segment
                for (idx, grapheme) in segment.grapheme_indices(true) {
                    let advance = metrics.advance(grapheme);
                    let blank = grapheme.trim().is_empty();
                    if line_width > 0.0 && line_width + advance > max_width && !blank {
                        lines.push(line_start..seg_start + idx);
                        line_start = seg_start + idx;
                        line_width = 0.0;
                    }
                    line_width += advance;
                }
            } else {
                line_width += metrics.advance(segment);
            }

            if opportunity == BreakOpportunity::Mandatory && pos < text.len() {
                lines.push(line_start..pos);
                line_start = pos;
                line_width = 0.0;
            }

            seg_start = pos;
        }

        if line_start < text.len() {
            lines.push(line_start..text.len());
        }

        lines
    }

    /// Number of lines `text` wraps into at `max_width`
    pub fn count_lines(&self, text: &str, max_width: f32, metrics: &FontMetrics) -> usize {
        self.break_lines(text, max_width, metrics).len()
    }
}
