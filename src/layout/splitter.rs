//! Paragraph splitting at a page boundary
//!
//! Finds the longest word prefix of a paragraph that fits a vertical budget by
//! binary search over the cut index, asking the measurement oracle for the
//! line count of each probe. Line count never decreases as the prefix grows,
//! which is what makes the search valid.

use crate::document::markup::{open_element_depths, word_spans};
use crate::document::{ContentElement, SplitMarker};
use crate::layout::config::PaginationConfig;
use crate::layout::measure::{SurfaceGuard, TextMeasurer};
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// One element, or the two fragments it was cut into
pub type SplitResult = SmallVec<[ContentElement; 2]>;

/// Why a paragraph was left whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDeclined {
    /// Not a plain paragraph, or it carries an inline image
    NotSplittable,
    /// The budget cannot hold a single line
    NoSpace,
    /// The whole paragraph already fits
    AlreadyFits,
    /// Not even the first word fits, or there is only one word
    NoCutPoint,
}

impl fmt::Display for SplitDeclined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SplitDeclined::NotSplittable => "not splittable",
            SplitDeclined::NoSpace => "no space",
            SplitDeclined::AlreadyFits => "already fits",
            SplitDeclined::NoCutPoint => "no cut point",
        };
        f.write_str(reason)
    }
}

/// The two halves of a successful split
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    pub first: ContentElement,
    pub second: ContentElement,
    /// Words on the first fragment
    pub first_words: usize,
    /// Words on the second fragment
    pub second_words: usize,
    /// Oracle probes spent finding the cut
    pub probes: usize,
}

/// Splits reflowable paragraphs against a measurement oracle
pub struct ParagraphSplitter<'a, M: TextMeasurer + ?Sized> {
    measurer: &'a M,
    config: &'a PaginationConfig,
}

impl<'a, M: TextMeasurer + ?Sized> ParagraphSplitter<'a, M> {
    pub fn new(measurer: &'a M, config: &'a PaginationConfig) -> Self {
        Self { measurer, config }
    }

    /// Height of paragraph text as the oracle lays it out
    pub fn text_height(&self, text: &str) -> f32 {
        let guard = SurfaceGuard::acquire(self.measurer);
        self.height_for_lines(guard.line_count(text, self.config.render_width))
    }

    fn height_for_lines(&self, lines: usize) -> f32 {
        lines as f32 * self.config.sizing.line_height + self.config.sizing.paragraph_margin_bottom
    }

    /// Split `element` so its first fragment fits `available`.
    ///
    /// Fragments are slices of the original body, so line breaks inside the
    /// paragraph survive the cut. The cut backs off to the last word boundary
    /// outside any inline element; a paragraph wrapped whole in one element
    /// has no such boundary and is cut inside it.
    ///
    /// Returns the element unchanged when it cannot or need not be split.
    pub fn split(&self, element: &ContentElement, available: f32) -> SplitResult {
        match self.try_split(element, available) {
            Ok(cut) => smallvec![cut.first, cut.second],
            Err(_) => smallvec![element.clone()],
        }
    }

    /// Split `element`, reporting why when it stays whole
    pub fn try_split(&self, element: &ContentElement, available: f32) -> Result<Cut, SplitDeclined> {
        if !element.is_splittable() {
            return Err(SplitDeclined::NotSplittable);
        }
        if available <= 0.0 || available < self.config.rules.min_split_space {
            return Err(SplitDeclined::NoSpace);
        }

        let sizing = &self.config.sizing;
        let fit_lines = ((available - sizing.paragraph_margin_bottom) / sizing.line_height).floor();
        if fit_lines < 1.0 {
            return Err(SplitDeclined::NoSpace);
        }
        let fit_lines = fit_lines as usize;

        let body = element.body.as_str();
        let spans = word_spans(body);
        let width = self.config.render_width;
        // Text of words `from..to`, with the whitespace between them as authored
        let words_between = |from: usize, to: usize| &body[spans[from].start..spans[to - 1].end];

        // Released on every return below
        let surface = SurfaceGuard::acquire(self.measurer);

        let full_lines = surface.line_count(body.trim(), width);
        if self.height_for_lines(full_lines) <= available || full_lines <= fit_lines {
            return Err(SplitDeclined::AlreadyFits);
        }
        if spans.len() < 2 {
            return Err(SplitDeclined::NoCutPoint);
        }

        // Invariant: the first `lo` words fit, the first `hi` words do not
        let (mut lo, mut hi) = (0, spans.len());
        let mut probes = 1;
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            let lines = surface.line_count(words_between(0, mid), width);
            probes += 1;
            log::trace!("split probe: {mid} words -> {lines} lines (fit {fit_lines})");
            if lines <= fit_lines {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        drop(surface);

        if lo == 0 {
            return Err(SplitDeclined::NoCutPoint);
        }

        let words: Vec<&str> = spans.iter().map(|span| &body[span.clone()]).collect();
        let depths = open_element_depths(&words);
        let cut = (1..=lo).rev().find(|&k| depths[k] == 0).unwrap_or(lo);
        if cut < lo {
            log::trace!("cut moved from word {lo} to {cut} to keep inline markup whole");
        }

        let first_text = words_between(0, cut).to_string();
        let second_text = words_between(cut, spans.len()).to_string();

        let marker = element.split.unwrap_or_default();
        let first = element.fragment(
            first_text,
            SplitMarker {
                first_half: true,
                second_half: marker.second_half,
            },
        );
        let second = element.fragment(
            second_text,
            SplitMarker {
                first_half: marker.first_half,
                second_half: true,
            },
        );

        log::debug!(
            "split element {} at word {cut}/{} after {probes} probes",
            element.id.0,
            words.len()
        );

        Ok(Cut {
            first,
            second,
            first_words: cut,
            second_words: words.len() - cut,
            probes,
        })
    }
}
