//! Height estimation and measured-height lookup
//!
//! The first pagination pass runs before anything has been rendered, so it
//! prices each element with a fixed-font heuristic. The second pass swaps in
//! the heights the renderer actually measured.

use crate::document::markup::visible_char_count;
use crate::document::{ContentElement, ElementId, ElementKind};
use crate::layout::config::SizingConstants;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Heuristic cost function from element to vertical extent
#[derive(Debug, Clone, Default)]
pub struct HeightEstimator {
    sizing: SizingConstants,
}

impl HeightEstimator {
    pub fn new(sizing: SizingConstants) -> Self {
        Self { sizing }
    }

    pub fn sizing(&self) -> &SizingConstants {
        &self.sizing
    }

    /// Estimated height of `element`. Deterministic and never zero.
    pub fn estimate(&self, element: &ContentElement) -> f32 {
        let s = &self.sizing;
        let height = match &element.kind {
            ElementKind::Paragraph | ElementKind::ParagraphQuote => self.text_height(
                element,
                s.chars_per_line,
                s.paragraph_min_height,
            ),
            ElementKind::Question => self.text_height(
                element,
                s.question_chars_per_line,
                s.question_min_height,
            ),
            ElementKind::HeadingMajor => s.heading_major_height,
            ElementKind::HeadingMinor => s.heading_minor_height,
            ElementKind::Image => s.image_height,
            ElementKind::Video => s.video_height,
            ElementKind::YoutubeEmbed => s.youtube_embed_height,
            ElementKind::Biography { citations } => {
                s.biography_header_height + citations.len() as f32 * s.biography_item_height
            }
            ElementKind::Footnotes { entries } => {
                let body: f32 = entries
                    .iter()
                    .map(|entry| {
                        let lines = line_count(visible_char_count(&entry.body_text), s.footnote_chars_per_line);
                        lines.max(1) as f32 * s.footnote_line_height
                    })
                    .sum();
                s.footnotes_header_height + body + s.footnotes_margin
            }
            ElementKind::QrReference => s.qr_reference_height,
            ElementKind::Other(_) => s.fallback_height,
        };

        if height > 0.0 {
            height
        } else {
            s.fallback_height
        }
    }

    fn text_height(&self, element: &ContentElement, chars_per_line: usize, floor: f32) -> f32 {
        let s = &self.sizing;
        let lines = line_count(visible_char_count(&element.body), chars_per_line);
        let mut height = lines as f32 * s.line_height;
        if element.embedded_image.is_some() {
            height += s.embedded_image_height;
        }
        height += s.paragraph_margin_bottom;
        height.max(floor)
    }
}

fn line_count(chars: usize, chars_per_line: usize) -> usize {
    chars.div_ceil(chars_per_line.max(1))
}

/// Heights the renderer measured for whole (unsplit) elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasuredHeights(FxHashMap<ElementId, f32>);

impl MeasuredHeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measurement. Non-finite or negative values are ignored and
    /// the element keeps its estimate.
    pub fn insert(&mut self, id: ElementId, height: f32) {
        if height.is_finite() && height >= 0.0 {
            self.0.insert(id, height);
        } else {
            log::warn!("Ignoring unusable measured height {height} for element {}", id.0);
        }
    }

    pub fn get(&self, id: ElementId) -> Option<f32> {
        self.0
            .get(&id)
            .copied()
            .filter(|h| h.is_finite() && *h >= 0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ElementId, f32)> for MeasuredHeights {
    fn from_iter<T: IntoIterator<Item = (ElementId, f32)>>(iter: T) -> Self {
        let mut heights = Self::new();
        for (id, height) in iter {
            heights.insert(id, height);
        }
        heights
    }
}

/// Where the paginator takes element heights from
#[derive(Debug, Clone, Copy)]
pub enum HeightSource<'a> {
    /// Heuristic estimates only (first paint)
    Estimated,
    /// Measured heights, estimates for anything not measured
    Measured(&'a MeasuredHeights),
}

impl HeightSource<'_> {
    pub fn is_measured(&self) -> bool {
        matches!(self, HeightSource::Measured(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Footnote;

    fn estimator() -> HeightEstimator {
        HeightEstimator::default()
    }

    #[test]
    fn test_paragraph_formula() {
        // 150 chars at 70 per line: 3 lines * 24 + 16 margin
        let el = ContentElement::paragraph("a".repeat(150));
        assert_eq!(estimator().estimate(&el), 88.0);
    }

    #[test]
    fn test_paragraph_floor() {
        let el = ContentElement::paragraph("Hi");
        assert_eq!(estimator().estimate(&el), 48.0);
        let empty = ContentElement::paragraph("");
        assert_eq!(estimator().estimate(&empty), 48.0);
    }

    #[test]
    fn test_markup_not_counted() {
        let plain = ContentElement::paragraph("a".repeat(70));
        let marked = ContentElement::paragraph(format!("<em>{}</em>", "a".repeat(70)));
        assert_eq!(estimator().estimate(&plain), estimator().estimate(&marked));
    }

    #[test]
    fn test_embedded_image_allowance() {
        let el = ContentElement::paragraph("a".repeat(70)).with_embedded_image("fig.png");
        assert_eq!(estimator().estimate(&el), 24.0 + 320.0 + 16.0);
    }

    #[test]
    fn test_question_uses_own_constants() {
        let el = ContentElement::new(ElementKind::Question, "a".repeat(121));
        // 121 chars at 60 per line: 3 lines * 24 + 16 = 88, above the 72 floor
        assert_eq!(estimator().estimate(&el), 88.0);
        let short = ContentElement::new(ElementKind::Question, "Why?");
        assert_eq!(estimator().estimate(&short), 72.0);
    }

    #[test]
    fn test_fixed_kinds() {
        let e = estimator();
        assert!(e.estimate(&ContentElement::heading_major("A")) > e.estimate(&ContentElement::heading_minor("A")));
        assert_eq!(e.estimate(&ContentElement::image("x.png")), 400.0);
        assert_eq!(e.estimate(&ContentElement::new(ElementKind::YoutubeEmbed, "")), 360.0);
    }

    #[test]
    fn test_biography_and_footnotes() {
        let bio = ContentElement::new(
            ElementKind::Biography { citations: vec!["a".into(), "b".into(), "c".into()] },
            "",
        );
        assert_eq!(estimator().estimate(&bio), 40.0 + 3.0 * 28.0);

        let notes = ContentElement::new(
            ElementKind::Footnotes {
                entries: vec![
                    Footnote { index: 1, body_text: "short".into() },
                    Footnote { index: 2, body_text: "n".repeat(100) },
                ],
            },
            "",
        );
        // 1 line + 2 lines at 18 each, plus header and margins
        assert_eq!(estimator().estimate(&notes), 36.0 + 54.0 + 24.0);
    }

    #[test]
    fn test_unknown_kind_fallback() {
        let el = ContentElement::new(ElementKind::Other("table".into()), "cells");
        assert_eq!(estimator().estimate(&el), 24.0);
    }

    #[test]
    fn test_zero_constant_falls_back() {
        let sizing = SizingConstants {
            image_height: 0.0,
            ..SizingConstants::default()
        };
        assert_eq!(HeightEstimator::new(sizing).estimate(&ContentElement::image("x")), 24.0);
    }

    #[test]
    fn test_measured_heights_reject_garbage() {
        let mut heights = MeasuredHeights::new();
        heights.insert(ElementId(0), 120.0);
        heights.insert(ElementId(1), f32::NAN);
        heights.insert(ElementId(2), -4.0);
        assert_eq!(heights.get(ElementId(0)), Some(120.0));
        assert_eq!(heights.get(ElementId(1)), None);
        assert_eq!(heights.len(), 1);
    }

    #[test]
    fn test_measured_heights_json() {
        let heights: MeasuredHeights = serde_json::from_str(r#"{"0": 45.5, "3": 200}"#).unwrap();
        assert_eq!(heights.get(ElementId(0)), Some(45.5));
        assert_eq!(heights.get(ElementId(3)), Some(200.0));
    }
}
