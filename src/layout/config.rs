//! Pagination configuration
//!
//! Every constant the engine uses is tunable per issue. The defaults are
//! calibrated for the print format the PDF export renders (a 560-unit wide
//! text column with 1000 units of usable height); other page sizes need their
//! own calibration.

use crate::error::{PaginationError, Result};
use serde::{Deserialize, Serialize};

/// Which paginator lays out an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// Heuristic packing with keep-together rules and paragraph splitting
    #[default]
    Automatic,
    /// Authored per-element page directives
    Manual,
}

/// Per-kind height constants used by the estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizingConstants {
    /// Height of one line of body text
    pub line_height: f32,
    /// Visible characters per line of body text
    pub chars_per_line: usize,
    pub paragraph_min_height: f32,
    pub paragraph_margin_bottom: f32,
    /// Extra height for a paragraph carrying an inline image
    pub embedded_image_height: f32,
    pub question_chars_per_line: usize,
    pub question_min_height: f32,
    pub heading_major_height: f32,
    pub heading_minor_height: f32,
    pub image_height: f32,
    pub video_height: f32,
    pub youtube_embed_height: f32,
    pub biography_header_height: f32,
    pub biography_item_height: f32,
    pub footnotes_header_height: f32,
    pub footnote_line_height: f32,
    pub footnote_chars_per_line: usize,
    /// Top plus bottom margin around a footnotes block
    pub footnotes_margin: f32,
    pub qr_reference_height: f32,
    /// Height for kinds the estimator does not know
    pub fallback_height: f32,
}

impl Default for SizingConstants {
    fn default() -> Self {
        Self {
            line_height: 24.0,
            chars_per_line: 70,
            paragraph_min_height: 48.0,
            paragraph_margin_bottom: 16.0,
            embedded_image_height: 320.0,
            question_chars_per_line: 60,
            question_min_height: 72.0,
            heading_major_height: 64.0,
            heading_minor_height: 45.0,
            image_height: 400.0,
            video_height: 360.0,
            youtube_embed_height: 360.0,
            biography_header_height: 40.0,
            biography_item_height: 28.0,
            footnotes_header_height: 36.0,
            footnote_line_height: 18.0,
            footnote_chars_per_line: 90,
            footnotes_margin: 24.0,
            qr_reference_height: 96.0,
            fallback_height: 24.0,
        }
    }
}

/// Pagination rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationRules {
    /// Keep heading with following element
    pub keep_heading_with_next: bool,
    /// Content a page needs before a paragraph may start the next page
    pub min_content_paragraph: f32,
    /// Content a page needs before an unseparable element may start the next page
    pub min_content_unseparable: f32,
    /// Remaining height below which a paragraph is not split
    pub min_split_space: f32,
    /// A trailing heading on a page with less content than this moves to a new page
    pub substantial_content: f32,
    /// Upper bound on how many times one paragraph is split
    pub max_chained_splits: usize,
}

impl Default for PaginationRules {
    fn default() -> Self {
        Self {
            keep_heading_with_next: true,
            min_content_paragraph: 0.0,
            min_content_unseparable: 20.0,
            min_split_space: 64.0,
            substantial_content: 150.0,
            max_chained_splits: 32,
        }
    }
}

/// Complete configuration for paginating one issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    pub mode: PaginationMode,
    /// Usable height of a page
    pub max_page_height: f32,
    /// Width text is rendered at
    pub render_width: f32,
    pub sizing: SizingConstants,
    pub rules: PaginationRules,
    /// Return a structured trace alongside the pages
    pub diagnostics: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            mode: PaginationMode::Automatic,
            max_page_height: 1000.0,
            render_width: 560.0,
            sizing: SizingConstants::default(),
            rules: PaginationRules::default(),
            diagnostics: false,
        }
    }
}

impl PaginationConfig {
    /// Decode a (possibly partial) configuration and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_mode(mut self, mode: PaginationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_page_height(mut self, max_page_height: f32) -> Self {
        self.max_page_height = max_page_height;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Reject values that would stall or divide by zero
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("maxPageHeight", self.max_page_height),
            ("renderWidth", self.render_width),
            ("lineHeight", self.sizing.line_height),
            ("footnoteLineHeight", self.sizing.footnote_line_height),
            ("fallbackHeight", self.sizing.fallback_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PaginationError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let per_line = [
            ("charsPerLine", self.sizing.chars_per_line),
            ("questionCharsPerLine", self.sizing.question_chars_per_line),
            ("footnoteCharsPerLine", self.sizing.footnote_chars_per_line),
        ];
        for (name, value) in per_line {
            if value == 0 {
                return Err(PaginationError::InvalidConfig(format!(
                    "{name} must be at least 1"
                )));
            }
        }

        Ok(())
    }
}
