//! Font metrics for the built-in text measurer

use unicode_segmentation::UnicodeSegmentation;

/// Metrics needed to measure a run of text
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Line height in layout units
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 560 units / 70 chars, 24-unit lines: the default print column
        Self::monospace(8.0, 24.0)
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Every character has the same advance
    pub fn monospace(char_width: f32, line_height: f32) -> Self {
        Self {
            line_height,
            char_widths: vec![char_width; 128],
            default_width: char_width,
        }
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Advance of a run, one advance per grapheme cluster. Control
    /// characters take no room.
    pub fn advance(&self, text: &str) -> f32 {
        text.graphemes(true)
            .map(|g| match g.chars().next() {
                Some(c) if c.is_control() => 0.0,
                Some(c) => self.width(c),
                None => 0.0,
            })
            .sum()
    }

    /// Visible width of a run: trailing whitespace hangs past the edge
    pub fn text_width(&self, text: &str) -> f32 {
        self.advance(text.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_widths() {
        let metrics = FontMetrics::monospace(8.0, 24.0);
        assert_eq!(metrics.width('a'), 8.0);
        assert_eq!(metrics.width('é'), 8.0);
        assert_eq!(metrics.text_width("word "), 32.0);
        assert_eq!(metrics.advance("word "), 40.0);
        assert_eq!(metrics.advance("a\n"), 8.0);
    }

    #[test]
    fn test_custom_ascii_width() {
        let mut widths = vec![8.0; 128];
        widths['i' as usize] = 3.0;
        let metrics = FontMetrics::new(20.0, widths, 10.0);
        assert_eq!(metrics.text_width("ii"), 6.0);
        assert_eq!(metrics.width('ß'), 10.0);
    }
}
