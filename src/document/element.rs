//! Content elements of an article body

use crate::document::directive::PlacementDirective;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an element in its source document. Split fragments keep the
/// id of the paragraph they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-element style overrides, passed through to the renderer untouched
pub type StyleOverrides = FxHashMap<String, String>;

/// One entry of a footnotes block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footnote {
    pub index: u32,
    pub body_text: String,
}

/// The kind of content element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ElementKind {
    #[default]
    Paragraph,
    ParagraphQuote,
    HeadingMajor,
    HeadingMinor,
    Question,
    Image,
    Video,
    YoutubeEmbed,
    Biography { citations: Vec<String> },
    Footnotes { entries: Vec<Footnote> },
    /// Footer image reference substituted by a manual `qr` marker
    QrReference,
    /// A kind this engine does not know; laid out with the fallback height
    Other(String),
}

impl ElementKind {
    /// Wire name of this kind
    pub fn name(&self) -> &str {
        match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::ParagraphQuote => "paragraph-quote",
            ElementKind::HeadingMajor => "heading-major",
            ElementKind::HeadingMinor => "heading-minor",
            ElementKind::Question => "question",
            ElementKind::Image => "image",
            ElementKind::Video => "video",
            ElementKind::YoutubeEmbed => "youtube-embed",
            ElementKind::Biography { .. } => "biography",
            ElementKind::Footnotes { .. } => "footnotes",
            ElementKind::QrReference => "qr-reference",
            ElementKind::Other(name) => name,
        }
    }

    fn from_parts(name: String, citations: Vec<String>, entries: Vec<Footnote>) -> Self {
        match name.as_str() {
            "paragraph" => ElementKind::Paragraph,
            "paragraph-quote" => ElementKind::ParagraphQuote,
            "heading-major" => ElementKind::HeadingMajor,
            "heading-minor" => ElementKind::HeadingMinor,
            "question" => ElementKind::Question,
            "image" => ElementKind::Image,
            "video" => ElementKind::Video,
            "youtube-embed" => ElementKind::YoutubeEmbed,
            "biography" => ElementKind::Biography { citations },
            "footnotes" => ElementKind::Footnotes { entries },
            "qr-reference" => ElementKind::QrReference,
            _ => ElementKind::Other(name),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, ElementKind::HeadingMajor | ElementKind::HeadingMinor)
    }

    /// Flowing text laid out by the line formula
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ElementKind::Paragraph | ElementKind::ParagraphQuote | ElementKind::Question
        )
    }

    pub fn is_media(&self) -> bool {
        matches!(
            self,
            ElementKind::Image | ElementKind::Video | ElementKind::YoutubeEmbed
        )
    }

    /// Kinds that must never be split across pages
    pub fn is_unseparable(&self) -> bool {
        self.is_heading()
            || self.is_media()
            || matches!(
                self,
                ElementKind::Biography { .. } | ElementKind::Footnotes { .. } | ElementKind::QrReference
            )
    }
}

/// Marks a fragment produced by splitting a paragraph.
///
/// A fragment cut from the middle of a chain of splits is both: it continues
/// a previous page and is continued on the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitMarker {
    /// The paragraph continues on the next page
    pub first_half: bool,
    /// The paragraph started on a previous page
    pub second_half: bool,
}

impl SplitMarker {
    pub const FIRST_HALF: Self = Self { first_half: true, second_half: false };
    pub const SECOND_HALF: Self = Self { first_half: false, second_half: true };
}

/// A single typed block of an article
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawElement", into = "RawElement")]
pub struct ContentElement {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Body text, possibly with inline markup
    pub body: String,
    pub style: Option<StyleOverrides>,
    pub class_name: Option<String>,
    pub embedded_image: Option<String>,
    pub split: Option<SplitMarker>,
    pub placement: Option<PlacementDirective>,
}

impl ContentElement {
    pub fn new(kind: ElementKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn paragraph(body: impl Into<String>) -> Self {
        Self::new(ElementKind::Paragraph, body)
    }

    pub fn heading_major(body: impl Into<String>) -> Self {
        Self::new(ElementKind::HeadingMajor, body)
    }

    pub fn heading_minor(body: impl Into<String>) -> Self {
        Self::new(ElementKind::HeadingMinor, body)
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self {
            embedded_image: Some(src.into()),
            ..Self::new(ElementKind::Image, "")
        }
    }

    pub fn with_placement(mut self, placement: PlacementDirective) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_embedded_image(mut self, src: impl Into<String>) -> Self {
        self.embedded_image = Some(src.into());
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style
            .get_or_insert_with(StyleOverrides::default)
            .insert(property.into(), value.into());
        self
    }

    /// Plain reflowable paragraph that the splitter may cut
    pub fn is_splittable(&self) -> bool {
        self.kind == ElementKind::Paragraph && self.embedded_image.is_none()
    }

    pub fn is_fragment(&self) -> bool {
        self.split.is_some()
    }

    /// Copy of this element carrying different text and a split marker
    pub fn fragment(&self, body: impl Into<String>, marker: SplitMarker) -> Self {
        Self {
            body: body.into(),
            split: Some(marker),
            ..self.clone()
        }
    }
}

/// Wire shape of an element as the content store and the web reader see it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    #[serde(default)]
    id: ElementId,
    kind: String,
    #[serde(default)]
    body_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style_overrides: Option<StyleOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    embedded_image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    citations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    footnotes: Vec<Footnote>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_first_half: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_second_half: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placement: Option<PlacementDirective>,
}

impl From<RawElement> for ContentElement {
    fn from(raw: RawElement) -> Self {
        let split = (raw.is_first_half || raw.is_second_half).then_some(SplitMarker {
            first_half: raw.is_first_half,
            second_half: raw.is_second_half,
        });

        Self {
            id: raw.id,
            kind: ElementKind::from_parts(raw.kind, raw.citations, raw.footnotes),
            body: raw.body_text,
            style: raw.style_overrides,
            class_name: raw.class_name,
            embedded_image: raw.embedded_image_ref,
            split,
            placement: raw.placement,
        }
    }
}

impl From<ContentElement> for RawElement {
    fn from(element: ContentElement) -> Self {
        let kind = element.kind.name().to_string();
        let (citations, footnotes) = match element.kind {
            ElementKind::Biography { citations } => (citations, Vec::new()),
            ElementKind::Footnotes { entries } => (Vec::new(), entries),
            _ => (Vec::new(), Vec::new()),
        };
        let split = element.split.unwrap_or_default();

        Self {
            id: element.id,
            kind,
            body_text: element.body,
            style_overrides: element.style,
            class_name: element.class_name,
            embedded_image_ref: element.embedded_image,
            citations,
            footnotes,
            is_first_half: split.first_half,
            is_second_half: split.second_half,
            placement: element.placement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classes() {
        assert!(ElementKind::HeadingMinor.is_heading());
        assert!(ElementKind::HeadingMajor.is_unseparable());
        assert!(ElementKind::YoutubeEmbed.is_media());
        assert!(ElementKind::Biography { citations: vec![] }.is_unseparable());
        assert!(!ElementKind::Paragraph.is_unseparable());
        assert!(ElementKind::Question.is_text());
        assert!(!ElementKind::Other("table".into()).is_unseparable());
    }

    #[test]
    fn test_splittable() {
        assert!(ContentElement::paragraph("words").is_splittable());
        assert!(!ContentElement::paragraph("words").with_embedded_image("a.png").is_splittable());
        assert!(!ContentElement::new(ElementKind::ParagraphQuote, "q").is_splittable());
    }

    #[test]
    fn test_decode_kind_specific_fields() {
        let json = r#"[
            {"kind": "biography", "bodyText": "About", "citations": ["One", "Two"]},
            {"kind": "footnotes", "footnotes": [{"index": 1, "bodyText": "Note"}]},
            {"kind": "pull-quote", "bodyText": "?"}
        ]"#;
        let elements: Vec<ContentElement> = serde_json::from_str(json).unwrap();
        assert_eq!(
            elements[0].kind,
            ElementKind::Biography { citations: vec!["One".into(), "Two".into()] }
        );
        match &elements[1].kind {
            ElementKind::Footnotes { entries } => assert_eq!(entries[0].body_text, "Note"),
            other => panic!("unexpected kind {other:?}"),
        }
        assert_eq!(elements[2].kind, ElementKind::Other("pull-quote".into()));
    }

    #[test]
    fn test_split_marker_wire_names() {
        let fragment = ContentElement::paragraph("whole").fragment("part", SplitMarker::FIRST_HALF);
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["isFirstHalf"], true);
        assert!(json.get("isSecondHalf").is_none());
        assert_eq!(json["bodyText"], "part");

        let back: ContentElement = serde_json::from_value(json).unwrap();
        assert_eq!(back.split, Some(SplitMarker::FIRST_HALF));
    }

    #[test]
    fn test_style_builder() {
        let el = ContentElement::paragraph("x").with_style("color", "red");
        assert_eq!(el.style.unwrap().get("color").map(String::as_str), Some("red"));
    }
}
