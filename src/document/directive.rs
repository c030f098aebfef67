//! Authored page-placement directives (manual pagination)

use serde::{Deserialize, Serialize};

/// How a placed element is drawn instead of its normal form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// Footer QR code pointing at the element's image or link
    Qr,
}

/// Authored split of one element across a page and the page after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    /// Content kept on the directive's page
    pub content_page: String,
    /// Content carried to the following page
    #[serde(default)]
    pub content_next_page: Option<String>,
    /// Justify the last line of the first part so it runs to the trailing edge
    #[serde(default)]
    pub align_last: bool,
}

/// Where an element goes in manual mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementDirective {
    /// Target page, 1-based
    pub page: u32,
    /// Marker substitution (`"type": "qr"`)
    #[serde(default, rename = "type")]
    pub marker: Option<MarkerKind>,
    /// Resource the marker points at
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub division: Option<Division>,
}

impl PlacementDirective {
    /// Place on a page with nothing else
    pub fn on_page(page: u32) -> Self {
        Self {
            page,
            marker: None,
            path: None,
            division: None,
        }
    }

    /// Place on a page, splitting the content with the next page
    pub fn divided(page: u32, content_page: impl Into<String>, content_next_page: impl Into<String>) -> Self {
        Self {
            division: Some(Division {
                content_page: content_page.into(),
                content_next_page: Some(content_next_page.into()),
                align_last: false,
            }),
            ..Self::on_page(page)
        }
    }
}
