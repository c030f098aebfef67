//! Page assembly: numbered, immutable pages from packed element groups

use crate::document::ContentElement;
use serde::Serialize;

/// Which header the renderer draws on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageHeader {
    /// Full article header (first page)
    Full,
    /// Condensed running header (pages 2..N)
    Continuation,
}

/// One fixed-height page of an article
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub elements: Vec<ContentElement>,
    pub is_first_page: bool,
    /// 1-based
    pub page_number: u32,
    pub total_pages: u32,
}

impl Page {
    pub fn header(&self) -> PageHeader {
        if self.is_first_page {
            PageHeader::Full
        } else {
            PageHeader::Continuation
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True if the page ends with a paragraph that runs on to the next page
    pub fn continues_on_next(&self) -> bool {
        self.elements
            .last()
            .and_then(|el| el.split)
            .is_some_and(|marker| marker.first_half)
    }
}

/// Number packed groups into pages.
///
/// Empty groups are skipped so no page is blank, except that an empty input
/// still yields exactly one empty page. `total_pages` is stamped on every page
/// once the count is known.
pub fn assemble(groups: Vec<Vec<ContentElement>>) -> Vec<Page> {
    let mut pages: Vec<Page> = groups
        .into_iter()
        .filter(|group| !group.is_empty())
        .enumerate()
        .map(|(idx, elements)| Page {
            elements,
            is_first_page: idx == 0,
            page_number: idx as u32 + 1,
            total_pages: 0,
        })
        .collect();

    if pages.is_empty() {
        pages.push(Page {
            elements: Vec::new(),
            is_first_page: true,
            page_number: 1,
            total_pages: 0,
        });
    }

    let total = pages.len() as u32;
    for page in &mut pages {
        page.total_pages = total;
    }

    pages
}
