//! Manual pagination from authored placement directives
//!
//! Every heuristic of the automatic packer is off here: the editor decided
//! which page each element lands on. Authored page numbers only order the
//! output; gaps are closed so the emitted pages stay numbered `1..=N`.

use crate::document::{
    ContentElement, Division, ElementId, ElementKind, FlowDocument, MarkerKind, PlacementDirective,
    SplitMarker,
};
use crate::layout::assembly::assemble;
use crate::layout::config::PaginationConfig;
use crate::layout::pagination::Pagination;
use crate::layout::trace::{Recorder, TraceEvent};
use serde::Serialize;
use std::collections::BTreeMap;

/// Style applied to the first part of a division with `alignLast`
const ALIGN_LAST_PROPERTY: &str = "text-align-last";
const ALIGN_LAST_VALUE: &str = "justify";

/// An authoring problem found while laying out a manual document.
///
/// None of these stop pagination; the affected element is still placed and
/// the caller decides how to surface the warning to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "warning", rename_all = "camelCase")]
pub enum ContentWarning {
    #[error("none of the {elements} elements carries a page placement")]
    #[serde(rename_all = "camelCase")]
    NoPlacements { elements: usize },

    #[error("element {element} has no page placement, kept on page {page}")]
    #[serde(rename_all = "camelCase")]
    MissingPlacement { element: ElementId, page: u32 },

    #[error("element {element} is placed on page 0, moved to page 1")]
    #[serde(rename_all = "camelCase")]
    PageZero { element: ElementId },

    #[error("element {element} divides its content on page {page} but has nothing for the next page")]
    #[serde(rename_all = "camelCase")]
    DivisionMissingNextPage { element: ElementId, page: u32 },

    #[error("qr marker on element {element} has no path and no image to point at")]
    #[serde(rename_all = "camelCase")]
    MarkerWithoutTarget { element: ElementId },

    #[error("element {element} divides its content on page {page}, which has no next page")]
    #[serde(rename_all = "camelCase")]
    DivisionOnLastPage { element: ElementId, page: u32 },

    #[error("pages {from} to {to} have no content and were skipped")]
    #[serde(rename_all = "camelCase")]
    EmptyPages { from: u32, to: u32 },
}

/// Elements assigned to one authored page
#[derive(Debug, Default)]
struct PageSlot {
    /// Second parts of divisions started on the previous page
    carried: Vec<ContentElement>,
    placed: Vec<ContentElement>,
}

impl PageSlot {
    fn is_empty(&self) -> bool {
        self.carried.is_empty() && self.placed.is_empty()
    }

    fn into_elements(self) -> Vec<ContentElement> {
        let mut elements = self.carried;
        elements.extend(self.placed);
        elements
    }
}

/// Paginate `document` by its placement directives
pub fn paginate_manual(document: &FlowDocument, config: &PaginationConfig) -> Pagination {
    let mut recorder = Recorder::new(config.diagnostics);
    let mut warnings = Vec::new();

    if !document.is_empty() && !document.has_placements() {
        log::warn!(
            "manual pagination of {} elements without any placement directive",
            document.len()
        );
        warnings.push(ContentWarning::NoPlacements {
            elements: document.len(),
        });
        return Pagination {
            pages: assemble(Vec::new()),
            warnings,
            trace: recorder.finish(),
            needs_remeasure: false,
        };
    }

    let mut slots: BTreeMap<u32, PageSlot> = BTreeMap::new();
    let mut last_page: Option<u32> = None;

    for element in document.iter() {
        let Some(directive) = element.placement.as_ref() else {
            let page = last_page.unwrap_or(1);
            warnings.push(ContentWarning::MissingPlacement {
                element: element.id,
                page,
            });
            recorder.record(|| TraceEvent::Assigned {
                element: element.id,
                page,
            });
            slots.entry(page).or_default().placed.push(element.clone());
            continue;
        };

        let page = if directive.page == 0 {
            warnings.push(ContentWarning::PageZero { element: element.id });
            1
        } else {
            directive.page
        };

        let placed = apply_marker(element, directive, &mut warnings);
        recorder.record(|| TraceEvent::Assigned {
            element: element.id,
            page,
        });

        match directive.division.as_ref() {
            Some(division) => {
                last_page = Some(place_division(&mut slots, placed, division, page, &mut warnings));
            }
            None => {
                slots.entry(page).or_default().placed.push(placed);
                last_page = Some(page);
            }
        }
    }

    let mut groups = Vec::with_capacity(slots.len());
    let mut expected: u32 = 1;
    for (page, slot) in slots {
        if slot.is_empty() {
            continue;
        }
        if page > expected {
            warnings.push(ContentWarning::EmptyPages {
                from: expected,
                to: page - 1,
            });
        }
        groups.push(slot.into_elements());
        expected = page.saturating_add(1);
    }

    for warning in &warnings {
        log::warn!("{warning}");
    }
    log::debug!(
        "manually paginated {} elements into {} pages",
        document.len(),
        groups.len().max(1)
    );

    Pagination {
        pages: assemble(groups),
        warnings,
        trace: recorder.finish(),
        needs_remeasure: false,
    }
}

/// Rewrite an element into its marker presentation, if it has one
fn apply_marker(
    element: &ContentElement,
    directive: &PlacementDirective,
    warnings: &mut Vec<ContentWarning>,
) -> ContentElement {
    let mut placed = element.clone();
    match directive.marker {
        Some(MarkerKind::Qr) => {
            placed.kind = ElementKind::QrReference;
            if let Some(path) = &directive.path {
                placed.embedded_image = Some(path.clone());
            } else if placed.embedded_image.is_none() {
                warnings.push(ContentWarning::MarkerWithoutTarget { element: element.id });
            }
        }
        None => {}
    }
    placed
}

/// Place both parts of a division; returns the page the element ends on
fn place_division(
    slots: &mut BTreeMap<u32, PageSlot>,
    element: ContentElement,
    division: &Division,
    page: u32,
    warnings: &mut Vec<ContentWarning>,
) -> u32 {
    let next_content = division
        .content_next_page
        .as_deref()
        .filter(|content| !content.trim().is_empty());

    let Some(next_content) = next_content else {
        warnings.push(ContentWarning::DivisionMissingNextPage {
            element: element.id,
            page,
        });
        let whole = ContentElement {
            body: division.content_page.clone(),
            ..element
        };
        slots.entry(page).or_default().placed.push(whole);
        return page;
    };

    let Some(next_page) = page.checked_add(1) else {
        warnings.push(ContentWarning::DivisionOnLastPage {
            element: element.id,
            page,
        });
        let whole = ContentElement {
            body: format!("{} {next_content}", division.content_page),
            ..element
        };
        slots.entry(page).or_default().placed.push(whole);
        return page;
    };

    let mut first = element.fragment(division.content_page.clone(), SplitMarker::FIRST_HALF);
    if division.align_last {
        first = first.with_style(ALIGN_LAST_PROPERTY, ALIGN_LAST_VALUE);
    }

    let mut second = element.fragment(next_content, SplitMarker::SECOND_HALF);
    second.placement = Some(PlacementDirective::on_page(next_page));

    slots.entry(page).or_default().placed.push(first);
    slots.entry(next_page).or_default().carried.push(second);
    next_page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::PaginationMode;

    fn config() -> PaginationConfig {
        PaginationConfig::default().with_mode(PaginationMode::Manual)
    }

    fn on(page: u32, body: &str) -> ContentElement {
        ContentElement::paragraph(body).with_placement(PlacementDirective::on_page(page))
    }

    fn bodies(result: &Pagination) -> Vec<Vec<&str>> {
        result
            .pages
            .iter()
            .map(|page| page.elements.iter().map(|el| el.body.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_groups_by_page() {
        let doc = FlowDocument::new(vec![on(1, "a"), on(1, "b"), on(2, "c")]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(bodies(&result), vec![vec!["a", "b"], vec!["c"]]);
        assert!(result.warnings.is_empty());
        assert!(!result.needs_remeasure);
    }

    #[test]
    fn test_division_synthesizes_next_page() {
        let doc = FlowDocument::new(vec![
            on(1, "one"),
            on(2, "two"),
            ContentElement::paragraph("").with_placement(PlacementDirective::divided(3, "A", "B")),
        ]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(result.page_count(), 4);
        assert_eq!(bodies(&result)[2], vec!["A"]);
        assert_eq!(bodies(&result)[3], vec!["B"]);
        assert_eq!(result.pages[3].page_number, 4);
        assert_eq!(result.pages[2].elements[0].split, Some(SplitMarker::FIRST_HALF));
        assert_eq!(result.pages[3].elements[0].split, Some(SplitMarker::SECOND_HALF));
        assert!(result.pages[2].continues_on_next());
    }

    #[test]
    fn test_carried_fragment_leads_the_next_page() {
        let doc = FlowDocument::new(vec![
            ContentElement::paragraph("").with_placement(PlacementDirective::divided(1, "A", "B")),
            on(2, "c"),
        ]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(bodies(&result), vec![vec!["A"], vec!["B", "c"]]);
    }

    #[test]
    fn test_align_last_styles_first_part_only() {
        let mut directive = PlacementDirective::divided(1, "A", "B");
        if let Some(division) = directive.division.as_mut() {
            division.align_last = true;
        }
        let doc = FlowDocument::new(vec![ContentElement::paragraph("").with_placement(directive)]);
        let result = paginate_manual(&doc, &config());

        let first = &result.pages[0].elements[0];
        let style = first.style.as_ref().unwrap();
        assert_eq!(style.get("text-align-last").map(String::as_str), Some("justify"));
        assert!(result.pages[1].elements[0].style.is_none());
    }

    #[test]
    fn test_division_without_next_page_is_kept_whole() {
        let mut directive = PlacementDirective::divided(1, "Only", "");
        if let Some(division) = directive.division.as_mut() {
            division.content_next_page = None;
        }
        let doc = FlowDocument::new(vec![ContentElement::paragraph("").with_placement(directive)]);
        let result = paginate_manual(&doc, &config());

        assert_eq!(bodies(&result), vec![vec!["Only"]]);
        assert_eq!(result.pages[0].elements[0].split, None);
        assert_eq!(
            result.warnings,
            vec![ContentWarning::DivisionMissingNextPage { element: ElementId(0), page: 1 }]
        );
    }

    #[test]
    fn test_qr_marker_rewrites_kind() {
        let directive = PlacementDirective {
            marker: Some(MarkerKind::Qr),
            path: Some("/media/map.png".into()),
            ..PlacementDirective::on_page(1)
        };
        let doc = FlowDocument::new(vec![ContentElement::paragraph("See map").with_placement(directive)]);
        let result = paginate_manual(&doc, &config());

        let element = &result.pages[0].elements[0];
        assert_eq!(element.kind, ElementKind::QrReference);
        assert_eq!(element.embedded_image.as_deref(), Some("/media/map.png"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_qr_marker_without_target_warns() {
        let directive = PlacementDirective {
            marker: Some(MarkerKind::Qr),
            ..PlacementDirective::on_page(1)
        };
        let doc = FlowDocument::new(vec![ContentElement::paragraph("x").with_placement(directive)]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(
            result.warnings,
            vec![ContentWarning::MarkerWithoutTarget { element: ElementId(0) }]
        );
    }

    #[test]
    fn test_no_directives_yields_one_empty_page() {
        let doc = FlowDocument::new(vec![ContentElement::paragraph("a"), ContentElement::paragraph("b")]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(result.page_count(), 1);
        assert!(result.pages[0].is_empty());
        assert_eq!(result.warnings, vec![ContentWarning::NoPlacements { elements: 2 }]);
    }

    #[test]
    fn test_empty_document() {
        let result = paginate_manual(&FlowDocument::default(), &config());
        assert_eq!(result.page_count(), 1);
        assert_eq!(result.pages[0].total_pages, 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unplaced_element_follows_previous() {
        let doc = FlowDocument::new(vec![on(2, "a"), ContentElement::paragraph("b"), on(3, "c")]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(bodies(&result), vec![vec!["a", "b"], vec!["c"]]);
        assert!(result
            .warnings
            .contains(&ContentWarning::MissingPlacement { element: ElementId(1), page: 2 }));
        assert!(result.warnings.contains(&ContentWarning::EmptyPages { from: 1, to: 1 }));
    }

    #[test]
    fn test_gaps_are_closed() {
        let doc = FlowDocument::new(vec![on(1, "a"), on(4, "d")]);
        let result = paginate_manual(&doc, &config());
        let numbers: Vec<_> = result.pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(result.warnings, vec![ContentWarning::EmptyPages { from: 2, to: 3 }]);
    }

    #[test]
    fn test_huge_page_number_is_one_gap() {
        let doc = FlowDocument::new(vec![on(1, "a"), on(4_000_000_000, "b"), on(u32::MAX, "c")]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(bodies(&result), vec![vec!["a"], vec!["b"], vec!["c"]]);
        assert_eq!(
            result.warnings,
            vec![
                ContentWarning::EmptyPages { from: 2, to: 3_999_999_999 },
                ContentWarning::EmptyPages { from: 4_000_000_001, to: u32::MAX - 1 },
            ]
        );
    }

    #[test]
    fn test_division_on_last_page_number_stays_whole() {
        let doc = FlowDocument::new(vec![
            on(1, "lead"),
            ContentElement::paragraph("").with_placement(PlacementDirective::divided(u32::MAX, "A", "B")),
        ]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(bodies(&result), vec![vec!["lead"], vec!["A B"]]);
        assert_eq!(result.pages[1].elements[0].split, None);
        assert!(result
            .warnings
            .contains(&ContentWarning::DivisionOnLastPage { element: ElementId(1), page: u32::MAX }));
    }

    #[test]
    fn test_page_zero_goes_to_first_page() {
        let doc = FlowDocument::new(vec![on(0, "a"), on(1, "b")]);
        let result = paginate_manual(&doc, &config());
        assert_eq!(bodies(&result), vec![vec!["a", "b"]]);
        assert_eq!(result.warnings, vec![ContentWarning::PageZero { element: ElementId(0) }]);
    }

    #[test]
    fn test_reassembles_divisions() {
        let doc = FlowDocument::new(vec![
            on(1, "lead"),
            ContentElement::paragraph("").with_placement(PlacementDirective::divided(1, "first part", "second part")),
        ]);
        let result = paginate_manual(&doc, &config());
        let merged = FlowDocument::reassemble(&result.pages);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].body, "first part second part");
        assert_eq!(merged[1].split, None);
    }

    #[test]
    fn test_warning_json_shape() {
        let json = serde_json::to_value(ContentWarning::EmptyPages { from: 2, to: 3 }).unwrap();
        assert_eq!(json["warning"], "emptyPages");
        assert_eq!(json["from"], 2);
        assert_eq!(json["to"], 3);
    }
}
