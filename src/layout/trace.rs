//! Structured layout diagnostics
//!
//! Collected only when `PaginationConfig::diagnostics` is set and returned next
//! to the pages, so callers can see why a page broke where it did without
//! turning on verbose logging.

use crate::document::ElementId;
use serde::Serialize;

/// Why the paginator closed a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakReason {
    /// The next element would overflow the page
    WouldExceed,
    /// A heading would be stranded without the content it introduces
    TitleNeedsFollowingContent,
    /// The first half of a split paragraph filled the page
    Split,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TraceEvent {
    /// An element was put on a page
    #[serde(rename_all = "camelCase")]
    Placed {
        element: ElementId,
        page: u32,
        height: f32,
        page_height: f32,
    },
    /// A page was closed
    #[serde(rename_all = "camelCase")]
    PageBreak {
        page: u32,
        height: f32,
        reason: BreakReason,
    },
    /// A paragraph was cut in two
    #[serde(rename_all = "camelCase")]
    Split {
        element: ElementId,
        page: u32,
        available: f32,
        first_words: usize,
        second_words: usize,
        probes: usize,
    },
    /// A split was attempted and declined
    #[serde(rename_all = "camelCase")]
    SplitDeclined {
        element: ElementId,
        available: f32,
        reason: String,
    },
    /// A page holds more than the height budget
    #[serde(rename_all = "camelCase")]
    Overflow { page: u32, height: f32 },
    /// A manual directive assigned an element to a page
    #[serde(rename_all = "camelCase")]
    Assigned { element: ElementId, page: u32 },
    /// A measured pass had no measurement for this element
    #[serde(rename_all = "camelCase")]
    EstimateFallback { element: ElementId, estimate: f32 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutTrace {
    pub events: Vec<TraceEvent>,
}

impl LayoutTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn page_breaks(&self) -> impl Iterator<Item = (u32, BreakReason)> + '_ {
        self.events.iter().filter_map(|event| match event {
            TraceEvent::PageBreak { page, reason, .. } => Some((*page, *reason)),
            _ => None,
        })
    }

    pub fn splits(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TraceEvent::Split { .. }))
            .count()
    }
}

/// Optional trace sink; recording is a no-op when diagnostics are off
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    trace: Option<LayoutTrace>,
}

impl Recorder {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            trace: enabled.then(LayoutTrace::new),
        }
    }

    pub(crate) fn record(&mut self, event: impl FnOnce() -> TraceEvent) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(event());
        }
    }

    pub(crate) fn finish(self) -> Option<LayoutTrace> {
        self.trace
    }
}
