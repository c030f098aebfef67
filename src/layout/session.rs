//! Two-pass layout session
//!
//! The web reader paints estimated pages first, measures what it painted and
//! hands the heights back for a second pass. Between the two the article may
//! change or the reader may navigate away, so the measured pass is tied to
//! the document generation that produced the estimate: a ticket from an older
//! generation is refused instead of laying out heights that belong to a
//! different document.

use crate::document::FlowDocument;
use crate::error::{PaginationError, Result};
use crate::layout::assembly::Page;
use crate::layout::config::{PaginationConfig, PaginationMode};
use crate::layout::estimator::{HeightSource, MeasuredHeights};
use crate::layout::manual::{paginate_manual, ContentWarning};
use crate::layout::measure::TextMeasurer;
use crate::layout::pagination::{paginate, Pagination};
use crate::layout::trace::LayoutTrace;
use serde::Serialize;
use std::sync::Arc;

/// Permission to run the measured pass for one document generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RemeasureTicket(u64);

impl RemeasureTicket {
    pub fn from_generation(generation: u64) -> Self {
        Self(generation)
    }

    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Pages produced by one pass of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutUpdate {
    pub pages: Arc<[Page]>,
    pub warnings: Vec<ContentWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<LayoutTrace>,
    /// Present while the measured pass is still owed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<RemeasureTicket>,
}

/// Paginates one article at a time, across both passes
pub struct LayoutSession<M: TextMeasurer> {
    config: PaginationConfig,
    measurer: M,
    document: FlowDocument,
    generation: u64,
    pending: Option<u64>,
    pages: Arc<[Page]>,
}

impl<M: TextMeasurer> LayoutSession<M> {
    pub fn new(config: PaginationConfig, measurer: M) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            measurer,
            document: FlowDocument::default(),
            generation: 0,
            pending: None,
            pages: Arc::from(Vec::new()),
        })
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Swap in a different oracle; takes effect from the next pass
    pub fn measurer_mut(&mut self) -> &mut M {
        &mut self.measurer
    }

    pub fn document(&self) -> &FlowDocument {
        &self.document
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pages of the latest pass
    pub fn pages(&self) -> Arc<[Page]> {
        Arc::clone(&self.pages)
    }

    pub fn is_remeasure_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Lay out a new document from estimates (or from its directives in
    /// manual mode). Any measured pass owed for the previous document is
    /// abandoned.
    pub fn load(&mut self, document: FlowDocument) -> LayoutUpdate {
        self.document = document;
        self.relayout()
    }

    /// Replace the configuration and lay the current document out again.
    /// The measurer follows the new configuration before the pass runs.
    pub fn reconfigure(&mut self, config: PaginationConfig) -> Result<LayoutUpdate> {
        config.validate()?;
        self.measurer.reconfigure(&config);
        self.config = config;
        Ok(self.relayout())
    }

    /// Run the measured pass for the generation `ticket` was issued for
    pub fn complete(&mut self, ticket: RemeasureTicket, heights: &MeasuredHeights) -> Result<LayoutUpdate> {
        if ticket.generation() != self.generation {
            return Err(PaginationError::StaleRemeasure {
                ticket: ticket.generation(),
                current: self.generation,
            });
        }
        if self.pending != Some(ticket.generation()) {
            return Err(PaginationError::RemeasureNotPending);
        }

        self.pending = None;
        log::debug!(
            "measured pass for generation {} with {} heights",
            self.generation,
            heights.len()
        );
        let result = paginate(
            &self.document,
            &self.config,
            &self.measurer,
            HeightSource::Measured(heights),
        );
        Ok(self.publish(result, None))
    }

    /// Drop the owed measured pass; its ticket becomes stale
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.generation += 1;
            log::debug!("remeasure cancelled, generation now {}", self.generation);
        }
    }

    fn relayout(&mut self) -> LayoutUpdate {
        self.generation += 1;
        self.pending = None;

        let result = match self.config.mode {
            PaginationMode::Manual => paginate_manual(&self.document, &self.config),
            PaginationMode::Automatic => paginate(
                &self.document,
                &self.config,
                &self.measurer,
                HeightSource::Estimated,
            ),
        };

        let ticket = result.needs_remeasure.then(|| {
            self.pending = Some(self.generation);
            RemeasureTicket(self.generation)
        });
        self.publish(result, ticket)
    }

    fn publish(&mut self, result: Pagination, ticket: Option<RemeasureTicket>) -> LayoutUpdate {
        self.pages = Arc::from(result.pages);
        LayoutUpdate {
            pages: Arc::clone(&self.pages),
            warnings: result.warnings,
            trace: result.trace,
            ticket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentElement, ElementId, PlacementDirective};
    use crate::layout::measure::MonospaceMeasurer;

    fn session(config: PaginationConfig) -> LayoutSession<MonospaceMeasurer> {
        let measurer = MonospaceMeasurer::from_config(&config);
        LayoutSession::new(config, measurer).unwrap()
    }

    fn article() -> FlowDocument {
        FlowDocument::new(vec![
            ContentElement::heading_minor("Intro"),
            ContentElement::paragraph("Some words here."),
            ContentElement::image("/a.png"),
        ])
    }

    #[test]
    fn test_load_issues_ticket() {
        let mut session = session(PaginationConfig::default());
        let update = session.load(article());
        let ticket = update.ticket.unwrap();
        assert_eq!(ticket.generation(), session.generation());
        assert!(session.is_remeasure_pending());
        assert_eq!(session.pages().len(), update.pages.len());
    }

    #[test]
    fn test_complete_applies_measured_heights() {
        let config = PaginationConfig::default().with_max_page_height(500.0);
        let mut session = session(config);
        let ticket = session.load(article()).ticket.unwrap();

        let heights: MeasuredHeights = [(ElementId(0), 45.0), (ElementId(1), 300.0), (ElementId(2), 160.0)]
            .into_iter()
            .collect();
        let update = session.complete(ticket, &heights).unwrap();
        assert_eq!(update.pages.len(), 2);
        assert!(update.ticket.is_none());
        assert!(!session.is_remeasure_pending());
        assert_eq!(session.pages(), update.pages);
    }

    #[test]
    fn test_ticket_from_previous_document_is_stale() {
        let mut session = session(PaginationConfig::default());
        let old = session.load(article()).ticket.unwrap();
        session.load(article());

        let err = session.complete(old, &MeasuredHeights::new()).unwrap_err();
        assert!(matches!(
            err,
            PaginationError::StaleRemeasure { ticket, current } if ticket == old.generation() && current == old.generation() + 1
        ));
    }

    #[test]
    fn test_cancel_makes_ticket_stale() {
        let mut session = session(PaginationConfig::default());
        let ticket = session.load(article()).ticket.unwrap();
        session.cancel();
        assert!(!session.is_remeasure_pending());
        assert!(matches!(
            session.complete(ticket, &MeasuredHeights::new()),
            Err(PaginationError::StaleRemeasure { .. })
        ));
    }

    #[test]
    fn test_complete_twice_is_refused() {
        let mut session = session(PaginationConfig::default());
        let ticket = session.load(article()).ticket.unwrap();
        session.complete(ticket, &MeasuredHeights::new()).unwrap();
        assert!(matches!(
            session.complete(ticket, &MeasuredHeights::new()),
            Err(PaginationError::RemeasureNotPending)
        ));
    }

    #[test]
    fn test_manual_mode_needs_no_remeasure() {
        let mut session = session(PaginationConfig::default().with_mode(PaginationMode::Manual));
        let update = session.load(FlowDocument::new(vec![
            ContentElement::paragraph("a").with_placement(PlacementDirective::on_page(1)),
            ContentElement::paragraph("b").with_placement(PlacementDirective::on_page(2)),
        ]));
        assert!(update.ticket.is_none());
        assert_eq!(update.pages.len(), 2);
    }

    #[test]
    fn test_empty_document_needs_no_remeasure() {
        let mut session = session(PaginationConfig::default());
        let update = session.load(FlowDocument::default());
        assert!(update.ticket.is_none());
        assert_eq!(update.pages.len(), 1);
    }

    #[test]
    fn test_reconfigure_validates_and_relays() {
        let mut session = session(PaginationConfig::default());
        let first = session.load(article()).ticket.unwrap();

        let bad = PaginationConfig::default().with_max_page_height(0.0);
        assert!(matches!(session.reconfigure(bad), Err(PaginationError::InvalidConfig(_))));
        assert_eq!(session.generation(), first.generation());

        let update = session
            .reconfigure(PaginationConfig::default().with_max_page_height(200.0))
            .unwrap();
        assert!(update.pages.len() > 1);
        assert_ne!(update.ticket, Some(first));
    }

    #[test]
    fn test_reconfigure_updates_measurer() {
        let mut session = session(PaginationConfig::default());
        let text = "x".repeat(70);
        assert_eq!(session.measurer_mut().line_count(&text, 560.0), 1);

        let mut narrow = PaginationConfig::default();
        narrow.sizing.chars_per_line = 35;
        session.reconfigure(narrow.clone()).unwrap();

        let fresh = MonospaceMeasurer::from_config(&narrow);
        assert_eq!(session.measurer_mut().line_count(&text, 560.0), 2);
        assert_eq!(fresh.line_count(&text, 560.0), 2);
    }

    #[test]
    fn test_update_json_shape() {
        let mut session = session(PaginationConfig::default());
        let update = session.load(article());
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["ticket"], session.generation());
        assert_eq!(json["pages"][0]["pageNumber"], 1);
        assert!(json.get("trace").is_none());
    }
}
