//! Folio pager: fixed-height print pages from periodical articles
//!
//! This crate provides the pagination engine behind the issue reader and the
//! PDF export:
//! - Automatic pagination of a flow document with keep-with-next headings
//!   and paragraph splitting at page boundaries
//! - Manual pagination from authored page directives
//! - A two-pass session that relays pages out once real heights are measured
//! - WASM bindings for the web reader

pub mod document;
pub mod error;
pub mod layout;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use document::{ContentElement, ElementId, ElementKind, FlowDocument, PlacementDirective, SplitMarker};
pub use error::{PaginationError, Result};
pub use layout::{
    paginate, paginate_manual, ContentWarning, HeightSource, LayoutSession, MeasuredHeights,
    MonospaceMeasurer, Page, Pagination, PaginationConfig, PaginationMode, TextMeasurer,
};

/// One-shot pagination with the built-in monospace measurer.
///
/// Dispatches on `config.mode`. In automatic mode the result comes from
/// estimates and reports `needs_remeasure`; use a [`LayoutSession`] to run the
/// measured pass.
pub fn paginate_document(document: &FlowDocument, config: &PaginationConfig) -> Result<Pagination> {
    config.validate()?;
    let result = match config.mode {
        PaginationMode::Manual => paginate_manual(document, config),
        PaginationMode::Automatic => {
            let measurer = MonospaceMeasurer::from_config(config);
            paginate(document, config, &measurer, HeightSource::Estimated)
        }
    };
    Ok(result)
}
