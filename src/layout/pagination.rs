//! Automatic pagination for article bodies
//!
//! A greedy packer: elements fill the current page in document order until
//! the next one would overflow it. On top of that it keeps headings with the
//! content they introduce and cuts long paragraphs at the page boundary.
//!
//! The same packer runs twice per article, first on estimated heights and
//! then on heights measured from the first paint; only the [`HeightSource`]
//! differs between the two runs.

use crate::document::{ContentElement, FlowDocument};
use crate::layout::assembly::{assemble, Page};
use crate::layout::config::PaginationConfig;
use crate::layout::estimator::{HeightEstimator, HeightSource};
use crate::layout::manual::ContentWarning;
use crate::layout::measure::TextMeasurer;
use crate::layout::splitter::ParagraphSplitter;
use crate::layout::trace::{BreakReason, LayoutTrace, Recorder, TraceEvent};
use serde::Serialize;

/// Tolerance for floating point height sums
const EPSILON: f32 = 0.01;

/// Result of paginating one article
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub pages: Vec<Page>,
    /// Authored-content problems the caller should surface
    pub warnings: Vec<ContentWarning>,
    /// Present when diagnostics are enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<LayoutTrace>,
    /// Laid out from estimates: render, measure, and run the measured pass
    pub needs_remeasure: bool,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Paginate `document` with the automatic packer
pub fn paginate<M: TextMeasurer + ?Sized>(
    document: &FlowDocument,
    config: &PaginationConfig,
    measurer: &M,
    source: HeightSource<'_>,
) -> Pagination {
    let mut packer = Packer {
        config,
        estimator: HeightEstimator::new(config.sizing.clone()),
        splitter: ParagraphSplitter::new(measurer, config),
        source,
        recorder: Recorder::new(config.diagnostics),
        pages: Vec::new(),
        current: Vec::new(),
        current_height: 0.0,
    };

    for (idx, element) in document.iter().enumerate() {
        packer.pack(element, document.elements().get(idx + 1));
    }
    packer.close_page(None);

    log::debug!(
        "paginated {} elements into {} pages ({})",
        document.len(),
        packer.pages.len().max(1),
        if source.is_measured() { "measured" } else { "estimated" }
    );

    Pagination {
        pages: assemble(packer.pages),
        warnings: Vec::new(),
        trace: packer.recorder.finish(),
        needs_remeasure: !source.is_measured() && !document.is_empty(),
    }
}

/// Running state of one packing pass
struct Packer<'a, M: TextMeasurer + ?Sized> {
    config: &'a PaginationConfig,
    estimator: HeightEstimator,
    splitter: ParagraphSplitter<'a, M>,
    source: HeightSource<'a>,
    recorder: Recorder,
    pages: Vec<Vec<ContentElement>>,
    current: Vec<ContentElement>,
    current_height: f32,
}

impl<M: TextMeasurer + ?Sized> Packer<'_, M> {
    fn page_number(&self) -> u32 {
        self.pages.len() as u32 + 1
    }

    /// Height of `element` from the active source. Fragments are always
    /// priced by the oracle that cut them.
    fn height_of(&mut self, element: &ContentElement, report: bool) -> f32 {
        if element.is_fragment() && element.kind.is_text() {
            return self.splitter.text_height(&element.body);
        }

        match self.source {
            HeightSource::Estimated => self.estimator.estimate(element),
            HeightSource::Measured(measured) => match measured.get(element.id) {
                Some(height) => height,
                None => {
                    let estimate = self.estimator.estimate(element);
                    if report {
                        log::warn!(
                            "No measured height for element {} ({}), using estimate {estimate}",
                            element.id.0,
                            element.kind.name()
                        );
                        self.recorder.record(|| TraceEvent::EstimateFallback {
                            element: element.id,
                            estimate,
                        });
                    }
                    estimate
                }
            },
        }
    }

    /// Would a heading be left without the content it introduces?
    fn title_needs_following_content(
        &mut self,
        heading: &ContentElement,
        height: f32,
        next: Option<&ContentElement>,
    ) -> bool {
        let max = self.config.max_page_height;
        match next {
            Some(next) => {
                let next_height = self.height_of(next, false);
                let heading_fits = self.current_height + height <= max + EPSILON;
                let pair_fits = self.current_height + height + next_height <= max + EPSILON;
                // Only worth moving if the pair can share the next page
                let pair_fits_fresh = height + next_height <= max + EPSILON || next.is_splittable();
                heading_fits && !pair_fits && pair_fits_fresh
            }
            None => {
                let lacks_content = self.current_height < self.config.rules.substantial_content;
                if lacks_content {
                    log::debug!("trailing heading {} moves off a sparse page", heading.id.0);
                }
                lacks_content
            }
        }
    }

    fn pack(&mut self, element: &ContentElement, next: Option<&ContentElement>) {
        let config = self.config;
        let rules = &config.rules;
        let max = config.max_page_height;
        let mut pending = Some(element.clone());
        let mut splits = 0;

        while let Some(element) = pending.take() {
            let height = self.height_of(&element, true);
            let would_exceed = self.current_height + height > max + EPSILON;

            let title_needs_following = rules.keep_heading_with_next
                && element.kind.is_heading()
                && self.title_needs_following_content(&element, height, next);

            if would_exceed && element.is_splittable() {
                let available = max - self.current_height;
                if available > rules.min_split_space && splits < rules.max_chained_splits {
                    match self.splitter.try_split(&element, available) {
                        Ok(cut) => {
                            let page = self.page_number();
                            self.recorder.record(|| TraceEvent::Split {
                                element: element.id,
                                page,
                                available,
                                first_words: cut.first_words,
                                second_words: cut.second_words,
                                probes: cut.probes,
                            });
                            let first_height = self.height_of(&cut.first, true);
                            self.place(cut.first, first_height);
                            self.close_page(Some(BreakReason::Split));
                            splits += 1;
                            pending = Some(cut.second);
                            continue;
                        }
                        Err(reason) => {
                            log::debug!("split of element {} declined: {reason}", element.id.0);
                            self.recorder.record(|| TraceEvent::SplitDeclined {
                                element: element.id,
                                available,
                                reason: reason.to_string(),
                            });
                        }
                    }
                }
            }

            let threshold = if element.kind.is_unseparable() {
                rules.min_content_unseparable
            } else {
                rules.min_content_paragraph
            };
            // A break before an element that fits a fresh page strands nothing
            let fits_fresh_page = height <= max + EPSILON;
            let page_can_break = !self.current.is_empty()
                && (self.current_height >= threshold || (would_exceed && fits_fresh_page));

            if (would_exceed || title_needs_following) && page_can_break {
                let reason = if would_exceed {
                    BreakReason::WouldExceed
                } else {
                    BreakReason::TitleNeedsFollowingContent
                };
                self.close_page(Some(reason));
                // Re-evaluate on the fresh page, where a long paragraph may still need cutting
                pending = Some(element);
                continue;
            }

            self.place(element, height);
        }
    }

    fn place(&mut self, element: ContentElement, height: f32) {
        let page = self.page_number();
        self.current_height += height;
        let page_height = self.current_height;
        self.recorder.record(|| TraceEvent::Placed {
            element: element.id,
            page,
            height,
            page_height,
        });
        self.current.push(element);
    }

    fn close_page(&mut self, reason: Option<BreakReason>) {
        if self.current.is_empty() {
            return;
        }

        let page = self.page_number();
        let height = self.current_height;
        if height > self.config.max_page_height + EPSILON {
            log::debug!("page {page} overflows: {height} > {}", self.config.max_page_height);
            self.recorder.record(|| TraceEvent::Overflow { page, height });
        }
        if let Some(reason) = reason {
            log::debug!("break after page {page} at height {height}: {reason:?}");
            self.recorder.record(|| TraceEvent::PageBreak { page, height, reason });
        }

        self.pages.push(std::mem::take(&mut self.current));
        self.current_height = 0.0;
    }
}
