//! Flow document model: the typed, ordered body of one article

mod directive;
mod element;
pub mod markup;

pub use directive::{Division, MarkerKind, PlacementDirective};
pub use element::{ContentElement, ElementId, ElementKind, Footnote, SplitMarker, StyleOverrides};

use crate::layout::Page;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::sync::Arc;

/// The ordered elements of one article.
///
/// Immutable once built; element ids are reassigned to document positions on
/// construction so that measured heights and split fragments can refer back
/// to their source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowDocument {
    elements: Arc<[ContentElement]>,
}

impl FlowDocument {
    pub fn new(elements: impl IntoIterator<Item = ContentElement>) -> Self {
        let elements: Vec<_> = elements
            .into_iter()
            .enumerate()
            .map(|(idx, mut element)| {
                element.id = ElementId(idx);
                element
            })
            .collect();

        Self {
            elements: elements.into(),
        }
    }

    /// Decode a document from the content store's JSON array of elements
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let elements: Vec<ContentElement> = serde_json::from_str(json)?;
        Ok(Self::new(elements))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&ContentElement> {
        self.elements.get(id.0)
    }

    pub fn elements(&self) -> &[ContentElement] {
        &self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentElement> + '_ {
        self.elements.iter()
    }

    /// True if any element carries an authored placement directive
    pub fn has_placements(&self) -> bool {
        self.elements.iter().any(|el| el.placement.is_some())
    }

    /// Concatenate the elements of `pages` and merge split fragments back into
    /// the paragraph they came from.
    ///
    /// Consecutive fragments of the same source element are joined with a
    /// single space; the result carries no split marker.
    pub fn reassemble(pages: &[Page]) -> Vec<ContentElement> {
        let mut merged: Vec<ContentElement> = Vec::new();

        for element in pages.iter().flat_map(|page| page.elements.iter()) {
            let continues_previous = element.split.is_some_and(|m| m.second_half);
            match merged.last_mut() {
                Some(last) if continues_previous && last.id == element.id => {
                    if !last.body.is_empty() && !element.body.is_empty() {
                        last.body.push(' ');
                    }
                    last.body.push_str(&element.body);
                }
                _ => merged.push(element.clone()),
            }
        }

        for element in &mut merged {
            element.split = None;
        }

        merged
    }
}

impl Index<usize> for FlowDocument {
    type Output = ContentElement;

    fn index(&self, index: usize) -> &Self::Output {
        &self.elements[index]
    }
}

impl FromIterator<ContentElement> for FlowDocument {
    fn from_iter<T: IntoIterator<Item = ContentElement>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl Serialize for FlowDocument {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.elements().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FlowDocument {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<ContentElement>::deserialize(deserializer).map(Self::new)
    }
}
