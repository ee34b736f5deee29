//! Point-in-time copies of the document's object graph.

use std::sync::Arc;

use super::geometry::BoundingRect;
use super::refs::{FontRecommendation, FormFieldRef, ObjectRef, ObjectType, PageRef, TextObjectRef};

/// One object resident on a page
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotElement {
    Object(ObjectRef),
    Text(TextObjectRef),
    FormField(FormFieldRef),
}

impl SnapshotElement {
    pub fn object_ref(&self) -> &ObjectRef {
        match self {
            SnapshotElement::Object(object_ref) => object_ref,
            SnapshotElement::Text(text) => &text.object_ref,
            SnapshotElement::FormField(field) => &field.object_ref,
        }
    }

    pub fn internal_id(&self) -> &str {
        &self.object_ref().internal_id
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_ref().object_type
    }

    pub fn bounding_rect(&self) -> Option<&BoundingRect> {
        self.object_ref().position.bounding_rect.as_ref()
    }

    /// Extracted text. Only text elements carry it.
    pub fn text(&self) -> Option<&str> {
        match self {
            SnapshotElement::Text(text) => text.text(),
            _ => None,
        }
    }

    /// Field name. Only form fields carry it.
    pub fn name(&self) -> Option<&str> {
        match self {
            SnapshotElement::FormField(field) => field.name(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextObjectRef> {
        match self {
            SnapshotElement::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_form_field(&self) -> Option<&FormFieldRef> {
        match self {
            SnapshotElement::FormField(field) => Some(field),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<TextObjectRef> {
        match self {
            SnapshotElement::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_form_field(self) -> Option<FormFieldRef> {
        match self {
            SnapshotElement::FormField(field) => Some(field),
            _ => None,
        }
    }

    pub fn into_object_ref(self) -> ObjectRef {
        match self {
            SnapshotElement::Object(object_ref) => object_ref,
            SnapshotElement::Text(text) => text.object_ref,
            SnapshotElement::FormField(field) => field.object_ref,
        }
    }
}

impl AsRef<ObjectRef> for SnapshotElement {
    fn as_ref(&self) -> &ObjectRef {
        self.object_ref()
    }
}

/// A page reference and every element on that page, in server order
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub page_ref: PageRef,
    pub elements: Vec<SnapshotElement>,
}

impl PageSnapshot {
    pub fn page_index(&self) -> Option<usize> {
        self.page_ref.page_index()
    }

    pub fn elements_of_type(&self, object_type: ObjectType) -> impl Iterator<Item = &SnapshotElement> {
        self.elements
            .iter()
            .filter(move |element| element.object_type().satisfies(object_type))
    }
}

/// Whole-document snapshot. `pages` is index-aligned with page index.
///
/// Pages are shared with the page-level cache, so a page extracted from a
/// cached document is the same allocation as the one held here.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub page_count: usize,
    pub fonts: Vec<FontRecommendation>,
    pub pages: Vec<Arc<PageSnapshot>>,
}

impl DocumentSnapshot {
    pub fn page(&self, index: usize) -> Option<&Arc<PageSnapshot>> {
        self.pages.get(index)
    }

    /// Every element in document order: page order, then on-page order
    pub fn elements(&self) -> impl Iterator<Item = &SnapshotElement> {
        self.pages.iter().flat_map(|page| page.elements.iter())
    }
}
