//! Domain model shared by every layer of the client.
//!
//! This module contains:
//! - Geometry (positions, bounding rectangles)
//! - References to server-side objects (plain, text, form field, page)
//! - Immutable document and page snapshots
//! - Outbound objects and request payloads

pub mod geometry;
pub mod objects;
pub mod refs;
pub mod requests;
pub mod snapshot;

pub use geometry::{BoundingRect, Point, Position, PositionMode, ShapeType};
pub use objects::{Font, Image, Paragraph, Path, PathSegment, PdfObject, SegmentGeometry, StandardFont};
pub use refs::{
    Color, FontRecommendation, FontType, FormFieldRef, ObjectRef, ObjectType, Orientation,
    PageRef, PageSize, TextObjectRef, TextStatus,
};
pub use requests::{AddPageRequest, CommandResult, NewDocumentOptions, ParagraphEdit};
pub use snapshot::{DocumentSnapshot, PageSnapshot, SnapshotElement};
