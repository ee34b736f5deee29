//! Query resolution over cached snapshots.
//!
//! This module contains:
//! - Filtering of snapshot elements by type, text, area and name
//! - Planning of where a query is answered, and the resolver itself

mod filter;
mod resolver;

pub use filter::{DEFAULT_TOLERANCE, ElementFilter, rects_intersect};
pub use resolver::{Resolution, plan, resolve};
