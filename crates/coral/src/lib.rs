#![forbid(unsafe_code)]

//! Headless force-directed layout for memory graphs.
//!
//! `coral` positions memory/knowledge nodes for a rendering surface: callers hand in a
//! node/edge set and a logical viewport, and get back one `(x, y)` position per node.
//! The engine is pure and runtime-agnostic; drawing, animation, and data fetching live
//! in the consumer.

pub mod algo;
pub mod error;
pub mod graph;

pub use algo::ForceOptions;
pub use error::{Error, Result};
pub use graph::{Edge, Graph, LayoutResult, Node, Point, Viewport};

/// Headless layout entry point.
///
/// Recomputes every position from scratch; call it when the node/edge set changes, not
/// per rendered frame, and cache the result.
pub fn layout(graph: &Graph, viewport: Viewport, opts: &ForceOptions) -> Result<LayoutResult> {
    algo::force::layout(graph, viewport, opts)
}
