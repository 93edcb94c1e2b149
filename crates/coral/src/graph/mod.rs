use crate::error::{Error, Result};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Rejects duplicate node ids.
    ///
    /// Edges referencing missing nodes are tolerated (they are skipped during layout),
    /// but a repeated id would silently collapse two nodes onto one output entry.
    pub fn validate(&self) -> Result<()> {
        let mut node_exists: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for n in &self.nodes {
            if !node_exists.insert(n.id.as_str()) {
                return Err(Error::DuplicateNode {
                    node_id: n.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    /// Visual importance in `[0, 1]`; scales the seeded radius and the rendered size.
    /// Out-of-range values are not rejected, they just produce unusual radii.
    pub relevance: f64,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Relationship label (e.g. `informs`, `requires`). Carried for consumers.
    pub kind: String,
    /// Relationship weight. Carried for consumers; the attraction force does not scale
    /// with it.
    pub weight: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Logical drawing area. All positions are computed relative to its center.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
        {
            return Err(Error::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Final positions, keyed by node id in input-node order.
///
/// Iteration order doubles as render z-order: later nodes draw on top.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub positions: IndexMap<String, Point>,
}

impl LayoutResult {
    /// Nearest node within `radius` of `(x, y)`, if any.
    ///
    /// Exact distance ties resolve to the earlier entry, so pointer behavior is
    /// deterministic.
    pub fn hit_test(&self, x: f64, y: f64, radius: f64) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (id, p) in &self.positions {
            let d = (p.x - x).hypot(p.y - y);
            if d > radius {
                continue;
            }
            match best {
                Some((_, best_d)) if best_d <= d => {}
                _ => best = Some((id.as_str(), d)),
            }
        }
        best.map(|(id, _)| id)
    }
}
