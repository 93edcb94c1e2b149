use crate::algo::ForceOptions;
use crate::error::Result;
use crate::graph::{Graph, LayoutResult, Point, Viewport};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

#[derive(Debug, Default, Clone)]
struct ForceLayoutTimings {
    total: std::time::Duration,
    from_graph: std::time::Duration,
    seed: std::time::Duration,
    relax: std::time::Duration,
    output: std::time::Duration,
}

pub fn layout(graph: &Graph, viewport: Viewport, opts: &ForceOptions) -> Result<LayoutResult> {
    viewport.validate()?;
    graph.validate()?;

    if graph.nodes.is_empty() {
        return Ok(LayoutResult {
            positions: IndexMap::new(),
        });
    }

    let timing_enabled = std::env::var("CORAL_FORCE_TIMING").ok().as_deref() == Some("1");
    let mut timings = ForceLayoutTimings::default();
    let total_start = timing_enabled.then(std::time::Instant::now);

    let from_graph_start = timing_enabled.then(std::time::Instant::now);
    let mut sim = SimGraph::from_graph(graph);
    if let Some(s) = from_graph_start {
        timings.from_graph = s.elapsed();
    }

    let seed_start = timing_enabled.then(std::time::Instant::now);
    sim.seed_radial(viewport, opts);
    if let Some(s) = seed_start {
        timings.seed = s.elapsed();
    }

    let relax_start = timing_enabled.then(std::time::Instant::now);
    sim.relax(viewport, opts);
    if let Some(s) = relax_start {
        timings.relax = s.elapsed();
    }

    let output_start = timing_enabled.then(std::time::Instant::now);
    let node_count = sim.nodes.len();
    let edge_count = sim.edges.len();
    let mut positions: IndexMap<String, Point> = IndexMap::with_capacity(node_count);
    for n in sim.nodes {
        positions.insert(n.id, Point { x: n.x, y: n.y });
    }
    if let Some(s) = output_start {
        timings.output = s.elapsed();
    }

    if let Some(s) = total_start {
        timings.total = s.elapsed();
        eprintln!(
            "[coral-force-timing] total={:?} from_graph={:?} seed={:?} relax={:?} output={:?} nodes={} edges={} iterations={}",
            timings.total,
            timings.from_graph,
            timings.seed,
            timings.relax,
            timings.output,
            node_count,
            edge_count,
            opts.iterations,
        );
    }

    Ok(LayoutResult { positions })
}

#[derive(Debug, Clone)]
struct SimNode {
    id: String,
    relevance: f64,
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Copy)]
struct SimEdge {
    a: usize,
    b: usize,
}

#[derive(Debug)]
struct SimGraph {
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
}

impl SimGraph {
    /// Distances are clamped to this floor before dividing, so near-coincident pairs
    /// never divide by zero.
    const MIN_DISTANCE: f64 = 1.0;

    fn from_graph(graph: &Graph) -> Self {
        let mut nodes: Vec<SimNode> = Vec::with_capacity(graph.nodes.len());
        let mut id_to_idx: FxHashMap<&str, usize> = FxHashMap::default();
        id_to_idx.reserve(graph.nodes.len().saturating_mul(2));

        for (idx, n) in graph.nodes.iter().enumerate() {
            nodes.push(SimNode {
                id: n.id.clone(),
                relevance: n.relevance,
                x: 0.0,
                y: 0.0,
            });
            id_to_idx.insert(n.id.as_str(), idx);
        }

        let mut edges: Vec<SimEdge> = Vec::new();
        for e in &graph.edges {
            let Some(&a) = id_to_idx.get(e.source.as_str()) else {
                continue;
            };
            let Some(&b) = id_to_idx.get(e.target.as_str()) else {
                continue;
            };
            if a == b {
                continue;
            }
            edges.push(SimEdge { a, b });
        }

        Self { nodes, edges }
    }

    /// Place node `i` of `N` on a ring around the viewport center: evenly spread angles,
    /// radius grown by relevance plus an index-mod-3 stagger.
    fn seed_radial(&mut self, viewport: Viewport, opts: &ForceOptions) {
        let (cx, cy) = viewport.center();
        let n = self.nodes.len() as f64;
        for (i, node) in self.nodes.iter_mut().enumerate() {
            let angle = (i as f64 / n) * std::f64::consts::TAU;
            let radius = opts.base_radius
                + node.relevance * opts.relevance_spread
                + ((i % 3) as f64) * opts.jitter_step;
            node.x = cx + angle.cos() * radius;
            node.y = cy + angle.sin() * radius;
        }
    }

    /// One relaxation iteration is repulsion over all pairs, attraction along edges,
    /// then a gravity pull toward the viewport center. Positions update in place as
    /// pairs are visited; the fixed traversal order is what makes the result
    /// deterministic.
    fn relax(&mut self, viewport: Viewport, opts: &ForceOptions) {
        let (cx, cy) = viewport.center();
        for _ in 0..opts.iterations {
            for i in 0..self.nodes.len() {
                for j in (i + 1)..self.nodes.len() {
                    let mut dx = self.nodes[j].x - self.nodes[i].x;
                    let dy = self.nodes[j].y - self.nodes[i].y;
                    if dx == 0.0 && dy == 0.0 {
                        // Coincident pair: there is no line to push along, and scaling a
                        // zero delta would drop the push entirely. Separate on a fixed
                        // axis instead.
                        dx = Self::MIN_DISTANCE;
                    }
                    let d = (dx * dx + dy * dy).sqrt().max(Self::MIN_DISTANCE);
                    if d >= opts.repulsion_radius {
                        continue;
                    }
                    let push = (opts.repulsion_radius - d) * opts.repulsion_strength;
                    let fx = push * dx / d;
                    let fy = push * dy / d;
                    self.nodes[i].x -= fx;
                    self.nodes[i].y -= fy;
                    self.nodes[j].x += fx;
                    self.nodes[j].y += fy;
                }
            }

            for e in &self.edges {
                let dx = self.nodes[e.b].x - self.nodes[e.a].x;
                let dy = self.nodes[e.b].y - self.nodes[e.a].y;
                let d = (dx * dx + dy * dy).sqrt().max(Self::MIN_DISTANCE);
                if d <= opts.attract_distance {
                    continue;
                }
                let pull = (d - opts.attract_distance) * opts.attract_strength;
                let fx = pull * dx / d;
                let fy = pull * dy / d;
                self.nodes[e.a].x += fx;
                self.nodes[e.a].y += fy;
                self.nodes[e.b].x -= fx;
                self.nodes[e.b].y -= fy;
            }

            for node in &mut self.nodes {
                node.x += (cx - node.x) * opts.gravity;
                node.y += (cy - node.y) * opts.gravity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SimGraph, SimNode, layout};
    use crate::algo::ForceOptions;
    use crate::graph::{Edge, Graph, Node, Point, Viewport};

    const VIEW: Viewport = Viewport {
        width: 800.0,
        height: 500.0,
    };

    fn node(id: &str, relevance: f64) -> Node {
        Node {
            id: id.to_string(),
            relevance,
        }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
            kind: "informs".to_string(),
            weight: 1.0,
        }
    }

    fn sim_node(id: &str, x: f64, y: f64) -> SimNode {
        SimNode {
            id: id.to_string(),
            relevance: 0.5,
            x,
            y,
        }
    }

    fn dist(a: Point, b: Point) -> f64 {
        (a.x - b.x).hypot(a.y - b.y)
    }

    #[test]
    fn empty_graph_yields_an_empty_mapping() {
        let graph = Graph {
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        let result = layout(&graph, VIEW, &ForceOptions::default()).expect("layout");
        assert!(result.positions.is_empty());
    }

    #[test]
    fn every_node_gets_exactly_one_position_in_input_order() {
        let graph = Graph {
            nodes: vec![
                node("pricing", 0.9),
                node("onboarding", 0.6),
                node("churn", 0.8),
                node("goals", 0.4),
                node("integration", 0.5),
            ],
            edges: vec![
                edge("pricing", "churn"),
                edge("goals", "pricing"),
                edge("onboarding", "ghost"),
            ],
        };
        let result = layout(&graph, VIEW, &ForceOptions::default()).expect("layout");

        let ids: Vec<&str> = result.positions.keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, ["pricing", "onboarding", "churn", "goals", "integration"]);
        for p in result.positions.values() {
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn identical_inputs_produce_bitwise_identical_positions() {
        let graph = Graph {
            nodes: vec![node("a", 0.2), node("b", 0.7), node("c", 0.9), node("d", 0.1)],
            edges: vec![edge("a", "b"), edge("b", "c"), edge("c", "a")],
        };
        let first = layout(&graph, VIEW, &ForceOptions::default()).expect("layout");
        let second = layout(&graph, VIEW, &ForceOptions::default()).expect("layout");

        assert_eq!(first.positions.len(), second.positions.len());
        for (id, p) in &first.positions {
            let q = second.positions[id];
            assert_eq!(p.x.to_bits(), q.x.to_bits(), "x drifted for {id}");
            assert_eq!(p.y.to_bits(), q.y.to_bits(), "y drifted for {id}");
        }
    }

    #[test]
    fn dangling_edges_do_not_disturb_valid_nodes() {
        let nodes = vec![node("a", 0.3), node("b", 0.6)];
        let with_dangling = Graph {
            nodes: nodes.clone(),
            edges: vec![edge("a", "b"), edge("a", "ghost"), edge("ghost", "b")],
        };
        let without = Graph {
            nodes,
            edges: vec![edge("a", "b")],
        };

        let lhs = layout(&with_dangling, VIEW, &ForceOptions::default()).expect("layout");
        let rhs = layout(&without, VIEW, &ForceOptions::default()).expect("layout");
        for (id, p) in &lhs.positions {
            let q = rhs.positions[id];
            assert_eq!(p.x.to_bits(), q.x.to_bits(), "x drifted for {id}");
            assert_eq!(p.y.to_bits(), q.y.to_bits(), "y drifted for {id}");
        }
    }

    #[test]
    fn single_node_contracts_toward_center_without_reaching_it() {
        let opts = ForceOptions::default();
        let graph = Graph {
            nodes: vec![node("solo", 0.25)],
            edges: Vec::new(),
        };
        let result = layout(&graph, VIEW, &opts).expect("layout");
        let p = result.positions["solo"];
        let (cx, cy) = VIEW.center();

        // Seeded at angle 0, radius 120 + 0.25 * 80 = 140; gravity contracts the offset
        // by 1% per iteration and nothing else moves a lone node.
        let seeded = opts.base_radius + 0.25 * opts.relevance_spread;
        let expected = seeded * (1.0 - opts.gravity).powi(opts.iterations as i32);
        let d = (p.x - cx).hypot(p.y - cy);
        assert!(d < seeded, "no contraction: {d}");
        assert!(d > 0.0, "landed exactly on center");
        assert!((d - expected).abs() < 1e-9, "got {d}, expected {expected}");
        assert!((p.y - cy).abs() < 1e-12, "drifted off the seed axis");
    }

    #[test]
    fn coincident_nodes_separate_to_near_the_repulsion_radius() {
        let opts = ForceOptions::default();
        let (cx, cy) = VIEW.center();
        let mut sim = SimGraph {
            nodes: vec![sim_node("a", cx, cy), sim_node("b", cx, cy)],
            edges: Vec::new(),
        };
        sim.relax(VIEW, &opts);

        let dx = sim.nodes[1].x - sim.nodes[0].x;
        let dy = sim.nodes[1].y - sim.nodes[0].y;
        let d = dx.hypot(dy);
        // Repulsion growth balances the gravity pull a little below the radius.
        assert!(d > 0.75 * opts.repulsion_radius, "still overlapping: {d}");
        assert!(d < opts.repulsion_radius + 1.0, "overshot the radius: {d}");
    }

    #[test]
    fn connected_distant_nodes_end_closer_than_they_started() {
        let opts = ForceOptions::default();
        let graph = Graph {
            nodes: vec![node("a", 0.0), node("b", 0.0)],
            edges: vec![edge("a", "b")],
        };

        // Seeds land at angles 0 and pi, radii 120 and 150: 270 units apart, beyond the
        // attract distance and outside repulsion range.
        let seeded_distance =
            2.0 * opts.base_radius + opts.jitter_step;
        let result = layout(&graph, VIEW, &opts).expect("layout");
        let d = dist(result.positions["a"], result.positions["b"]);
        assert!(d < seeded_distance, "no net attraction: {d}");
        assert!(d > 0.0);
    }

    #[test]
    fn duplicate_node_ids_fail_before_simulation() {
        let graph = Graph {
            nodes: vec![node("a", 0.1), node("a", 0.9)],
            edges: Vec::new(),
        };
        assert!(layout(&graph, VIEW, &ForceOptions::default()).is_err());
    }

    #[test]
    fn degenerate_viewport_is_rejected() {
        let graph = Graph {
            nodes: vec![node("a", 0.5)],
            edges: Vec::new(),
        };
        let viewport = Viewport {
            width: 0.0,
            height: 500.0,
        };
        assert!(layout(&graph, viewport, &ForceOptions::default()).is_err());
    }

    #[test]
    fn self_loops_are_ignored() {
        let nodes = vec![node("a", 0.4), node("b", 0.4)];
        let with_loop = Graph {
            nodes: nodes.clone(),
            edges: vec![edge("a", "a")],
        };
        let without = Graph {
            nodes,
            edges: Vec::new(),
        };
        let lhs = layout(&with_loop, VIEW, &ForceOptions::default()).expect("layout");
        let rhs = layout(&without, VIEW, &ForceOptions::default()).expect("layout");
        for (id, p) in &lhs.positions {
            let q = rhs.positions[id];
            assert_eq!(p.x.to_bits(), q.x.to_bits());
            assert_eq!(p.y.to_bits(), q.y.to_bits());
        }
    }
}
