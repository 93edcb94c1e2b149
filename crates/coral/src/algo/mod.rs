pub mod force;

/// Tunables for the force-directed relaxation.
///
/// The defaults reproduce the visual density the memory view was tuned for. They are
/// configuration, not physically derived constants; change them freely per surface.
#[derive(Debug, Clone)]
pub struct ForceOptions {
    /// Fixed relaxation budget. There is no convergence check; the loop always runs the
    /// full budget, which is also the termination guarantee.
    pub iterations: usize,
    /// Minimum seeded distance from the viewport center.
    pub base_radius: f64,
    /// Additional seeded radius per unit of node relevance.
    pub relevance_spread: f64,
    /// Radius stagger keyed on seed index modulo 3, so same-relevance neighbors do not
    /// all start on one ring.
    pub jitter_step: f64,
    /// Node pairs closer than this are pushed apart.
    pub repulsion_radius: f64,
    pub repulsion_strength: f64,
    /// Connected pairs farther apart than this are pulled together.
    pub attract_distance: f64,
    pub attract_strength: f64,
    /// Fraction of each node's offset to the viewport center removed per iteration.
    /// Bounds drift without hard-clamping positions to the viewport.
    pub gravity: f64,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            iterations: 50,
            base_radius: 120.0,
            relevance_spread: 80.0,
            jitter_step: 30.0,
            repulsion_radius: 80.0,
            repulsion_strength: 0.3,
            attract_distance: 100.0,
            attract_strength: 0.02,
            gravity: 0.01,
        }
    }
}
