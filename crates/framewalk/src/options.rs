use serde::{Deserialize, Serialize};

/// How the local translation of SVG content (no offset properties) is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvgOffsetMode {
    /// Fit the translation to the rendered bounding rect (see [`crate::solver`]).
    #[default]
    Solve,
    /// Take `getBBox()` minus the owner viewBox origin. Cheaper, but ignores how ancestors
    /// actually placed the node.
    LocalBbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub max_iterations: usize,
    /// Accepted left/top residual, in CSS pixels.
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tolerance: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Report 4×4 matrices even when every participating transform is 2D.
    pub force_3d: bool,
    pub svg_offset: SvgOffsetMode,
    pub solver: SolverOptions,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_force_3d(mut self, force_3d: bool) -> Self {
        self.force_3d = force_3d;
        self
    }

    pub fn with_svg_offset(mut self, mode: SvgOffsetMode) -> Self {
        self.svg_offset = mode;
        self
    }

    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }
}
