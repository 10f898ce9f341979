//! Recovers the local translation of nodes that only expose a rendered bounding rect.
//!
//! The unknown is the translation `t` such that `before · T(t) · own` places the node's local
//! box where the document says it is. The rendered rect is the axis-aligned hull of the mapped
//! box, so `t` is found by fixed-point iteration on the hull's top-left corner.

use crate::geom::{ClientRect, Point, Size, Vector, point, vector};
use crate::matrix::Matrix;
use crate::offset::{body_offset, element_size};
use crate::options::SolverOptions;
use crate::projector::corner_points;
use crate::provider::Document;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolvedOffset {
    /// Translation in the node's parent space, rounded to whole units.
    pub offset: Vector,
    pub iterations: usize,
    pub converged: bool,
}

/// Rendered rect of `node` in the coordinate space of `container`'s padding box.
pub fn rendered_rect<D: Document>(doc: &D, node: D::Node, container: D::Node) -> ClientRect {
    let container_rect = doc.bounding_rect(container);
    let scroll = doc.scroll_offset(container);
    let client = doc.client_box(container);
    let margin = if container == doc.body() {
        body_offset(doc, &doc.computed_geometry(node), true)
    } else {
        Vector::zero()
    };
    let rect = doc.bounding_rect(node);
    ClientRect::new(
        rect.left - container_rect.left + scroll.x - client.left + margin.x,
        rect.top - container_rect.top + scroll.y - client.top + margin.y,
        rect.width,
        rect.height,
    )
}

fn hull(matrix: &Matrix, size: Size) -> ClientRect {
    ClientRect::from_points(&corner_points(matrix, size.width, size.height))
}

fn ratio(actual: f64, trial: f64) -> f64 {
    let r = actual / trial;
    if r.is_finite() { r } else { 1.0 }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SvgOffsetSolver {
    pub options: SolverOptions,
}

impl SvgOffsetSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// Solves for the translation between `before` and `own` that reproduces `actual`.
    ///
    /// `size` is the node's local box and `origin` its transform-origin in local units. When
    /// `before` is singular there is nothing to map back through and a zero offset is
    /// returned unconverged.
    pub fn solve(
        &self,
        actual: ClientRect,
        size: Size,
        origin: Point,
        before: &Matrix,
        own: &Matrix,
    ) -> SolvedOffset {
        let Some(inverse) = before.inverse() else {
            return SolvedOffset {
                offset: Vector::zero(),
                iterations: 0,
                converged: false,
            };
        };
        let dim = before.dimension().max(own.dimension());

        let trial = before.multiply(own);
        let trial_rect = hull(&trial, size);
        let trial_origin = trial.transform_point(origin);
        let relative = trial_origin - point(trial_rect.left, trial_rect.top);
        let mut rendered_origin = point(
            actual.left + relative.x * ratio(actual.width, trial_rect.width),
            actual.top + relative.y * ratio(actual.height, trial_rect.height),
        );
        let local_trial_origin = inverse.transform_point(trial_origin);

        let mut offset = Vector::zero();
        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.options.max_iterations {
            iterations += 1;
            offset = inverse.transform_point(rendered_origin) - local_trial_origin;

            let placed = before
                .multiply(&Matrix::translation(dim, offset))
                .multiply(own);
            let rect = hull(&placed, size);
            let dist = vector(rect.left - actual.left, rect.top - actual.top);
            if dist.x.abs() < self.options.tolerance && dist.y.abs() < self.options.tolerance {
                converged = true;
                break;
            }
            rendered_origin -= dist;
        }

        SolvedOffset {
            offset: vector(offset.x.round(), offset.y.round()),
            iterations,
            converged,
        }
    }

    /// Measures `node` in the document and solves its offset against `container`.
    pub fn solve_node<D: Document>(
        &self,
        doc: &D,
        node: D::Node,
        origin: Point,
        own: &Matrix,
        container: D::Node,
        before: &Matrix,
    ) -> SolvedOffset {
        let actual = rendered_rect(doc, node, container);
        let size = element_size(doc, node);
        let solved = self.solve(actual, size, origin, before, own);
        if !solved.converged {
            tracing::debug!(
                node = ?node,
                iterations = solved.iterations,
                offset_x = solved.offset.x,
                offset_y = solved.offset.y,
                "svg offset did not converge, using best estimate"
            );
        }
        solved
    }
}
