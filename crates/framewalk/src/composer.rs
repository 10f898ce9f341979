//! Folds collected chains into the named composed matrices.
//!
//! ```text
//! root   = (... -> container)
//! before = root · (... -> offset parent frame)
//! offset = before · target offset
//! all    = offset · target transform
//! ```
//!
//! `before`, `offset` and `all` are nested prefixes of one root-to-target product.

use crate::error::Result;
use crate::geom::{Point, Vector};
use crate::matrix::{Dimension, Matrix};
use crate::offset::offset_info;
use crate::options::ResolveOptions;
use crate::parse::TransformParser;
use crate::provider::Document;
use crate::solver::SvgOffsetSolver;
use crate::walker::{ChainEnd, MatrixEntry, walk};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedResult {
    /// Container frame relative to the root container, without translation.
    pub root_matrix: Matrix,
    pub before_matrix: Matrix,
    pub offset_matrix: Matrix,
    pub all_matrix: Matrix,
    /// The target's own transform, not applied around its origin.
    pub target_matrix: Matrix,
    /// `target_matrix` as CSS text.
    pub target_transform: String,
    pub transform_origin: Point,
    pub target_origin: Point,
    pub is_3d: bool,
}

impl ComposedResult {
    /// Result for a target that cannot be measured yet.
    pub fn identity(dim: Dimension) -> Self {
        let id = Matrix::identity(dim);
        Self {
            root_matrix: id,
            before_matrix: id,
            offset_matrix: id,
            all_matrix: id,
            target_matrix: id,
            target_transform: String::new(),
            transform_origin: Point::zero(),
            target_origin: Point::zero(),
            is_3d: dim.is_3d(),
        }
    }

    pub fn dimension(&self) -> Dimension {
        if self.is_3d {
            Dimension::Spatial
        } else {
            Dimension::Planar
        }
    }

    /// Converts a pointer delta from the root frame into the container frame.
    pub fn drag_distance(&self, dist: Vector) -> Vector {
        self.root_matrix
            .inverse()
            .map(|inv| inv.transform_point(dist.to_point()).to_vector())
            .unwrap_or(dist)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainProduct {
    pub all: Matrix,
    /// Product without the last two entries.
    pub before: Matrix,
    /// Product without the last entry.
    pub offset: Matrix,
}

/// Multiplies `entries` (root-to-target) left to right.
///
/// Pending SVG offsets are solved on the way, against `prefix · product so far`, and replaced
/// by resolved [`MatrixEntry::Offset`] entries.
pub fn compose_chain<D: Document>(
    doc: &D,
    entries: &mut [MatrixEntry<D::Node>],
    dim: Dimension,
    prefix: &Matrix,
    reference: D::Node,
    solver: &SvgOffsetSolver,
) -> ChainProduct {
    let len = entries.len();
    let mut all = Matrix::identity(dim);
    let mut before = all;
    let mut offset = all;

    for i in 0..len {
        if len >= 2 && i == len - 2 {
            before = all;
        }
        if i == len - 1 {
            offset = all;
        }

        if let MatrixEntry::SvgPendingOffset { node, origin } = entries[i] {
            let own = entries
                .get(i + 1)
                .and_then(|e| e.matrix())
                .copied()
                .unwrap_or_else(|| Matrix::identity(dim));
            let solved =
                solver.solve_node(doc, node, origin, &own, reference, &prefix.multiply(&all));
            entries[i] = MatrixEntry::Offset {
                node,
                matrix: Matrix::translation(dim, solved.offset),
            };
        }

        if let Some(m) = entries[i].matrix() {
            all = all.multiply(m);
        }
    }

    ChainProduct {
        all,
        before,
        offset,
    }
}

/// Both resolved chains alongside the composed result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixStack<N> {
    pub entries: Vec<MatrixEntry<N>>,
    pub root_entries: Vec<MatrixEntry<N>>,
    pub result: ComposedResult,
}

/// Walks and folds `target`'s chain up to `container`, and the container's chain up to
/// `root_container` for the root matrix.
pub fn compose_stack<D, P>(
    doc: &D,
    parser: &P,
    target: D::Node,
    container: Option<D::Node>,
    root_container: Option<D::Node>,
    options: &ResolveOptions,
) -> Result<MatrixStack<D::Node>>
where
    D: Document,
    P: TransformParser + ?Sized,
{
    let mut chain = walk(
        doc,
        parser,
        target,
        container,
        ChainEnd::BeforeContainer,
        options,
    )?;
    let mut root_chain = walk(
        doc,
        parser,
        chain.offset_container,
        root_container,
        ChainEnd::AtContainer,
        options,
    )?;

    let target_is_3d = chain.is_3d();
    let dim = if options.force_3d {
        Dimension::Spatial
    } else {
        chain.dimension.max(root_chain.dimension)
    };
    chain.promote(dim);
    root_chain.promote(dim);

    let root_frame = root_container.unwrap_or_else(|| doc.body());
    let end_container = offset_info(doc, Some(root_frame), Some(root_frame), true).offset_parent;
    let solver = SvgOffsetSolver::new(options.solver);

    let root = compose_chain(
        doc,
        &mut root_chain.entries,
        dim,
        &Matrix::identity(dim),
        end_container,
        &solver,
    )
    .all;
    let product = compose_chain(doc, &mut chain.entries, dim, &root, end_container, &solver);

    let is_svg_content = doc.kind(target).is_svg_content();
    let target_matrix = chain
        .target_matrix
        .unwrap_or_else(|| Matrix::identity(dim));
    let target_transform = target_matrix.to_css(!is_svg_content && target_is_3d);

    tracing::debug!(
        target = ?target,
        entries = chain.entries.len(),
        root_entries = root_chain.entries.len(),
        is_3d = dim.is_3d(),
        "matrix stack composed"
    );

    Ok(MatrixStack {
        entries: chain.entries,
        root_entries: root_chain.entries,
        result: ComposedResult {
            root_matrix: root.without_translation(),
            before_matrix: product.before,
            offset_matrix: product.offset,
            all_matrix: product.all,
            target_matrix,
            target_transform,
            transform_origin: chain.transform_origin,
            target_origin: chain.target_origin,
            is_3d: dim.is_3d(),
        },
    })
}

pub fn compose<D, P>(
    doc: &D,
    parser: &P,
    target: D::Node,
    container: Option<D::Node>,
    root_container: Option<D::Node>,
    options: &ResolveOptions,
) -> Result<ComposedResult>
where
    D: Document,
    P: TransformParser + ?Sized,
{
    compose_stack(doc, parser, target, container, root_container, options).map(|s| s.result)
}
