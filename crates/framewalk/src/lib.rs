#![forbid(unsafe_code)]

//! Composed transform resolution for elements nested in mixed HTML/SVG trees.
//!
//! Given a target element and a reference container, `framewalk` walks the offset ancestors
//! between them, collects each frame's transform and offset, folds them into a handful of
//! named matrices and projects the target's box through the result. The document is reached
//! only through the [`provider`] traits; [`snapshot::SnapshotDocument`] is an in-memory
//! implementation suitable for recorded pages and tests.

pub mod composer;
pub mod error;
pub mod geom;
pub mod matrix;
pub mod offset;
pub mod options;
pub mod parse;
pub mod projector;
pub mod provider;
pub mod resolve;
pub mod snapshot;
pub mod solver;
pub mod svg;
pub mod walker;

pub use composer::{ComposedResult, MatrixStack};
pub use error::{Error, Result};
pub use geom::{ClientBox, ClientRect, Insets, OffsetBox, Point, Sides, Size, Vector, ViewBox, Viewport};
pub use matrix::{Dimension, Matrix};
pub use options::{ResolveOptions, SolverOptions, SvgOffsetMode};
pub use parse::{ComputedTransformParser, TransformParser};
pub use projector::{Direction, ProjectedBox, absolute_rotation_deg, inverse_position};
pub use provider::{
    ComputedGeometry, Document, GeometryProvider, NodeKind, NodeTree, Position, StyleProvider,
};
pub use resolve::{ElementInfo, MeasuredRect, Resolver, TargetInfo};
pub use snapshot::{NodeId, SnapshotDocument};
pub use walker::MatrixEntry;

/// Resolves `target` against `container` with the default parser and options.
pub fn element_info<D: Document>(
    doc: &D,
    target: Option<D::Node>,
    container: Option<D::Node>,
) -> Result<ElementInfo> {
    Resolver::new(doc).element_info(target, container, None)
}
