//! Walks from a target up through its offset ancestors, collecting one transform entry and one
//! offset entry per frame.

use crate::error::Result;
use crate::geom::{Point, Vector, vector};
use crate::matrix::{Dimension, Matrix};
use crate::offset::{body_offset, offset_info};
use crate::options::{ResolveOptions, SvgOffsetMode};
use crate::parse::TransformParser;
use crate::provider::{ComputedGeometry, Document, NodeKind};
use crate::svg::{graphics_offset, view_box_matrix};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatrixEntry<N> {
    /// The node's own transform, already applied around its transform-origin.
    Target { node: N, matrix: Matrix },
    /// Translation of the node inside its offset ancestor.
    Offset { node: N, matrix: Matrix },
    /// Offset of a node without offset properties; resolved during composition.
    SvgPendingOffset { node: N, origin: Point },
}

impl<N: Copy> MatrixEntry<N> {
    pub fn node(&self) -> N {
        match self {
            MatrixEntry::Target { node, .. }
            | MatrixEntry::Offset { node, .. }
            | MatrixEntry::SvgPendingOffset { node, .. } => *node,
        }
    }

    pub fn matrix(&self) -> Option<&Matrix> {
        match self {
            MatrixEntry::Target { matrix, .. } | MatrixEntry::Offset { matrix, .. } => Some(matrix),
            MatrixEntry::SvgPendingOffset { .. } => None,
        }
    }

    fn embed(&mut self, dim: Dimension) {
        match self {
            MatrixEntry::Target { matrix, .. } | MatrixEntry::Offset { matrix, .. } => {
                *matrix = matrix.embed(dim);
            }
            MatrixEntry::SvgPendingOffset { .. } => {}
        }
    }
}

/// Where a walk stops relative to its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    /// Stop before the container: it is the reference frame.
    BeforeContainer,
    /// Include the frame at which the container is reached.
    AtContainer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainWalk<N> {
    /// Entries in root-to-target order.
    pub entries: Vec<MatrixEntry<N>>,
    /// Offset ancestor of the container (the body when there is none).
    pub offset_container: N,
    /// The first walked node's transform, not yet applied around its origin.
    pub target_matrix: Option<Matrix>,
    pub transform_origin: Point,
    pub target_origin: Point,
    pub dimension: Dimension,
}

impl<N: Copy> ChainWalk<N> {
    pub fn is_3d(&self) -> bool {
        self.dimension.is_3d()
    }

    /// Re-embeds every entry (and the target matrix) once the run is known to be `dim`.
    pub fn promote(&mut self, dim: Dimension) {
        if self.dimension == dim || !dim.is_3d() {
            return;
        }
        self.dimension = dim;
        for entry in &mut self.entries {
            entry.embed(dim);
        }
        if let Some(m) = self.target_matrix.as_mut() {
            *m = m.embed(dim);
        }
    }
}

struct NodeOffset {
    /// `None` when the offset has to be solved from the rendered rect.
    offset: Option<Vector>,
    origin: Point,
    target_origin: Point,
}

fn node_offset<D: Document>(
    doc: &D,
    el: D::Node,
    container: Option<D::Node>,
    style: &ComputedGeometry,
    options: &ResolveOptions,
) -> NodeOffset {
    let origin = style.transform_origin;
    let kind = doc.kind(el);

    if let Some(offset) = doc.offset_box(el) {
        let mut offset = vector(offset.left, offset.top);
        if style.is_fixed() {
            let frame = container.unwrap_or_else(|| doc.document_element());
            let rect = doc.bounding_rect(frame);
            offset -= vector(rect.left, rect.top);
        }
        return NodeOffset {
            offset: Some(offset),
            origin,
            target_origin: origin,
        };
    }

    if !kind.is_svg() {
        // Detached or display-less HTML: nothing to offset by.
        return NodeOffset {
            offset: Some(Vector::zero()),
            origin,
            target_origin: origin,
        };
    }

    // SVG content reports its origin in user space; both modes re-base it onto the bbox.
    if kind.is_svg_content() {
        let (offset, origin) = graphics_offset(doc, el, origin);
        return NodeOffset {
            offset: (options.svg_offset == SvgOffsetMode::LocalBbox).then_some(offset),
            origin,
            target_origin: style.transform_origin,
        };
    }

    NodeOffset {
        offset: None,
        origin,
        target_origin: origin,
    }
}

/// Collects the transform chain of `target` up to `container`.
///
/// Each visited frame contributes a [`MatrixEntry::Target`] and an offset entry; an `<svg>`
/// above the target also contributes its viewBox mapping. The run starts 2D and is promoted
/// to 3D, re-embedding what was already collected, the first time a 3D transform shows up.
pub fn walk<D, P>(
    doc: &D,
    parser: &P,
    target: D::Node,
    container: Option<D::Node>,
    end: ChainEnd,
    options: &ResolveOptions,
) -> Result<ChainWalk<D::Node>>
where
    D: Document,
    P: TransformParser + ?Sized,
{
    let body = doc.body();
    let check_container = end == ChainEnd::AtContainer;
    let offset_container = offset_info(doc, container, container, true).offset_parent;

    let mut chain = ChainWalk {
        entries: Vec::new(),
        offset_container,
        target_matrix: None,
        transform_origin: Point::zero(),
        target_origin: Point::zero(),
        dimension: Dimension::Planar,
    };
    let mut first = true;

    let mut el = Some(target);
    let mut request_end = !check_container && Some(target) == container;
    let mut is_end = request_end;

    while let Some(node) = el {
        if is_end {
            break;
        }
        is_end = request_end;

        let style = doc.computed_geometry(node);
        let mut matrix = parser.parse_transform(&style.transform)?;
        if matrix.is_3d() && !chain.is_3d() {
            tracing::debug!(node = ?node, "3d transform found, promoting chain");
            chain.promote(Dimension::Spatial);
        }
        matrix = matrix.embed(chain.dimension);
        let n = chain.dimension;

        let kind = doc.kind(node);
        let NodeOffset {
            mut offset,
            origin,
            target_origin,
        } = node_offset(doc, node, container, &style, options);

        if kind == NodeKind::Svg && !first {
            chain.entries.push(MatrixEntry::Target {
                node,
                matrix: view_box_matrix(doc, node, n),
            });
            chain.entries.push(MatrixEntry::Offset {
                node,
                matrix: Matrix::identity(n),
            });
        } else if kind == NodeKind::SvgGroup && node != target {
            offset = Some(Vector::zero());
        }

        let info = offset_info(doc, Some(node), container, false);

        chain.entries.push(MatrixEntry::Target {
            node,
            matrix: matrix.about_origin(origin),
        });
        match offset {
            Some(mut offset) => {
                if offset_container != info.offset_parent {
                    let client = doc.client_box(info.offset_parent);
                    offset += vector(client.left, client.top);
                }
                if info.offset_parent == body {
                    offset += body_offset(doc, &style, false);
                }
                offset -= doc.scroll_offset(node);
                chain.entries.push(MatrixEntry::Offset {
                    node,
                    matrix: Matrix::translation(n, offset),
                });
            }
            None => chain
                .entries
                .push(MatrixEntry::SvgPendingOffset { node, origin }),
        }
        tracing::trace!(node = ?node, parent = ?info.offset_parent, "chain frame");

        if first {
            chain.target_matrix = Some(matrix);
            chain.transform_origin = origin;
            chain.target_origin = target_origin;
            first = false;
        }

        if is_end || style.is_fixed() {
            break;
        }
        el = Some(info.offset_parent);
        request_end = info.is_end;
        if !check_container || el == Some(body) {
            is_end = request_end;
        }
    }

    chain.entries.reverse();
    tracing::debug!(
        target = ?target,
        entries = chain.entries.len(),
        is_3d = chain.is_3d(),
        "transform chain collected"
    );
    Ok(chain)
}
