//! Query surface over a DOM/CSSOM snapshot.
//!
//! Resolution never touches a live document directly; everything it needs comes through these
//! traits, so a test double or a recorded snapshot can stand in for a browser.

use crate::geom::{ClientBox, ClientRect, Insets, OffsetBox, Point, Sides, Vector, ViewBox, Viewport};
use serde::{Deserialize, Serialize};
use svgtypes::AspectRatio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Any HTML element, including `<html>` and `<body>`.
    #[default]
    Html,
    /// An `<svg>` element.
    Svg,
    /// A `<g>` element.
    SvgGroup,
    /// Any other SVG graphics element (`<rect>`, `<path>`, `<text>`, ...).
    SvgGraphics,
}

impl NodeKind {
    pub fn is_svg(self) -> bool {
        !matches!(self, NodeKind::Html)
    }

    /// SVG content inside an `<svg>`, which has no layout box of its own.
    pub fn is_svg_content(self) -> bool {
        matches!(self, NodeKind::SvgGroup | NodeKind::SvgGraphics)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

/// The computed-style fields resolution reads for a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedGeometry {
    pub position: Position,
    /// Computed `transform` text (`none`, `matrix(...)`, `matrix3d(...)`).
    pub transform: String,
    /// Resolved `transform-origin` in CSS pixels. Relative to the border box for HTML and
    /// `<svg>`; in the owner's user space for SVG content (`transform-box: view-box`).
    pub transform_origin: Point,
    pub border: Sides,
    pub margin: Sides,
    pub inset: Insets,
}

impl Default for ComputedGeometry {
    fn default() -> Self {
        Self {
            position: Position::Static,
            transform: "none".to_string(),
            transform_origin: Point::zero(),
            border: Sides::default(),
            margin: Sides::default(),
            inset: Insets::default(),
        }
    }
}

impl ComputedGeometry {
    pub fn has_transform(&self) -> bool {
        let t = self.transform.trim();
        !t.is_empty() && t != "none"
    }

    pub fn is_fixed(&self) -> bool {
        self.position == Position::Fixed
    }
}

pub trait NodeTree {
    type Node: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    fn body(&self) -> Self::Node;

    fn document_element(&self) -> Self::Node;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn kind(&self, node: Self::Node) -> NodeKind;

    /// Nearest `<svg>` ancestor.
    fn owner_svg(&self, node: Self::Node) -> Option<Self::Node> {
        let mut cur = self.parent(node);
        while let Some(n) = cur {
            if self.kind(n) == NodeKind::Svg {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }
}

pub trait StyleProvider: NodeTree {
    fn computed_geometry(&self, node: Self::Node) -> ComputedGeometry;
}

pub trait GeometryProvider: NodeTree {
    /// Border box relative to the viewport (`getBoundingClientRect`).
    fn bounding_rect(&self, node: Self::Node) -> ClientRect;

    /// `None` for nodes without offset properties (all SVG elements).
    fn offset_box(&self, node: Self::Node) -> Option<OffsetBox>;

    fn client_box(&self, node: Self::Node) -> ClientBox;

    fn scroll_offset(&self, node: Self::Node) -> Vector;

    fn viewport(&self) -> Viewport;

    /// `viewBox` base value of an `<svg>`; `None` when the attribute is absent.
    fn svg_view_box(&self, node: Self::Node) -> Option<ViewBox>;

    fn preserve_aspect_ratio(&self, node: Self::Node) -> AspectRatio;

    /// `getBBox()` of SVG content, in the owner `<svg>`'s user space.
    fn local_bbox(&self, node: Self::Node) -> Option<ClientRect>;
}

/// Everything resolution needs from a document.
pub trait Document: StyleProvider + GeometryProvider {}

impl<T: StyleProvider + GeometryProvider + ?Sized> Document for T {}
