//! In-memory DOM/CSSOM snapshot implementing the provider traits.
//!
//! Snapshots are either loaded from JSON (as recorded from a live page) or built in code:
//!
//! ```
//! use framewalk::snapshot::SnapshotDocument;
//! use framewalk::{NodeKind, Viewport};
//!
//! let mut doc = SnapshotDocument::new(Viewport { width: 800.0, height: 600.0, ..Default::default() });
//! let body = doc.body_id();
//! let card = doc.append(body, "card", NodeKind::Html).unwrap();
//! doc.node_mut(card).style.transform = "rotate(30)".to_string();
//! assert_eq!(doc.lookup("card"), Some(card));
//! ```

use crate::error::{Error, Result};
use crate::geom::{ClientBox, ClientRect, OffsetBox, Vector, ViewBox, Viewport};
use crate::provider::{ComputedGeometry, GeometryProvider, NodeKind, NodeTree, StyleProvider};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use svgtypes::AspectRatio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Serialized form of a document snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default = "default_body")]
    pub body: String,
    #[serde(default = "default_document_element")]
    pub document_element: String,
    pub nodes: Vec<SnapshotNode>,
}

fn default_body() -> String {
    "body".to_string()
}

fn default_document_element() -> String {
    "html".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotNode {
    pub id: String,
    pub parent: Option<String>,
    pub kind: NodeKind,
    pub style: ComputedGeometry,
    /// Absent for SVG elements, which have no offset properties.
    pub offset: Option<OffsetBox>,
    pub rect: ClientRect,
    pub client: ClientBox,
    pub scroll: Vector,
    pub view_box: Option<ViewBox>,
    pub preserve_aspect_ratio: Option<String>,
    pub bbox: Option<ClientRect>,
}

/// A node as stored in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: String,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub style: ComputedGeometry,
    pub offset: Option<OffsetBox>,
    pub rect: ClientRect,
    pub client: ClientBox,
    pub scroll: Vector,
    pub view_box: Option<ViewBox>,
    pub preserve_aspect_ratio: AspectRatio,
    pub bbox: Option<ClientRect>,
}

impl NodeRecord {
    fn new(id: &str, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            parent,
            kind,
            style: ComputedGeometry::default(),
            // SVG elements have no offset properties.
            offset: (!kind.is_svg()).then(OffsetBox::default),
            rect: ClientRect::default(),
            client: ClientBox::default(),
            scroll: Vector::zero(),
            view_box: None,
            preserve_aspect_ratio: AspectRatio::default(),
            bbox: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotDocument {
    nodes: Vec<NodeRecord>,
    ids: FxHashMap<String, NodeId>,
    viewport: Viewport,
    body: NodeId,
    document_element: NodeId,
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidSnapshot {
        message: message.into(),
    }
}

impl SnapshotDocument {
    /// An empty document: an `html` element with a `body` child.
    pub fn new(viewport: Viewport) -> Self {
        let html = NodeRecord::new("html", None, NodeKind::Html);
        let body = NodeRecord::new("body", Some(NodeId(0)), NodeKind::Html);
        let mut ids = FxHashMap::default();
        ids.insert(html.id.clone(), NodeId(0));
        ids.insert(body.id.clone(), NodeId(1));
        Self {
            nodes: vec![html, body],
            ids,
            viewport,
            body: NodeId(1),
            document_element: NodeId(0),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mut ids = FxHashMap::default();
        for (i, node) in snapshot.nodes.iter().enumerate() {
            if node.id.is_empty() {
                return Err(invalid(format!("node #{i} has no id")));
            }
            let index = u32::try_from(i).map_err(|_| invalid("too many nodes"))?;
            if ids.insert(node.id.clone(), NodeId(index)).is_some() {
                return Err(invalid(format!("duplicate node id `{}`", node.id)));
            }
        }

        let mut nodes = Vec::with_capacity(snapshot.nodes.len());
        for node in snapshot.nodes {
            let parent = match &node.parent {
                Some(p) => Some(*ids.get(p).ok_or_else(|| {
                    invalid(format!("node `{}` has unknown parent `{p}`", node.id))
                })?),
                None => None,
            };
            let preserve_aspect_ratio = match &node.preserve_aspect_ratio {
                Some(text) => AspectRatio::from_str(text).map_err(|_| Error::AspectRatioParse {
                    value: text.clone(),
                })?,
                None => AspectRatio::default(),
            };
            nodes.push(NodeRecord {
                id: node.id,
                parent,
                kind: node.kind,
                style: node.style,
                offset: node.offset,
                rect: node.rect,
                client: node.client,
                scroll: node.scroll,
                view_box: node.view_box,
                preserve_aspect_ratio,
                bbox: node.bbox,
            });
        }

        let body = *ids
            .get(&snapshot.body)
            .ok_or_else(|| invalid(format!("body `{}` is not a node", snapshot.body)))?;
        let document_element = *ids.get(&snapshot.document_element).ok_or_else(|| {
            invalid(format!(
                "document element `{}` is not a node",
                snapshot.document_element
            ))
        })?;

        let doc = Self {
            nodes,
            ids,
            viewport: snapshot.viewport,
            body,
            document_element,
        };
        doc.check_acyclic()?;
        tracing::debug!(nodes = doc.nodes.len(), "snapshot loaded");
        Ok(doc)
    }

    fn check_acyclic(&self) -> Result<()> {
        for (i, start) in self.nodes.iter().enumerate() {
            let mut cur = start.parent;
            let mut steps = 0;
            while let Some(p) = cur {
                steps += 1;
                if steps > self.nodes.len() || p.index() == i {
                    return Err(invalid(format!("parent cycle through `{}`", start.id)));
                }
                cur = self.nodes[p.index()].parent;
            }
        }
        Ok(())
    }

    pub fn append(&mut self, parent: NodeId, id: &str, kind: NodeKind) -> Result<NodeId> {
        if parent.index() >= self.nodes.len() {
            return Err(invalid(format!("parent #{} is not a node", parent.0)));
        }
        if self.ids.contains_key(id) {
            return Err(invalid(format!("duplicate node id `{id}`")));
        }
        let node = NodeId(u32::try_from(self.nodes.len()).map_err(|_| invalid("too many nodes"))?);
        self.nodes.push(NodeRecord::new(id, Some(parent), kind));
        self.ids.insert(id.to_string(), node);
        Ok(node)
    }

    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Like [`Self::lookup`], but an unknown id is an error.
    pub fn resolve_id(&self, id: &str) -> Result<NodeId> {
        self.lookup(id).ok_or_else(|| Error::UnknownNode { id: id.to_string() })
    }

    pub fn node(&self, node: NodeId) -> &NodeRecord {
        &self.nodes[node.index()]
    }

    pub fn node_mut(&mut self, node: NodeId) -> &mut NodeRecord {
        &mut self.nodes[node.index()]
    }

    pub fn id(&self, node: NodeId) -> &str {
        &self.nodes[node.index()].id
    }

    pub fn body_id(&self) -> NodeId {
        self.body
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeTree for SnapshotDocument {
    type Node = NodeId;

    fn body(&self) -> NodeId {
        self.body
    }

    fn document_element(&self) -> NodeId {
        self.document_element
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        self.node(node).kind
    }
}

impl StyleProvider for SnapshotDocument {
    fn computed_geometry(&self, node: NodeId) -> ComputedGeometry {
        self.node(node).style.clone()
    }
}

impl GeometryProvider for SnapshotDocument {
    fn bounding_rect(&self, node: NodeId) -> ClientRect {
        self.node(node).rect
    }

    fn offset_box(&self, node: NodeId) -> Option<OffsetBox> {
        self.node(node).offset
    }

    fn client_box(&self, node: NodeId) -> ClientBox {
        self.node(node).client
    }

    fn scroll_offset(&self, node: NodeId) -> Vector {
        self.node(node).scroll
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn svg_view_box(&self, node: NodeId) -> Option<ViewBox> {
        self.node(node).view_box
    }

    fn preserve_aspect_ratio(&self, node: NodeId) -> AspectRatio {
        self.node(node).preserve_aspect_ratio
    }

    fn local_bbox(&self, node: NodeId) -> Option<ClientRect> {
        self.node(node).bbox
    }
}
