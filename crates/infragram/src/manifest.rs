//! What a renderer actually drew.
//!
//! Both backends return a [`RenderManifest`] next to their artifact. The
//! manifest lists drawn nodes in canonical order, drawn edges in Connection
//! order and the Connections that were skipped because an endpoint does not
//! exist. Comparing two manifests is how backend parity is checked without
//! decoding a PNG.

use log::warn;

use infragram_core::{
    identifier::Id,
    schema::{Connection, Schema},
};

use crate::layout::{Layout, Placement, Role};

/// A drawn Component or Container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifestNode {
    id: Id,
    role: Role,
}

impl ManifestNode {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// A drawn edge; `index` is the Connection's position in the Schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManifestEdge {
    index: usize,
    source: Id,
    target: Id,
}

impl ManifestEdge {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }
}

/// A Connection left out of the render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkippedConnection {
    index: usize,
    source: Id,
    target: Id,
    missing: Id,
}

impl SkippedConnection {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    /// The first endpoint that could not be resolved.
    pub fn missing(&self) -> Id {
        self.missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderManifest {
    nodes: Vec<ManifestNode>,
    edges: Vec<ManifestEdge>,
    skipped: Vec<SkippedConnection>,
}

impl RenderManifest {
    pub fn nodes(&self) -> &[ManifestNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[ManifestEdge] {
        &self.edges
    }

    pub fn skipped(&self) -> &[SkippedConnection] {
        &self.skipped
    }

    /// Ids of every drawn node, Containers included.
    pub fn node_ids(&self) -> Vec<Id> {
        self.nodes.iter().map(ManifestNode::id).collect()
    }

    /// Ids of drawn Components only.
    pub fn component_ids(&self) -> Vec<Id> {
        self.nodes
            .iter()
            .filter(|node| node.role == Role::Component)
            .map(ManifestNode::id)
            .collect()
    }

    pub(crate) fn push_node(&mut self, id: Id, role: Role) {
        self.nodes.push(ManifestNode { id, role });
    }

    pub(crate) fn push_edge(&mut self, edge: &ResolvedEdge<'_>) {
        self.edges.push(ManifestEdge {
            index: edge.index,
            source: edge.connection.source(),
            target: edge.connection.target(),
        });
    }

    pub(crate) fn push_skipped(&mut self, skipped: SkippedConnection) {
        self.skipped.push(skipped);
    }
}

/// A Connection whose endpoints both have a placement.
pub(crate) struct ResolvedEdge<'a> {
    pub(crate) index: usize,
    pub(crate) connection: &'a Connection,
    pub(crate) source: &'a Placement,
    pub(crate) target: &'a Placement,
}

/// Splits the Schema's Connections into drawable edges and skipped ones.
///
/// Both backends call this, so they agree on which Connections are drawn.
pub(crate) fn resolve_connections<'a>(
    schema: &'a Schema,
    layout: &'a Layout,
    backend: &str,
) -> (Vec<ResolvedEdge<'a>>, Vec<SkippedConnection>) {
    let mut edges = Vec::new();
    let mut skipped = Vec::new();

    for (index, connection) in schema.connections().iter().enumerate() {
        match (layout.get(connection.source()), layout.get(connection.target())) {
            (Some(source), Some(target)) => edges.push(ResolvedEdge {
                index,
                connection,
                source,
                target,
            }),
            (source, _) => {
                let missing = if source.is_none() {
                    connection.source()
                } else {
                    connection.target()
                };
                warn!(
                    backend = backend,
                    index = index,
                    source:% = connection.source(),
                    target:% = connection.target(),
                    missing:% = missing;
                    "Skipping connection with unresolved endpoint"
                );
                skipped.push(SkippedConnection {
                    index,
                    source: connection.source(),
                    target: connection.target(),
                    missing,
                });
            }
        }
    }

    (edges, skipped)
}
