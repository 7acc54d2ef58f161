// Discovered pages and the predecessor tree linking them back to the start

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub page: String,
    pub depth: usize,
    pub parent: Option<NodeId>,
}

/// Nodes owned by a single search. Each points at its parent by index, so the
/// tree only ever points toward the root.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a depth-0 node with no predecessor.
    pub fn root(&mut self, page: impl Into<String>) -> NodeId {
        self.push(Node {
            page: page.into(),
            depth: 0,
            parent: None,
        })
    }

    /// Adds a node discovered from `parent`, one level deeper.
    pub fn child(&mut self, parent: NodeId, page: impl Into<String>) -> NodeId {
        let depth = self.nodes[parent.0].depth + 1;
        self.push(Node {
            page: page.into(),
            depth,
            parent: Some(parent),
        })
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks predecessors from `id` back to the root and returns the pages in
    /// root-first order.
    pub fn path_to(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(id);

        while let Some(node) = current.and_then(|id| self.get(id)) {
            path.push(node.page.clone());
            current = node.parent;
        }

        path.reverse();
        path
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}
