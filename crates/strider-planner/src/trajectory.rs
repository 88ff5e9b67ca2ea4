//! Arena of trajectory nodes and plan reconstruction.
//!
//! Every walk appends a self-contained segment to the arena: a root node
//! followed by one node per applied action, each pointing at its
//! predecessor by index. Segments that are no longer needed are released by
//! truncating the arena back to the mark taken before the walk, and the
//! segment holding the best trajectory is promoted to the front so that the
//! arena never holds more than the best walk plus the current one.

use strider_core::{ActionId, Plan, State};

/// Handle of a node in a [`TrajectoryArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One state of a walk and how it was reached.
#[derive(Debug, Clone)]
pub struct TrajectoryNode {
    /// State at this node.
    pub state: State,
    /// Action that produced this node (`None` for the root).
    pub action: Option<ActionId>,
    /// Predecessor (`None` for the root).
    pub parent: Option<NodeId>,
    /// Number of actions from the root.
    pub depth: usize,
}

/// Pool of trajectory nodes indexed by [`NodeId`].
#[derive(Debug, Default)]
pub struct TrajectoryArena {
    nodes: Vec<TrajectoryNode>,
    bytes: usize,
    peak_nodes: usize,
    peak_bytes: usize,
}

impl TrajectoryArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> &TrajectoryNode {
        &self.nodes[id.0]
    }

    /// Start a new trajectory at `state`.
    pub fn push_root(&mut self, state: State) -> NodeId {
        self.push(TrajectoryNode {
            state,
            action: None,
            parent: None,
            depth: 0,
        })
    }

    /// Record that `action` led from `parent` to `state`.
    pub fn push_child(&mut self, parent: NodeId, action: ActionId, state: State) -> NodeId {
        let depth = self.node(parent).depth + 1;
        self.push(TrajectoryNode {
            state,
            action: Some(action),
            parent: Some(parent),
            depth,
        })
    }

    fn push(&mut self, node: TrajectoryNode) -> NodeId {
        self.bytes += node_bytes(&node);
        self.nodes.push(node);
        self.peak_nodes = self.peak_nodes.max(self.nodes.len());
        self.peak_bytes = self.peak_bytes.max(self.bytes);
        NodeId(self.nodes.len() - 1)
    }

    /// Release every node at or after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        if mark >= self.nodes.len() {
            return;
        }
        self.bytes -= self.nodes[mark..].iter().map(node_bytes).sum::<usize>();
        self.nodes.truncate(mark);
    }

    /// Release every node before `mark` and shift the segment starting at
    /// `mark` to the front. Returns the new handle of `node`.
    ///
    /// The segment must start with a root and only reference nodes inside
    /// itself, which holds for every walk.
    pub fn promote(&mut self, mark: usize, node: NodeId) -> NodeId {
        if mark == 0 {
            return node;
        }
        self.bytes -= self.nodes[..mark].iter().map(node_bytes).sum::<usize>();
        self.nodes.drain(..mark);
        for kept in &mut self.nodes {
            kept.parent = kept.parent.map(|p| NodeId(p.0 - mark));
        }
        NodeId(node.0 - mark)
    }

    /// Collect the actions from the root to `node`.
    pub fn reconstruct(&self, node: NodeId) -> Plan {
        let mut actions = Vec::with_capacity(self.node(node).depth);
        let mut current = Some(node);
        while let Some(id) = current {
            let entry = self.node(id);
            if let Some(action) = entry.action {
                actions.push(action);
            }
            current = entry.parent;
        }
        actions.reverse();
        Plan::new(actions)
    }

    /// Largest number of nodes held at once.
    pub fn peak_nodes(&self) -> usize {
        self.peak_nodes
    }

    /// Estimated peak footprint in bytes.
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes
    }
}

fn node_bytes(node: &TrajectoryNode) -> usize {
    std::mem::size_of::<TrajectoryNode>() + node.state.approx_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strider_core::Fluent;

    fn state(i: u32) -> State {
        State::new([Fluent(i)])
    }

    /// Push a root and `len` children, returning the last node.
    fn walk(arena: &mut TrajectoryArena, first_action: usize, len: usize) -> NodeId {
        let mut node = arena.push_root(state(0));
        for step in 0..len {
            node = arena.push_child(node, ActionId(first_action + step), state(step as u32 + 1));
        }
        node
    }

    #[test]
    fn test_reconstruct_order_and_depth() {
        let mut arena = TrajectoryArena::new();
        let last = walk(&mut arena, 10, 3);

        let plan = arena.reconstruct(last);
        assert_eq!(plan.actions(), &[ActionId(10), ActionId(11), ActionId(12)]);
        assert_eq!(plan.len(), arena.node(last).depth);
    }

    #[test]
    fn test_root_reconstructs_empty_plan() {
        let mut arena = TrajectoryArena::new();
        let root = arena.push_root(state(0));
        assert!(arena.reconstruct(root).is_empty());
        assert_eq!(arena.node(root).depth, 0);
    }

    #[test]
    fn test_truncate_releases_walk() {
        let mut arena = TrajectoryArena::new();
        walk(&mut arena, 0, 2);
        let mark = arena.len();
        walk(&mut arena, 5, 4);
        assert_eq!(arena.len(), 8);

        arena.truncate(mark);
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.peak_nodes(), 8);
    }

    #[test]
    fn test_promote_keeps_chain() {
        let mut arena = TrajectoryArena::new();
        walk(&mut arena, 0, 2);
        let mark = arena.len();
        let last = walk(&mut arena, 7, 2);

        let promoted = arena.promote(mark, last);
        assert_eq!(arena.len(), 3);
        assert_eq!(promoted, NodeId(2));
        assert_eq!(arena.reconstruct(promoted).actions(), &[ActionId(7), ActionId(8)]);
    }

    #[test]
    fn test_byte_accounting_returns_to_zero() {
        let mut arena = TrajectoryArena::new();
        walk(&mut arena, 0, 3);
        assert!(arena.peak_bytes() > 0);
        arena.truncate(0);
        assert!(arena.is_empty());
        assert_eq!(arena.bytes, 0);
    }
}
