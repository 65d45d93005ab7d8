use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, error};

use super::node::{Node, NodeId, NodeKind};

/// Derived parent → child link.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
	/// The parent, or a grade that links the target.
	pub source: NodeId,
	/// The child.
	pub target: NodeId,
}

/// Owner of every node in the current graph session.
///
/// Nodes are kept in insertion order. Edges are not stored; they are derived
/// from parent pointers and the links recorded with [`GraphStore::link`].
///
/// A catalog entity is a single node even when several grades list it. The
/// node hangs off whichever grade fetched it first; the other grades reach it
/// through their link lists.
#[derive(Debug)]
pub struct GraphStore {
	nodes: IndexMap<NodeId, Node>,
	links: IndexMap<NodeId, Vec<NodeId>>,
	covered: HashSet<NodeId>,
	fetching: HashSet<NodeId>,
	epoch: u64,
}

impl GraphStore {
	/// A store holding only the root node.
	pub fn new(root_name: impl Into<String>) -> Self {
		let root = Node::root(root_name);
		let mut nodes = IndexMap::new();
		nodes.insert(root.id().clone(), root);
		Self {
			nodes,
			links: IndexMap::new(),
			covered: HashSet::new(),
			fetching: HashSet::new(),
			epoch: 0,
		}
	}

	/// Adds a batch of new nodes.
	///
	/// The caller guarantees the ids are fresh and that none of them is a
	/// second root. Violations panic in debug builds and are dropped in
	/// release builds.
	pub fn append(&mut self, nodes: impl IntoIterator<Item = Node>) -> usize {
		let mut appended = 0;
		for node in nodes {
			if node.is_root() {
				debug_assert!(false, "second root node {}", node.id());
				error!("refusing second root node {}", node.id());
				continue;
			}
			if self.nodes.contains_key(node.id()) {
				debug_assert!(false, "duplicate node id {}", node.id());
				error!("refusing duplicate node id {}", node.id());
				continue;
			}
			self.nodes.insert(node.id().clone(), node);
			appended += 1;
		}
		appended
	}

	/// Appends only the nodes whose ids are not present yet.
	pub fn merge(&mut self, nodes: impl IntoIterator<Item = Node>) -> usize {
		let fresh: Vec<Node> = nodes
			.into_iter()
			.filter(|node| !self.nodes.contains_key(node.id()))
			.collect();
		self.append(fresh)
	}

	/// Removes one node. Children keep their now dangling parent id.
	/// The root is never removed.
	pub fn remove(&mut self, id: &NodeId) -> Option<Node> {
		if self.nodes.get(id).is_some_and(Node::is_root) {
			error!("refusing to remove the root node");
			return None;
		}
		self.covered.remove(id);
		self.links.shift_remove(id);
		for listed in self.links.values_mut() {
			listed.retain(|child| child != id);
		}
		self.nodes.shift_remove(id)
	}

	/// Records that the catalog lists `children` under `parent`, including
	/// entities already placed under another parent.
	pub fn link(&mut self, parent: &NodeId, children: impl IntoIterator<Item = NodeId>) {
		let listed = self.links.entry(parent.clone()).or_default();
		for child in children {
			if !listed.contains(&child) {
				listed.push(child);
			}
		}
	}

	/// Nodes of `kind` that belong to `parent`: its own children plus the
	/// linked ones that hang off another parent.
	pub fn members(&self, parent: &NodeId, kind: NodeKind) -> Vec<&Node> {
		let mut members = self.find_by_parent(parent, kind);
		for node in self.linked(parent) {
			if node.kind() == kind {
				members.push(node);
			}
		}
		members
	}

	/// Every node `id` belongs to, parent first.
	pub fn owners_of(&self, id: &NodeId) -> Vec<NodeId> {
		let mut owners: Vec<NodeId> = self
			.find(id)
			.and_then(Node::parent_id)
			.into_iter()
			.cloned()
			.collect();
		for (parent, listed) in &self.links {
			if listed.contains(id) && !owners.contains(parent) {
				owners.push(parent.clone());
			}
		}
		owners
	}

	/// Linked nodes present in the store that are not `parent`'s own children.
	fn linked<'a>(&'a self, parent: &NodeId) -> impl Iterator<Item = &'a Node> {
		self.links
			.get(parent)
			.into_iter()
			.flatten()
			.filter_map(move |id| self.nodes.get(id))
			.filter(move |node| node.parent_id() != Some(parent))
	}

	/// Node by id.
	pub fn find(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.get(id)
	}

	/// All nodes of `kind` whose parent is `parent`.
	pub fn find_by_parent(&self, parent: &NodeId, kind: NodeKind) -> Vec<&Node> {
		self.nodes
			.values()
			.filter(|node| node.kind() == kind && node.parent_id() == Some(parent))
			.collect()
	}

	/// All nodes of `kind`, in insertion order.
	pub fn of_kind(&self, kind: NodeKind) -> Vec<&Node> {
		self.nodes.values().filter(|node| node.kind() == kind).collect()
	}

	/// Idempotent. Returns `false` when the node does not exist.
	pub fn mark_expanded(&mut self, id: &NodeId) -> bool {
		match self.nodes.get_mut(id) {
			Some(node) => {
				node.set_expanded();
				true
			}
			None => false,
		}
	}

	/// `false` for unknown ids.
	pub fn is_expanded(&self, id: &NodeId) -> bool {
		self.nodes.get(id).is_some_and(Node::is_expanded)
	}

	/// Records that a fetch for `id` is in flight. Returns `false` if one
	/// already was.
	pub fn begin_fetch(&mut self, id: &NodeId) -> bool {
		self.fetching.insert(id.clone())
	}

	/// Clears the in-flight marker of `id`.
	pub fn end_fetch(&mut self, id: &NodeId) {
		self.fetching.remove(id);
	}

	/// Whether a fetch for `id` is in flight.
	pub fn is_fetching(&self, id: &NodeId) -> bool {
		self.fetching.contains(id)
	}

	/// Flags a grade as fully covered by the user's skills. There is no way
	/// back short of removing the node.
	pub fn cover(&mut self, grade: &NodeId) -> bool {
		if !self.nodes.contains_key(grade) {
			return false;
		}
		self.covered.insert(grade.clone())
	}

	/// Whether `id` is a covered grade.
	pub fn is_covered(&self, id: &NodeId) -> bool {
		self.covered.contains(id)
	}

	/// Every covered grade.
	pub fn covered(&self) -> &HashSet<NodeId> {
		&self.covered
	}

	/// Parent → child pairs for every non-root node, then one pair per link
	/// to a node that hangs off another parent.
	pub fn edges(&self) -> Vec<Edge> {
		let owned = self.nodes.values().filter_map(|node| {
			node.parent_id().map(|parent| Edge {
				source: parent.clone(),
				target: node.id().clone(),
			})
		});
		let linked = self.links.keys().flat_map(|parent| {
			self.linked(parent).map(move |node| Edge {
				source: parent.clone(),
				target: node.id().clone(),
			})
		});
		owned.chain(linked).collect()
	}

	/// Nodes in insertion order, root first.
	pub fn iter(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	/// Node count, root included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Never `true` in practice: the root is always present.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The organization root.
	pub fn root(&self) -> &Node {
		self.nodes
			.values()
			.find(|node| node.is_root())
			.expect("graph store always holds its root")
	}

	/// Bumped on every reset so pending fetches can tell they are stale.
	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	/// Back to just the root node.
	pub fn reset(&mut self) {
		self.nodes.retain(|_, node| node.is_root());
		if let Some(root) = self.nodes.values_mut().next() {
			*root = Node::root(root.name().to_string());
		}
		self.links.clear();
		self.covered.clear();
		self.fetching.clear();
		self.epoch += 1;
		debug!("graph store reset, epoch {}", self.epoch);
	}
}
