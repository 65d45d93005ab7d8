use std::collections::{BTreeSet, HashSet};

use super::node::{NodeId, NodeKind};
use super::store::{Edge, GraphStore};
use super::style::{NodeStyle, OwnershipView, style};

/// Optional kinds the user wants to see. The spine is always added on top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet(BTreeSet<NodeKind>);

impl FilterSet {
	/// Shows the optional `kinds`.
	pub fn new(kinds: impl IntoIterator<Item = NodeKind>) -> Self {
		Self(kinds.into_iter().collect())
	}

	/// Whether `kind` was chosen. Spine kinds only count if chosen explicitly.
	pub fn contains(&self, kind: NodeKind) -> bool {
		self.0.contains(&kind)
	}

	/// Flips `kind` on or off.
	pub fn toggle(&mut self, kind: NodeKind) {
		if !self.0.remove(&kind) {
			self.0.insert(kind);
		}
	}

	/// The chosen kinds plus `main`, `role` and `grade`.
	pub fn effective(&self) -> BTreeSet<NodeKind> {
		let mut kinds = self.0.clone();
		kinds.extend(NodeKind::ALL.into_iter().filter(|kind| kind.is_spine()));
		kinds
	}
}

/// A node as the canvas should draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedNode {
	/// Id reported back on activation.
	pub id: NodeId,
	/// Entity kind.
	pub kind: NodeKind,
	/// Text drawn next to the node.
	pub label: String,
	/// Size and color.
	pub style: NodeStyle,
}

/// Filtered, styled view handed to the rendering surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
	/// Selected nodes in store order.
	pub nodes: Vec<ProjectedNode>,
	/// Edges between selected nodes.
	pub edges: Vec<Edge>,
}

impl Projection {
	/// Whether `id` was selected.
	pub fn contains(&self, id: &NodeId) -> bool {
		self.nodes.iter().any(|node| &node.id == id)
	}
}

/// Selects the nodes whose kind passes the effective filter, keeps the edges
/// whose endpoints are both selected and styles every selected node.
pub fn project(store: &GraphStore, filters: &FilterSet, owned: Option<&HashSet<NodeId>>) -> Projection {
	let kinds = filters.effective();
	let ownership = owned.map(|owned| OwnershipView {
		owned,
		covered: store.covered(),
	});

	let nodes: Vec<ProjectedNode> = store
		.iter()
		.filter(|node| kinds.contains(&node.kind()))
		.map(|node| ProjectedNode {
			id: node.id().clone(),
			kind: node.kind(),
			label: node.name().to_string(),
			style: style(node, ownership),
		})
		.collect();

	let selected: HashSet<&NodeId> = nodes.iter().map(|node| &node.id).collect();
	let edges = store
		.edges()
		.into_iter()
		.filter(|edge| selected.contains(&edge.source) && selected.contains(&edge.target))
		.collect();

	Projection { nodes, edges }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::competence::node::Node;
	use crate::competence::style::{OWNED, kind_style};

	fn populated() -> GraphStore {
		let mut store = GraphStore::new("Acme");
		let role = NodeId::of(NodeKind::Role, 5);
		let grade = NodeId::of(NodeKind::Grade, 1);
		store.append([
			Node::child(NodeKind::Role, 5, "Backend", &NodeId::root()),
			Node::child(NodeKind::Grade, 1, "Junior", &role),
			Node::child(NodeKind::Skill, 10, "Rust", &grade),
			Node::child(NodeKind::Position, 3, "Developer", &grade),
		]);
		store
	}

	#[test]
	fn empty_filter_keeps_the_spine() {
		let store = populated();
		let view = project(&store, &FilterSet::default(), None);
		let kinds: Vec<NodeKind> = view.nodes.iter().map(|node| node.kind).collect();
		assert_eq!(kinds, vec![NodeKind::Main, NodeKind::Role, NodeKind::Grade]);
		assert_eq!(view.edges.len(), 2);
	}

	#[test]
	fn spine_survives_every_filter_combination() {
		let store = populated();
		let optional = [NodeKind::Position, NodeKind::Skill, NodeKind::Duty, NodeKind::SubSkill];
		for mask in 0..(1 << optional.len()) {
			let filters = FilterSet::new(
				optional
					.iter()
					.enumerate()
					.filter(|(bit, _)| mask & (1 << bit) != 0)
					.map(|(_, kind)| *kind),
			);
			let view = project(&store, &filters, None);
			for node in store.iter().filter(|node| node.kind().is_spine()) {
				assert!(view.contains(node.id()), "{} missing under {filters:?}", node.id());
			}
		}
	}

	#[test]
	fn edges_need_both_endpoints() {
		let store = populated();
		let view = project(&store, &FilterSet::new([NodeKind::Skill]), None);
		assert!(view.contains(&NodeId::of(NodeKind::Skill, 10)));
		assert!(!view.contains(&NodeId::of(NodeKind::Position, 3)));
		assert!(view.edges.iter().all(|edge| view.contains(&edge.source) && view.contains(&edge.target)));
		assert_eq!(view.edges.len(), 3);
	}

	#[test]
	fn orphans_stay_selectable_without_an_edge() {
		let mut store = populated();
		let grade = NodeId::of(NodeKind::Grade, 1);
		let skill = NodeId::of(NodeKind::Skill, 10);
		store.remove(&grade);
		let view = project(&store, &FilterSet::new([NodeKind::Skill]), None);
		assert!(view.contains(&skill));
		assert!(!view.edges.iter().any(|edge| edge.target == skill));
	}

	#[test]
	fn styles_follow_ownership_only_when_signed_in() {
		let store = populated();
		let skill = NodeId::of(NodeKind::Skill, 10);
		let owned = HashSet::from([skill.clone()]);
		let filters = FilterSet::new([NodeKind::Skill]);

		let signed_in = project(&store, &filters, Some(&owned));
		let styled = signed_in.nodes.iter().find(|node| node.id == skill).map(|node| node.style);
		assert_eq!(styled, Some(OWNED));

		let anonymous = project(&store, &filters, None);
		let styled = anonymous.nodes.iter().find(|node| node.id == skill).map(|node| node.style);
		assert_eq!(styled, Some(kind_style(NodeKind::Skill)));
	}

	#[test]
	fn toggle_flips_membership() {
		let mut filters = FilterSet::default();
		filters.toggle(NodeKind::Skill);
		assert!(filters.contains(NodeKind::Skill));
		filters.toggle(NodeKind::Skill);
		assert!(!filters.contains(NodeKind::Skill));
	}
}
