use std::collections::HashSet;

use super::node::{Node, NodeId, NodeKind};

/// Visual size and fill handed to the rendering surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	/// Diameter in world units.
	pub size: f64,
	/// CSS color.
	pub color: &'static str,
}

const OWNED_COLOR: &str = "#A1DE93";

/// Style of a skill the user owns.
pub const OWNED: NodeStyle = NodeStyle {
	size: 12.0,
	color: OWNED_COLOR,
};

/// Style of a grade whose skills are all owned.
pub const COVERED: NodeStyle = NodeStyle {
	size: 15.0,
	color: OWNED_COLOR,
};

/// Default style per kind.
pub fn kind_style(kind: NodeKind) -> NodeStyle {
	match kind {
		NodeKind::Main => NodeStyle {
			size: 26.0,
			color: "#2E62D9",
		},
		NodeKind::Role => NodeStyle {
			size: 20.0,
			color: "#2E62D9",
		},
		NodeKind::Grade => NodeStyle {
			size: 15.0,
			color: "#F7F48B",
		},
		NodeKind::Skill => NodeStyle {
			size: 10.0,
			color: "#F47C7C",
		},
		NodeKind::Position | NodeKind::Duty | NodeKind::SubSkill => NodeStyle {
			size: 10.0,
			color: "#70A1D7",
		},
	}
}

/// What the styler needs to know about the signed-in user.
#[derive(Clone, Copy, Debug)]
pub struct OwnershipView<'a> {
	/// Skills the user owns.
	pub owned: &'a HashSet<NodeId>,
	/// Grades flagged as covered.
	pub covered: &'a HashSet<NodeId>,
}

/// Style of `node`. Without a signed-in user only the kind matters.
pub fn style(node: &Node, ownership: Option<OwnershipView<'_>>) -> NodeStyle {
	let Some(ownership) = ownership else {
		return kind_style(node.kind());
	};
	match node.kind() {
		NodeKind::Skill if ownership.owned.contains(node.id()) => OWNED,
		NodeKind::Grade if ownership.covered.contains(node.id()) => COVERED,
		kind => kind_style(kind),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn owned_skill_overrides_kind_style() {
		let grade = NodeId::of(NodeKind::Grade, 1);
		let skill = Node::child(NodeKind::Skill, 10, "Rust", &grade);
		let owned = HashSet::from([skill.id().clone()]);
		let covered = HashSet::new();
		let view = OwnershipView {
			owned: &owned,
			covered: &covered,
		};
		assert_eq!(style(&skill, Some(view)), OWNED);
		assert_eq!(style(&skill, None), kind_style(NodeKind::Skill));
	}

	#[test]
	fn covered_grade_keeps_its_size() {
		let grade = Node::child(NodeKind::Grade, 1, "Junior", &NodeId::of(NodeKind::Role, 5));
		let owned = HashSet::new();
		let covered = HashSet::from([grade.id().clone()]);
		let view = OwnershipView {
			owned: &owned,
			covered: &covered,
		};
		let styled = style(&grade, Some(view));
		assert_eq!(styled.color, OWNED_COLOR);
		assert_eq!(styled.size, kind_style(NodeKind::Grade).size);
	}
}
