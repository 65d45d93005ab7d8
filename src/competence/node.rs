use std::fmt;

/// Id of the root node. It has no backend counterpart.
pub const ROOT_ID: &str = "main";

/// Closed set of entity kinds shown in the competence graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
	/// The organization root.
	Main,
	/// A role, e.g. "Backend developer".
	Role,
	/// A grade within a role.
	Grade,
	/// A position attached to a grade.
	Position,
	/// A skill attached to a grade.
	Skill,
	/// A duty of a position. Only shown in the detail panel.
	Duty,
	/// A sub-skill of a skill. Only shown in the detail panel.
	SubSkill,
}

impl NodeKind {
	/// Every kind, spine first.
	pub const ALL: [NodeKind; 7] = [
		NodeKind::Main,
		NodeKind::Role,
		NodeKind::Grade,
		NodeKind::Position,
		NodeKind::Skill,
		NodeKind::Duty,
		NodeKind::SubSkill,
	];

	/// Tag used as the id prefix and in catalog paths.
	pub fn tag(self) -> &'static str {
		match self {
			NodeKind::Main => "main",
			NodeKind::Role => "role",
			NodeKind::Grade => "grade",
			NodeKind::Position => "position",
			NodeKind::Skill => "skill",
			NodeKind::Duty => "duty",
			NodeKind::SubSkill => "subskill",
		}
	}

	/// Inverse of [`NodeKind::tag`].
	pub fn from_tag(tag: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.tag() == tag)
	}

	/// Kinds that always stay visible regardless of filters.
	pub fn is_spine(self) -> bool {
		matches!(self, NodeKind::Main | NodeKind::Role | NodeKind::Grade)
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.tag())
	}
}

/// Graph-wide node id, `<kind>:<backendId>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
	/// Builds the id of a catalog entity.
	pub fn of(kind: NodeKind, backend_id: u64) -> Self {
		Self(format!("{}:{}", kind.tag(), backend_id))
	}

	/// The root sentinel.
	pub fn root() -> Self {
		Self(ROOT_ID.to_string())
	}

	/// Kind encoded in the prefix, if it is a known tag.
	pub fn kind(&self) -> Option<NodeKind> {
		match self.0.split_once(':') {
			Some((tag, _)) => NodeKind::from_tag(tag),
			None if self.0 == ROOT_ID => Some(NodeKind::Main),
			None => None,
		}
	}

	/// Catalog identifier after the colon. `None` for the root.
	pub fn backend_id(&self) -> Option<u64> {
		self.0.split_once(':').and_then(|(_, id)| id.parse().ok())
	}

	/// Raw id string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<String> for NodeId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// A single entity of the competence graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
	id: NodeId,
	kind: NodeKind,
	name: String,
	parent_id: Option<NodeId>,
	expanded: bool,
}

impl Node {
	/// The organization root.
	pub(crate) fn root(name: impl Into<String>) -> Self {
		Self {
			id: NodeId::root(),
			kind: NodeKind::Main,
			name: name.into(),
			parent_id: None,
			expanded: false,
		}
	}

	/// A catalog entity fetched because of `parent`.
	pub fn child(kind: NodeKind, backend_id: u64, name: impl Into<String>, parent: &NodeId) -> Self {
		Self {
			id: NodeId::of(kind, backend_id),
			kind,
			name: name.into(),
			parent_id: Some(parent.clone()),
			expanded: false,
		}
	}

	/// Graph-wide id.
	pub fn id(&self) -> &NodeId {
		&self.id
	}

	/// Entity kind.
	pub fn kind(&self) -> NodeKind {
		self.kind
	}

	/// Display name, the catalog title.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Node whose expansion fetched this one. `None` only for the root.
	pub fn parent_id(&self) -> Option<&NodeId> {
		self.parent_id.as_ref()
	}

	/// Whether this is the organization root.
	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}

	/// Whether the children were fetched already.
	pub fn is_expanded(&self) -> bool {
		self.expanded
	}

	pub(crate) fn set_expanded(&mut self) {
		self.expanded = true;
	}
}
