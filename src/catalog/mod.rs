//! Remote competence catalog: the typed records it returns and the trait the
//! graph session talks to.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::competence::{NodeId, NodeKind};

/// Errors raised while talking to the catalog or the identity backend.
#[derive(Error, Debug)]
pub enum CatalogError {
	/// HTTP transport error
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// Non-success response
	#[error("{url} returned status {status}")]
	Status {
		/// Requested URL.
		url: String,
		/// HTTP status code.
		status: u16,
	},

	/// Backend refused or could not serve the request
	#[error("catalog unavailable: {0}")]
	Unavailable(String),
}

/// Result of a catalog call.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Any entity the catalog lists by id and title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
	/// Catalog id, unique per kind.
	pub id: u64,
	/// Display title.
	pub title: String,
}

impl Record {
	/// A record with `id` and `title`.
	pub fn new(id: u64, title: impl Into<String>) -> Self {
		Self {
			id,
			title: title.into(),
		}
	}
}

/// A duty of a position, as listed by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyRecord {
	/// Display title.
	pub title: String,
	/// Free text, absent for older duties.
	#[serde(default)]
	pub description: Option<String>,
}

/// Where a deletion is addressed.
///
/// Roles and positions live at the top level of the catalog; every other
/// entity is only reachable through the parent it is linked to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityPath {
	/// `{kind}s/{id}`
	Independent {
		/// Entity kind.
		kind: NodeKind,
		/// Catalog id.
		id: u64,
	},
	/// `{parent_kind}s/{parent_id}/{kind}s/{id}`
	Scoped {
		/// Kind of the linking parent.
		parent_kind: NodeKind,
		/// Catalog id of the parent.
		parent_id: u64,
		/// Entity kind.
		kind: NodeKind,
		/// Catalog id.
		id: u64,
	},
}

impl EntityPath {
	/// Path of `node` given its parent. `None` when the path cannot be
	/// built: the root, or a scoped entity whose parent is gone.
	pub fn for_node(node: &NodeId, parent: Option<&NodeId>) -> Option<Self> {
		let kind = node.kind()?;
		let id = node.backend_id()?;
		match kind {
			NodeKind::Main => None,
			NodeKind::Role | NodeKind::Position => Some(EntityPath::Independent { kind, id }),
			_ => {
				let parent = parent?;
				Some(EntityPath::Scoped {
					parent_kind: parent.kind()?,
					parent_id: parent.backend_id()?,
					kind,
					id,
				})
			}
		}
	}

	/// Relative URL, e.g. `grades/1/skills/10`.
	pub fn url_path(&self) -> String {
		match self {
			EntityPath::Independent { kind, id } => format!("{kind}s/{id}"),
			EntityPath::Scoped {
				parent_kind,
				parent_id,
				kind,
				id,
			} => format!("{parent_kind}s/{parent_id}/{kind}s/{id}"),
		}
	}
}

/// Request/response access to the competence catalog.
///
/// Futures are not `Send`: the browser runtime is single threaded.
#[async_trait(?Send)]
pub trait Catalog {
	/// Every role of the organization.
	async fn list_roles(&self) -> CatalogResult<Vec<Record>>;
	/// Grades of a role.
	async fn list_grades_for_role(&self, role_id: u64) -> CatalogResult<Vec<Record>>;
	/// Positions linked to a grade.
	async fn list_positions_for_grade(&self, grade_id: u64) -> CatalogResult<Vec<Record>>;
	/// Skills linked to a grade.
	async fn list_skills_for_grade(&self, grade_id: u64) -> CatalogResult<Vec<Record>>;
	/// Duties linked to a position.
	async fn list_duties_for_position(&self, position_id: u64) -> CatalogResult<Vec<DutyRecord>>;
	/// Sub-skills of a skill.
	async fn list_sub_skills(&self, skill_id: u64) -> CatalogResult<Vec<Record>>;

	/// Creates a role and returns its id.
	async fn create_role(&self, title: &str) -> CatalogResult<u64>;
	/// Creates a grade of `role_id`. `previous_grade` orders it after an
	/// existing one.
	async fn create_grade(&self, role_id: u64, title: &str, previous_grade: Option<u64>) -> CatalogResult<u64>;
	/// Creates an unlinked position.
	async fn create_position(&self, title: &str) -> CatalogResult<u64>;
	/// Creates an unlinked skill.
	async fn create_skill(&self, title: &str) -> CatalogResult<u64>;
	/// Creates an unlinked duty.
	async fn create_duty(&self, title: &str, description: &str) -> CatalogResult<u64>;

	/// Lists `position_id` under `grade_id`.
	async fn link_position_to_grade(&self, grade_id: u64, position_id: u64) -> CatalogResult<()>;
	/// Lists `skill_id` under `grade_id`.
	async fn link_skill_to_grade(&self, grade_id: u64, skill_id: u64) -> CatalogResult<()>;
	/// Lists `duty_id` under `position_id`.
	async fn link_duty_to_position(&self, position_id: u64, duty_id: u64) -> CatalogResult<()>;

	/// Deletes the entity at `path`.
	async fn delete_entity(&self, path: &EntityPath) -> CatalogResult<()>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn roles_and_positions_are_independent() {
		let role = NodeId::of(NodeKind::Role, 3);
		assert_eq!(
			EntityPath::for_node(&role, Some(&NodeId::root())).map(|path| path.url_path()),
			Some("roles/3".to_string())
		);
		let position = NodeId::of(NodeKind::Position, 4);
		assert_eq!(
			EntityPath::for_node(&position, None).map(|path| path.url_path()),
			Some("positions/4".to_string())
		);
	}

	#[test]
	fn skills_are_scoped_under_their_grade() {
		let skill = NodeId::of(NodeKind::Skill, 10);
		let grade = NodeId::of(NodeKind::Grade, 1);
		assert_eq!(
			EntityPath::for_node(&skill, Some(&grade)).map(|path| path.url_path()),
			Some("grades/1/skills/10".to_string())
		);
		assert_eq!(EntityPath::for_node(&skill, None), None);
		assert_eq!(EntityPath::for_node(&NodeId::root(), None), None);
	}

	#[test]
	fn duty_description_is_optional() {
		let duty: DutyRecord = serde_json::from_str(r#"{"title":"Code review"}"#).unwrap();
		assert_eq!(duty.description, None);
	}
}
