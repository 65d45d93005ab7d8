//! Catalog mutations for signed-in users, mirrored into the graph.
//!
//! A created node only enters the store when its parent is the root or has
//! already been expanded; otherwise the parent's next expansion brings it in.

use log::{debug, info};

use super::node::{Node, NodeId, NodeKind};
use super::session::GraphSession;
use crate::catalog::{Catalog, EntityPath};
use crate::error::{GraphError, GraphResult};
use crate::identity::Identity;

impl<C: Catalog, I: Identity> GraphSession<C, I> {
	/// Creates a role under the organization.
	pub async fn create_role(&self, title: &str) -> GraphResult<NodeId> {
		self.require_user()?;
		let id = self.catalog.create_role(title).await?;
		info!("created role {title}");
		Ok(self.attach(NodeKind::Role, id, title, &NodeId::root()))
	}

	/// `previous` orders the new grade after an existing grade of the role.
	pub async fn create_grade(&self, title: &str, role: &NodeId, previous: Option<&NodeId>) -> GraphResult<NodeId> {
		self.require_user()?;
		let role_id = backend_id_of(role, NodeKind::Role)?;
		let previous = previous
			.map(|grade| backend_id_of(grade, NodeKind::Grade))
			.transpose()?;
		let id = self.catalog.create_grade(role_id, title, previous).await?;
		info!("created grade {title} under {role}");
		Ok(self.attach(NodeKind::Grade, id, title, role))
	}

	/// Creates a position and links it to `grade`.
	pub async fn create_position(&self, title: &str, grade: &NodeId) -> GraphResult<NodeId> {
		self.require_user()?;
		let grade_id = backend_id_of(grade, NodeKind::Grade)?;
		let id = self.catalog.create_position(title).await?;
		self.catalog.link_position_to_grade(grade_id, id).await?;
		info!("created position {title} under {grade}");
		Ok(self.attach(NodeKind::Position, id, title, grade))
	}

	/// Creates a skill and links it to `grade`.
	pub async fn create_skill(&self, title: &str, grade: &NodeId) -> GraphResult<NodeId> {
		self.require_user()?;
		let grade_id = backend_id_of(grade, NodeKind::Grade)?;
		let id = self.catalog.create_skill(title).await?;
		self.catalog.link_skill_to_grade(grade_id, id).await?;
		info!("created skill {title} under {grade}");
		Ok(self.attach(NodeKind::Skill, id, title, grade))
	}

	/// Duties only appear in a position's detail panel, so the graph is
	/// left untouched.
	pub async fn create_duty(&self, title: &str, description: &str, position: &NodeId) -> GraphResult<NodeId> {
		self.require_user()?;
		let position_id = backend_id_of(position, NodeKind::Position)?;
		let id = self.catalog.create_duty(title, description).await?;
		self.catalog.link_duty_to_position(position_id, id).await?;
		info!("created duty {title} under {position}");
		Ok(NodeId::of(NodeKind::Duty, id))
	}

	/// Deletes the entity behind `id` and drops the node. Children are kept
	/// with a dangling parent. Returns `false` for unknown nodes.
	pub async fn delete(&self, id: &NodeId) -> GraphResult<bool> {
		self.require_user()?;
		let Some(parent) = self.store.borrow().find(id).map(|node| node.parent_id().cloned()) else {
			debug!("delete of unknown node {id} ignored");
			return Ok(false);
		};
		let Some(parent) = parent else {
			return Err(GraphError::Invariant("the root node cannot be deleted"));
		};
		let path = EntityPath::for_node(id, Some(&parent))
			.ok_or(GraphError::Invariant("node has no catalog address"))?;

		let epoch = self.epoch();
		self.catalog.delete_entity(&path).await?;
		if !self.is_stale(epoch) {
			self.store.borrow_mut().remove(id);
		}
		info!("deleted {id}");
		Ok(true)
	}

	fn attach(&self, kind: NodeKind, backend_id: u64, title: &str, parent: &NodeId) -> NodeId {
		let node = Node::child(kind, backend_id, title, parent);
		let id = node.id().clone();
		let mut store = self.store.borrow_mut();
		if parent == store.root().id() || store.is_expanded(parent) {
			store.merge([node]);
		}
		id
	}
}

fn backend_id_of(id: &NodeId, kind: NodeKind) -> GraphResult<u64> {
	match (id.kind(), id.backend_id()) {
		(Some(actual), Some(backend_id)) if actual == kind => Ok(backend_id),
		_ => Err(GraphError::Invariant("parent node has the wrong kind")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::Record;
	use crate::fixtures::{MemoryCatalog, MemoryIdentity};

	fn role() -> NodeId {
		NodeId::of(NodeKind::Role, 5)
	}

	fn grade() -> NodeId {
		NodeId::of(NodeKind::Grade, 1)
	}

	async fn session(identity: MemoryIdentity) -> GraphSession<MemoryCatalog, MemoryIdentity> {
		let catalog = MemoryCatalog::default()
			.with_roles([Record::new(5, "Backend")])
			.with_grades(5, [Record::new(1, "Junior")])
			.with_skills(1, [Record::new(10, "Rust")]);
		let session = GraphSession::new(catalog, identity, "Acme");
		session.load_roles().await.unwrap();
		session
	}

	#[tokio::test]
	async fn mutations_require_a_user() {
		let session = session(MemoryIdentity::anonymous()).await;
		assert!(matches!(
			session.create_role("QA").await,
			Err(GraphError::Unauthenticated)
		));
		assert!(matches!(session.delete(&role()).await, Err(GraphError::Unauthenticated)));
		assert_eq!(session.catalog.calls("create_role"), 0);
		assert_eq!(session.catalog.calls("delete_entity"), 0);
	}

	#[tokio::test]
	async fn new_role_hangs_off_the_root() {
		let session = session(MemoryIdentity::signed_in([])).await;
		let id = session.create_role("QA").await.unwrap();
		let store = session.store();
		let node = store.find(&id).expect("role attached");
		assert_eq!(node.parent_id(), Some(&NodeId::root()));
		assert_eq!(node.name(), "QA");
	}

	#[tokio::test]
	async fn children_of_unexpanded_parents_wait_for_expansion() {
		let session = session(MemoryIdentity::signed_in([])).await;
		let id = session.create_grade("Senior", &role(), None).await.unwrap();
		assert!(session.store().find(&id).is_none());

		session.activate(&role()).await.unwrap();
		let id = session.create_grade("Lead", &role(), Some(&grade())).await.unwrap();
		assert!(session.store().find(&id).is_some());
		assert_eq!(session.catalog.grade_predecessors(), vec![None, Some(1)]);
	}

	#[tokio::test]
	async fn skills_and_positions_are_linked_to_their_grade() {
		let session = session(MemoryIdentity::signed_in([])).await;
		session.activate(&role()).await.unwrap();
		session.activate(&grade()).await.unwrap();

		let skill = session.create_skill("Tokio", &grade()).await.unwrap();
		let position = session.create_position("Reviewer", &grade()).await.unwrap();
		let duty = session.create_duty("Review", "Reads code", &position).await.unwrap();

		assert_eq!(
			session.catalog.links(),
			vec![
				("skill", 1, skill.backend_id().unwrap()),
				("position", 1, position.backend_id().unwrap()),
				("duty", position.backend_id().unwrap(), duty.backend_id().unwrap()),
			]
		);
		let store = session.store();
		assert_eq!(store.find(&skill).and_then(|node| node.parent_id()), Some(&grade()));
		assert!(store.find(&duty).is_none());
	}

	#[tokio::test]
	async fn wrong_parent_kind_is_rejected_before_any_call() {
		let session = session(MemoryIdentity::signed_in([])).await;
		let err = session.create_skill("Tokio", &role()).await.unwrap_err();
		assert!(matches!(err, GraphError::Invariant(_)));
		assert_eq!(session.catalog.calls("create_skill"), 0);
	}

	#[tokio::test]
	async fn deleting_a_grade_orphans_its_skills() {
		let session = session(MemoryIdentity::signed_in([])).await;
		session.activate(&role()).await.unwrap();
		session.activate(&grade()).await.unwrap();

		assert!(session.delete(&grade()).await.unwrap());
		assert_eq!(
			session.catalog.deleted(),
			vec![EntityPath::Scoped {
				parent_kind: NodeKind::Role,
				parent_id: 5,
				kind: NodeKind::Grade,
				id: 1,
			}]
		);

		let skill = NodeId::of(NodeKind::Skill, 10);
		let view = session.project(&crate::competence::FilterSet::new([NodeKind::Skill]));
		assert!(view.contains(&skill));
		assert!(!view.contains(&grade()));
		assert!(!view.edges.iter().any(|edge| edge.target == skill));
		assert_eq!(
			session.store().find(&skill).and_then(|node| node.parent_id()),
			Some(&grade())
		);
	}

	#[tokio::test]
	async fn root_and_unknown_nodes_are_not_deleted() {
		let session = session(MemoryIdentity::signed_in([])).await;
		assert!(matches!(
			session.delete(&NodeId::root()).await,
			Err(GraphError::Invariant(_))
		));
		assert!(!session.delete(&NodeId::of(NodeKind::Skill, 77)).await.unwrap());
		assert_eq!(session.catalog.calls("delete_entity"), 0);
	}
}
