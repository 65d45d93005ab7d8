//! Turns a node activation into catalog fetches and graph growth.
//!
//! | kind            | fetch                         | effect                      |
//! |-----------------|-------------------------------|-----------------------------|
//! | main            | none                          | ignored                     |
//! | role            | grades of the role            | grades appended, expanded   |
//! | grade           | positions and skills, joined  | both appended, expanded     |
//! | skill           | sub-skills                    | detail panel                |
//! | position        | duties                        | detail panel                |
//! | duty, subskill  | none                          | ignored                     |

use log::{debug, warn};

use super::node::{Node, NodeId, NodeKind};
use super::session::GraphSession;
use crate::catalog::{Catalog, CatalogError, Record};
use crate::error::GraphResult;
use crate::identity::Identity;

/// What an activation did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
	/// Nothing to do: leaf kind, unknown node, already expanded, or a result
	/// that arrived after the session was reset or the node deleted.
	Ignored,
	/// Children were fetched and the node is expanded.
	Expanded {
		/// Nodes new to the store.
		appended: usize,
	},
	/// Informational payload for the detail panel.
	Details(DetailPanel),
}

/// Informational drill-down shown beside the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailPanel {
	/// The activated node.
	pub node_id: NodeId,
	/// Its display name.
	pub node_name: String,
	/// `Skill` or `Position`.
	pub kind: NodeKind,
	/// Sub-skills of a skill, duties of a position.
	pub entries: Vec<DetailEntry>,
}

/// One line of a [`DetailPanel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailEntry {
	/// Node id of a sub-skill. Duties have none.
	pub id: Option<NodeId>,
	/// Title.
	pub name: String,
	/// Duty description.
	pub description: Option<String>,
}

fn children(kind: NodeKind, records: Vec<Record>, parent: &NodeId) -> impl Iterator<Item = Node> {
	records
		.into_iter()
		.map(move |record| Node::child(kind, record.id, record.title, parent))
}

impl<C: Catalog, I: Identity> GraphSession<C, I> {
	/// Fetches every role and hangs it off the root. Runs once per session.
	pub async fn load_roles(&self) -> GraphResult<usize> {
		let root = NodeId::root();
		let Some(epoch) = self.begin_expansion(&root) else {
			return Ok(0);
		};
		let result = self.catalog.list_roles().await;
		if !self.finish_fetch(&root, epoch) {
			return Ok(0);
		}
		let roles = result.inspect_err(|err| warn!("loading roles failed: {err}"))?;

		let mut store = self.store.borrow_mut();
		let appended = store.merge(children(NodeKind::Role, roles, &root));
		store.mark_expanded(&root);
		debug!("loaded {appended} roles");
		Ok(appended)
	}

	/// Reacts to the user activating `id` in the graph.
	pub async fn activate(&self, id: &NodeId) -> GraphResult<Activation> {
		let Some((kind, name)) = self
			.store
			.borrow()
			.find(id)
			.map(|node| (node.kind(), node.name().to_string()))
		else {
			debug!("activation of unknown node {id} ignored");
			return Ok(Activation::Ignored);
		};
		let backend_id = match (kind, id.backend_id()) {
			(NodeKind::Main | NodeKind::Duty | NodeKind::SubSkill, _) | (_, None) => {
				return Ok(Activation::Ignored);
			}
			(_, Some(backend_id)) => backend_id,
		};

		match kind {
			NodeKind::Role => self.expand_role(id, backend_id).await,
			NodeKind::Grade => self.expand_grade(id, backend_id).await,
			NodeKind::Skill => self.skill_details(id, backend_id, name).await,
			NodeKind::Position => self.position_details(id, backend_id, name).await,
			NodeKind::Main | NodeKind::Duty | NodeKind::SubSkill => Ok(Activation::Ignored),
		}
	}

	async fn expand_role(&self, id: &NodeId, role_id: u64) -> GraphResult<Activation> {
		let Some(epoch) = self.begin_expansion(id) else {
			return Ok(Activation::Ignored);
		};
		let result = self.catalog.list_grades_for_role(role_id).await;
		if !self.finish_fetch(id, epoch) {
			return Ok(Activation::Ignored);
		}
		let grades = result.inspect_err(|err| warn!("expanding {id} failed: {err}"))?;

		let mut store = self.store.borrow_mut();
		let appended = store.merge(children(NodeKind::Grade, grades, id));
		store.mark_expanded(id);
		debug!("expanded {id}: {appended} grades");
		Ok(Activation::Expanded { appended })
	}

	/// Positions and skills are fetched together and merged in one step once
	/// both have settled. A list that did arrive is kept even if the other
	/// failed; the grade then stays unexpanded so a retry fetches again.
	async fn expand_grade(&self, id: &NodeId, grade_id: u64) -> GraphResult<Activation> {
		let Some(epoch) = self.begin_expansion(id) else {
			return Ok(Activation::Ignored);
		};
		let (positions, skills) = futures::join!(
			self.catalog.list_positions_for_grade(grade_id),
			self.catalog.list_skills_for_grade(grade_id)
		);
		if !self.finish_fetch(id, epoch) {
			return Ok(Activation::Ignored);
		}

		let mut appended = 0;
		let mut failure: Option<CatalogError> = None;
		{
			let mut store = self.store.borrow_mut();
			for (kind, result) in [(NodeKind::Position, positions), (NodeKind::Skill, skills)] {
				match result {
					Ok(records) => {
						store.link(id, records.iter().map(|record| NodeId::of(kind, record.id)));
						appended += store.merge(children(kind, records, id));
					}
					Err(err) => {
						warn!("fetching {kind}s of {id} failed: {err}");
						if failure.is_none() {
							failure = Some(err);
						}
					}
				}
			}
			if failure.is_none() {
				store.mark_expanded(id);
			}
		}

		if self.user().is_some() {
			self.refresh_coverage(id);
		}
		debug!("expanded {id}: {appended} nodes");
		match failure {
			Some(err) => Err(err.into()),
			None => Ok(Activation::Expanded { appended }),
		}
	}

	async fn skill_details(&self, id: &NodeId, skill_id: u64, name: String) -> GraphResult<Activation> {
		let sub_skills = self
			.catalog
			.list_sub_skills(skill_id)
			.await
			.inspect_err(|err| warn!("sub-skills of {id} failed: {err}"))?;
		Ok(Activation::Details(DetailPanel {
			node_id: id.clone(),
			node_name: name,
			kind: NodeKind::Skill,
			entries: sub_skills
				.into_iter()
				.map(|record| DetailEntry {
					id: Some(NodeId::of(NodeKind::SubSkill, record.id)),
					name: record.title,
					description: None,
				})
				.collect(),
		}))
	}

	async fn position_details(&self, id: &NodeId, position_id: u64, name: String) -> GraphResult<Activation> {
		let duties = self
			.catalog
			.list_duties_for_position(position_id)
			.await
			.inspect_err(|err| warn!("duties of {id} failed: {err}"))?;
		Ok(Activation::Details(DetailPanel {
			node_id: id.clone(),
			node_name: name,
			kind: NodeKind::Position,
			entries: duties
				.into_iter()
				.map(|duty| DetailEntry {
					id: None,
					name: duty.title,
					description: duty.description,
				})
				.collect(),
		}))
	}

	/// Guard in front of every growing fetch. Returns the epoch to check the
	/// result against, or `None` when the node is expanded or already being
	/// fetched.
	fn begin_expansion(&self, id: &NodeId) -> Option<u64> {
		let mut store = self.store.borrow_mut();
		if store.is_expanded(id) || !store.begin_fetch(id) {
			debug!("{id} already expanded or in flight");
			return None;
		}
		Some(store.epoch())
	}

	/// `false` when the session was reset, or `id` deleted, while the fetch
	/// was pending.
	fn finish_fetch(&self, id: &NodeId, epoch: u64) -> bool {
		if self.is_stale(epoch) {
			debug!("dropping result for {id} from a previous session");
			return false;
		}
		let mut store = self.store.borrow_mut();
		store.end_fetch(id);
		if store.find(id).is_none() {
			debug!("dropping result for deleted {id}");
			return false;
		}
		true
	}
}
