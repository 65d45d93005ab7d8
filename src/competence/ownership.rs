use std::collections::HashSet;

use log::{debug, info, warn};

use super::node::{NodeId, NodeKind};
use super::session::GraphSession;
use super::store::GraphStore;
use crate::catalog::Catalog;
use crate::error::GraphResult;
use crate::identity::Identity;

/// What marking a skill did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
	/// Unknown node or not a skill. Nothing was recorded.
	Ignored,
	/// The skill is owned now.
	Owned {
		/// Whether some grade listing the skill is covered afterwards.
		grade_covered: bool,
	},
}

/// `true` when `grade` has at least one skill and every one is owned.
/// Skills the grade shares with another grade count for both.
/// Evaluated from scratch on each call.
pub fn is_fully_owned(store: &GraphStore, owned: &HashSet<NodeId>, grade: &NodeId) -> bool {
	let skills = store.members(grade, NodeKind::Skill);
	!skills.is_empty() && skills.iter().all(|skill| owned.contains(skill.id()))
}

impl<C: Catalog, I: Identity> GraphSession<C, I> {
	/// Loads the skills the signed-in user already owns. Anonymous sessions
	/// keep an empty set.
	pub async fn load_ownership(&self) -> GraphResult<usize> {
		if self.user().is_none() {
			return Ok(0);
		}
		let owned = self
			.identity
			.owned_skill_ids()
			.await
			.inspect_err(|err| warn!("loading owned skills failed: {err}"))?;
		let count = owned.len();
		self.owned.borrow_mut().extend(owned);
		info!("user owns {count} skills");
		Ok(count)
	}

	/// Records that the user owns `skill`, then re-checks every grade that
	/// lists it.
	pub async fn mark_skill(&self, skill: &NodeId) -> GraphResult<MarkOutcome> {
		self.require_user()?;
		let is_skill = self
			.store
			.borrow()
			.find(skill)
			.is_some_and(|node| node.kind() == NodeKind::Skill);
		let Some(skill_id) = skill.backend_id().filter(|_| is_skill) else {
			debug!("mark of {skill} ignored");
			return Ok(MarkOutcome::Ignored);
		};

		if !self.is_owned(skill) {
			let record = self
				.identity
				.record_skill_ownership(skill_id)
				.await
				.inspect_err(|err| warn!("recording {skill} failed: {err}"))?;
			self.owned
				.borrow_mut()
				.insert(NodeId::of(NodeKind::Skill, record.id));
			info!("skill {} marked as owned", record.title);
		}

		let grades = self.store.borrow().owners_of(skill);
		let mut grade_covered = false;
		for grade in &grades {
			grade_covered |= self.refresh_coverage(grade);
		}
		Ok(MarkOutcome::Owned { grade_covered })
	}

	/// Covers `grade` when all its skills are owned. Returns whether the
	/// grade is covered afterwards; an already covered grade stays covered.
	pub(crate) fn refresh_coverage(&self, grade: &NodeId) -> bool {
		let mut store = self.store.borrow_mut();
		if store.is_covered(grade) {
			return true;
		}
		if is_fully_owned(&store, &self.owned.borrow(), grade) {
			store.cover(grade);
			debug!("{grade} fully covered");
			return true;
		}
		false
	}
}
