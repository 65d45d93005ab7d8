use std::cell::{Ref, RefCell};
use std::collections::HashSet;

use log::info;

use super::node::NodeId;
use super::project::{FilterSet, Projection, project};
use super::store::GraphStore;
use crate::catalog::Catalog;
use crate::error::{GraphError, GraphResult};
use crate::identity::{Identity, User};

/// One visit to the graph view: the store plus the collaborators that feed it.
///
/// Shared as `Rc<GraphSession<_, _>>` on the single-threaded UI runtime. The
/// store is only borrowed between awaits, never across one.
pub struct GraphSession<C, I> {
	pub(crate) catalog: C,
	pub(crate) identity: I,
	pub(crate) store: RefCell<GraphStore>,
	pub(crate) owned: RefCell<HashSet<NodeId>>,
}

impl<C: Catalog, I: Identity> GraphSession<C, I> {
	/// A fresh session whose root is labelled `organization`.
	pub fn new(catalog: C, identity: I, organization: impl Into<String>) -> Self {
		Self {
			catalog,
			identity,
			store: RefCell::new(GraphStore::new(organization)),
			owned: RefCell::new(HashSet::new()),
		}
	}

	/// Read access for callers that need more than a projection.
	pub fn store(&self) -> Ref<'_, GraphStore> {
		self.store.borrow()
	}

	/// The signed-in user, if any.
	pub fn user(&self) -> Option<User> {
		self.identity.current_user()
	}

	/// Whether the user owns `skill`.
	pub fn is_owned(&self, skill: &NodeId) -> bool {
		self.owned.borrow().contains(skill)
	}

	/// Current view for `filters`, styled for the signed-in user if any.
	pub fn project(&self, filters: &FilterSet) -> Projection {
		let store = self.store.borrow();
		if self.user().is_some() {
			project(&store, filters, Some(&self.owned.borrow()))
		} else {
			project(&store, filters, None)
		}
	}

	/// Ends the session: only the root stays and pending fetches go stale.
	pub fn reset(&self) {
		self.store.borrow_mut().reset();
		info!("graph session reset");
	}

	pub(crate) fn require_user(&self) -> GraphResult<User> {
		self.user().ok_or(GraphError::Unauthenticated)
	}

	pub(crate) fn epoch(&self) -> u64 {
		self.store.borrow().epoch()
	}

	pub(crate) fn is_stale(&self, epoch: u64) -> bool {
		self.epoch() != epoch
	}
}
