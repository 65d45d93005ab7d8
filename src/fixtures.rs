//! In-memory catalog and identity for tests.
//!
//! The catalog counts calls per method, can be told to fail individual
//! methods, and can yield once before answering so tests can interleave
//! other work with a pending fetch.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::catalog::{Catalog, CatalogError, CatalogResult, DutyRecord, EntityPath, Record};
use crate::competence::NodeId;
use crate::identity::{Identity, User};

pub struct MemoryCatalog {
	roles: Vec<Record>,
	grades: HashMap<u64, Vec<Record>>,
	positions: HashMap<u64, Vec<Record>>,
	skills: HashMap<u64, Vec<Record>>,
	duties: HashMap<u64, Vec<DutyRecord>>,
	sub_skills: HashMap<u64, Vec<Record>>,
	calls: RefCell<HashMap<&'static str, usize>>,
	failing: RefCell<HashSet<&'static str>>,
	slow: Cell<bool>,
	next_id: Cell<u64>,
	grade_predecessors: RefCell<Vec<Option<u64>>>,
	links: RefCell<Vec<(&'static str, u64, u64)>>,
	deleted: RefCell<Vec<EntityPath>>,
}

impl Default for MemoryCatalog {
	fn default() -> Self {
		Self {
			roles: Vec::new(),
			grades: HashMap::new(),
			positions: HashMap::new(),
			skills: HashMap::new(),
			duties: HashMap::new(),
			sub_skills: HashMap::new(),
			calls: RefCell::new(HashMap::new()),
			failing: RefCell::new(HashSet::new()),
			slow: Cell::new(false),
			next_id: Cell::new(100),
			grade_predecessors: RefCell::new(Vec::new()),
			links: RefCell::new(Vec::new()),
			deleted: RefCell::new(Vec::new()),
		}
	}
}

impl MemoryCatalog {
	pub fn with_roles(mut self, roles: impl IntoIterator<Item = Record>) -> Self {
		self.roles.extend(roles);
		self
	}

	pub fn with_grades(mut self, role: u64, grades: impl IntoIterator<Item = Record>) -> Self {
		self.grades.entry(role).or_default().extend(grades);
		self
	}

	pub fn with_positions(mut self, grade: u64, positions: impl IntoIterator<Item = Record>) -> Self {
		self.positions.entry(grade).or_default().extend(positions);
		self
	}

	pub fn with_skills(mut self, grade: u64, skills: impl IntoIterator<Item = Record>) -> Self {
		self.skills.entry(grade).or_default().extend(skills);
		self
	}

	pub fn with_duties(mut self, position: u64, duties: impl IntoIterator<Item = DutyRecord>) -> Self {
		self.duties.entry(position).or_default().extend(duties);
		self
	}

	pub fn with_sub_skills(mut self, skill: u64, sub_skills: impl IntoIterator<Item = Record>) -> Self {
		self.sub_skills.entry(skill).or_default().extend(sub_skills);
		self
	}

	pub fn calls(&self, method: &str) -> usize {
		self.calls.borrow().get(method).copied().unwrap_or(0)
	}

	pub fn total_calls(&self) -> usize {
		self.calls.borrow().values().sum()
	}

	pub fn fail(&self, method: &'static str) {
		self.failing.borrow_mut().insert(method);
	}

	pub fn heal(&self, method: &'static str) {
		self.failing.borrow_mut().remove(method);
	}

	/// Every call yields once before answering.
	pub fn set_slow(&self, slow: bool) {
		self.slow.set(slow);
	}

	pub fn grade_predecessors(&self) -> Vec<Option<u64>> {
		self.grade_predecessors.borrow().clone()
	}

	pub fn links(&self) -> Vec<(&'static str, u64, u64)> {
		self.links.borrow().clone()
	}

	pub fn deleted(&self) -> Vec<EntityPath> {
		self.deleted.borrow().clone()
	}

	async fn enter(&self, method: &'static str) -> CatalogResult<()> {
		*self.calls.borrow_mut().entry(method).or_default() += 1;
		if self.slow.get() {
			tokio::task::yield_now().await;
		}
		if self.failing.borrow().contains(method) {
			return Err(CatalogError::Unavailable(method.to_string()));
		}
		Ok(())
	}

	fn allocate(&self) -> u64 {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		id
	}
}

fn listed<T: Clone>(map: &HashMap<u64, Vec<T>>, key: u64) -> Vec<T> {
	map.get(&key).cloned().unwrap_or_default()
}

#[async_trait(?Send)]
impl Catalog for MemoryCatalog {
	async fn list_roles(&self) -> CatalogResult<Vec<Record>> {
		self.enter("list_roles").await?;
		Ok(self.roles.clone())
	}

	async fn list_grades_for_role(&self, role_id: u64) -> CatalogResult<Vec<Record>> {
		self.enter("list_grades_for_role").await?;
		Ok(listed(&self.grades, role_id))
	}

	async fn list_positions_for_grade(&self, grade_id: u64) -> CatalogResult<Vec<Record>> {
		self.enter("list_positions_for_grade").await?;
		Ok(listed(&self.positions, grade_id))
	}

	async fn list_skills_for_grade(&self, grade_id: u64) -> CatalogResult<Vec<Record>> {
		self.enter("list_skills_for_grade").await?;
		Ok(listed(&self.skills, grade_id))
	}

	async fn list_duties_for_position(&self, position_id: u64) -> CatalogResult<Vec<DutyRecord>> {
		self.enter("list_duties_for_position").await?;
		Ok(listed(&self.duties, position_id))
	}

	async fn list_sub_skills(&self, skill_id: u64) -> CatalogResult<Vec<Record>> {
		self.enter("list_sub_skills").await?;
		Ok(listed(&self.sub_skills, skill_id))
	}

	async fn create_role(&self, _title: &str) -> CatalogResult<u64> {
		self.enter("create_role").await?;
		Ok(self.allocate())
	}

	async fn create_grade(&self, _role_id: u64, _title: &str, previous_grade: Option<u64>) -> CatalogResult<u64> {
		self.enter("create_grade").await?;
		self.grade_predecessors.borrow_mut().push(previous_grade);
		Ok(self.allocate())
	}

	async fn create_position(&self, _title: &str) -> CatalogResult<u64> {
		self.enter("create_position").await?;
		Ok(self.allocate())
	}

	async fn create_skill(&self, _title: &str) -> CatalogResult<u64> {
		self.enter("create_skill").await?;
		Ok(self.allocate())
	}

	async fn create_duty(&self, _title: &str, _description: &str) -> CatalogResult<u64> {
		self.enter("create_duty").await?;
		Ok(self.allocate())
	}

	async fn link_position_to_grade(&self, grade_id: u64, position_id: u64) -> CatalogResult<()> {
		self.enter("link_position_to_grade").await?;
		self.links.borrow_mut().push(("position", grade_id, position_id));
		Ok(())
	}

	async fn link_skill_to_grade(&self, grade_id: u64, skill_id: u64) -> CatalogResult<()> {
		self.enter("link_skill_to_grade").await?;
		self.links.borrow_mut().push(("skill", grade_id, skill_id));
		Ok(())
	}

	async fn link_duty_to_position(&self, position_id: u64, duty_id: u64) -> CatalogResult<()> {
		self.enter("link_duty_to_position").await?;
		self.links.borrow_mut().push(("duty", position_id, duty_id));
		Ok(())
	}

	async fn delete_entity(&self, path: &EntityPath) -> CatalogResult<()> {
		self.enter("delete_entity").await?;
		self.deleted.borrow_mut().push(path.clone());
		Ok(())
	}
}

pub struct MemoryIdentity {
	user: Option<User>,
	owned: HashSet<NodeId>,
	failing: Cell<bool>,
	recorded: RefCell<Vec<u64>>,
}

impl MemoryIdentity {
	pub fn anonymous() -> Self {
		Self {
			user: None,
			owned: HashSet::new(),
			failing: Cell::new(false),
			recorded: RefCell::new(Vec::new()),
		}
	}

	pub fn signed_in(owned: impl IntoIterator<Item = NodeId>) -> Self {
		Self {
			user: Some(User {
				id: 1,
				name: "Ann".to_string(),
				token: Some("token".to_string()),
			}),
			owned: owned.into_iter().collect(),
			..Self::anonymous()
		}
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.set(failing);
	}

	/// Backend ids passed to `record_skill_ownership`, in order.
	pub fn recorded(&self) -> Vec<u64> {
		self.recorded.borrow().clone()
	}
}

#[async_trait(?Send)]
impl Identity for MemoryIdentity {
	fn current_user(&self) -> Option<User> {
		self.user.clone()
	}

	async fn owned_skill_ids(&self) -> CatalogResult<HashSet<NodeId>> {
		Ok(self.owned.clone())
	}

	async fn record_skill_ownership(&self, skill_id: u64) -> CatalogResult<Record> {
		if self.failing.get() {
			return Err(CatalogError::Unavailable("identity".to_string()));
		}
		self.recorded.borrow_mut().push(skill_id);
		Ok(Record::new(skill_id, format!("skill {skill_id}")))
	}
}
