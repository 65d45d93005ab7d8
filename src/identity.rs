//! Signed-in user and the skills they own.

use std::collections::HashSet;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::catalog::http::checked;
use crate::catalog::{CatalogError, CatalogResult, Record};
use crate::competence::{NodeId, NodeKind};

/// The signed-in user as stored by the sign-in page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Catalog user id.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Session token sent in `Authorization`.
	#[serde(default)]
	pub token: Option<String>,
}

/// Session collaborator. Authentication itself happens elsewhere; this only
/// reports who is signed in and records their skill choices.
#[async_trait(?Send)]
pub trait Identity {
	/// `None` when nobody is signed in.
	fn current_user(&self) -> Option<User>;

	/// Node ids (`skill:<id>`) of the skills the user already owns.
	async fn owned_skill_ids(&self) -> CatalogResult<HashSet<NodeId>>;

	/// Records that the user owns `skill_id` and returns the stored skill.
	async fn record_skill_ownership(&self, skill_id: u64) -> CatalogResult<Record>;
}

/// Identity backed by the browser's local storage and the users API.
pub struct BrowserIdentity {
	base_url: String,
	user: Option<User>,
	client: Client,
}

impl BrowserIdentity {
	/// Reads the user stored under `storage_key` as JSON, if any.
	pub fn load(base_url: &str, storage_key: &str) -> Self {
		let user = web_sys::window()
			.and_then(|window| window.local_storage().ok().flatten())
			.and_then(|storage| storage.get_item(storage_key).ok().flatten())
			.and_then(|raw| match serde_json::from_str::<User>(&raw) {
				Ok(user) => Some(user),
				Err(err) => {
					warn!("ignoring malformed stored user: {err}");
					None
				}
			});
		debug!("signed in as {:?}", user.as_ref().map(|user| &user.name));
		Self::with_user(base_url, user)
	}

	/// Identity for a known `user`, or an anonymous one.
	pub fn with_user(base_url: &str, user: Option<User>) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			user,
			client: Client::new(),
		}
	}

	fn skills_url(&self, user: &User) -> String {
		format!("{}/users/{}/skills", self.base_url, user.id)
	}

	fn signed_in(&self) -> CatalogResult<&User> {
		self.user
			.as_ref()
			.ok_or_else(|| CatalogError::Unavailable("no signed-in user".to_string()))
	}
}

#[async_trait(?Send)]
impl Identity for BrowserIdentity {
	fn current_user(&self) -> Option<User> {
		self.user.clone()
	}

	async fn owned_skill_ids(&self) -> CatalogResult<HashSet<NodeId>> {
		let Some(user) = &self.user else {
			return Ok(HashSet::new());
		};
		let url = self.skills_url(user);
		debug!("GET {url}");
		let response = self.client.get(&url).send().await?;
		let skills: Vec<Record> = checked(response, url)?.json().await?;
		Ok(skills
			.into_iter()
			.map(|skill| NodeId::of(NodeKind::Skill, skill.id))
			.collect())
	}

	async fn record_skill_ownership(&self, skill_id: u64) -> CatalogResult<Record> {
		let user = self.signed_in()?;
		let url = self.skills_url(user);
		debug!("POST {url}");
		let mut request = self.client.post(&url).json(&json!({ "skillId": skill_id }));
		if let Some(token) = &user.token {
			request = request.header(AUTHORIZATION, token);
		}
		Ok(checked(request.send().await?, url)?.json().await?)
	}
}
