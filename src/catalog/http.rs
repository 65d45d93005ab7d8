//! Catalog client for the competence REST API.

use async_trait::async_trait;
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{Catalog, CatalogError, CatalogResult, DutyRecord, EntityPath, Record};

/// Paginated envelope used by top-level listings.
#[derive(Debug, Deserialize)]
struct Page<T> {
	items: Vec<T>,
}

/// Network client for the catalog API.
///
/// Mutations carry the session token, if any, in `Authorization`.
pub struct HttpCatalog {
	base_url: String,
	token: Option<String>,
	client: Client,
}

impl HttpCatalog {
	/// `base_url` is the API root, e.g. `https://example.org/api`.
	pub fn new(base_url: &str, token: Option<String>) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			token,
			client: Client::new(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path)
	}

	fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
		match &self.token {
			Some(token) => request.header(AUTHORIZATION, token),
			None => request,
		}
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> CatalogResult<T> {
		let url = self.url(path);
		debug!("GET {url}");
		let response = self.client.get(&url).send().await?;
		Ok(checked(response, url)?.json().await?)
	}

	async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> CatalogResult<T> {
		let url = self.url(path);
		debug!("POST {url}");
		let request = self.authorized(self.client.post(&url).json(&body));
		Ok(checked(request.send().await?, url)?.json().await?)
	}

	/// POST whose response body is irrelevant.
	async fn post_unit(&self, path: &str, body: serde_json::Value) -> CatalogResult<()> {
		let url = self.url(path);
		debug!("POST {url}");
		let request = self.authorized(self.client.post(&url).json(&body));
		checked(request.send().await?, url)?;
		Ok(())
	}
}

/// Turns a non-success status into [`CatalogError::Status`].
pub(crate) fn checked(response: Response, url: String) -> CatalogResult<Response> {
	if response.status().is_success() {
		Ok(response)
	} else {
		Err(CatalogError::Status {
			url,
			status: response.status().as_u16(),
		})
	}
}

#[async_trait(?Send)]
impl Catalog for HttpCatalog {
	async fn list_roles(&self) -> CatalogResult<Vec<Record>> {
		let page: Page<Record> = self.get("roles").await?;
		Ok(page.items)
	}

	async fn list_grades_for_role(&self, role_id: u64) -> CatalogResult<Vec<Record>> {
		self.get(&format!("roles/{role_id}/grades")).await
	}

	async fn list_positions_for_grade(&self, grade_id: u64) -> CatalogResult<Vec<Record>> {
		self.get(&format!("grades/{grade_id}/positions")).await
	}

	async fn list_skills_for_grade(&self, grade_id: u64) -> CatalogResult<Vec<Record>> {
		self.get(&format!("grades/{grade_id}/skills")).await
	}

	async fn list_duties_for_position(&self, position_id: u64) -> CatalogResult<Vec<DutyRecord>> {
		self.get(&format!("positions/{position_id}/duties")).await
	}

	async fn list_sub_skills(&self, skill_id: u64) -> CatalogResult<Vec<Record>> {
		self.get(&format!("skills/{skill_id}/sub-skills")).await
	}

	async fn create_role(&self, title: &str) -> CatalogResult<u64> {
		self.post("roles", json!({ "title": title })).await
	}

	async fn create_grade(&self, role_id: u64, title: &str, previous_grade: Option<u64>) -> CatalogResult<u64> {
		let mut body = json!({ "title": title });
		if let Some(previous) = previous_grade {
			body["prevGradeId"] = json!(previous);
		}
		self.post(&format!("roles/{role_id}/grades"), body).await
	}

	async fn create_position(&self, title: &str) -> CatalogResult<u64> {
		self.post("positions", json!({ "title": title })).await
	}

	async fn create_skill(&self, title: &str) -> CatalogResult<u64> {
		self.post("skills", json!({ "title": title, "type": "Theoretical" })).await
	}

	async fn create_duty(&self, title: &str, description: &str) -> CatalogResult<u64> {
		self.post("duties", json!({ "title": title, "description": description }))
			.await
	}

	async fn link_position_to_grade(&self, grade_id: u64, position_id: u64) -> CatalogResult<()> {
		self.post_unit(
			&format!("grades/{grade_id}/positions"),
			json!({ "positionId": position_id }),
		)
		.await
	}

	async fn link_skill_to_grade(&self, grade_id: u64, skill_id: u64) -> CatalogResult<()> {
		self.post_unit(&format!("grades/{grade_id}/skills"), json!({ "skillId": skill_id }))
			.await
	}

	async fn link_duty_to_position(&self, position_id: u64, duty_id: u64) -> CatalogResult<()> {
		self.post_unit(
			&format!("positions/{position_id}/duties"),
			json!({ "dutyId": duty_id }),
		)
		.await
	}

	async fn delete_entity(&self, path: &EntityPath) -> CatalogResult<()> {
		let url = self.url(&path.url_path());
		debug!("DELETE {url}");
		let request = self.authorized(self.client.delete(&url));
		checked(request.send().await?, url)?;
		Ok(())
	}
}
