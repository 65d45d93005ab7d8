//! Build-time configuration.

use log::Level;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_ORGANIZATION: &str = "Organization";

/// Settings baked in at compile time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
	/// Root of the catalog REST API.
	pub api_url: String,
	/// Label of the root node.
	pub organization: String,
	/// Console log level.
	pub log_level: Level,
	/// Local storage key holding the signed-in user as JSON.
	pub user_storage_key: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_string(),
			organization: DEFAULT_ORGANIZATION.to_string(),
			log_level: Level::Info,
			user_storage_key: "user".to_string(),
		}
	}
}

impl Config {
	/// Reads `COMPETENCE_API_URL`, `COMPETENCE_ORGANIZATION` and
	/// `COMPETENCE_LOG` as set when the crate was compiled.
	pub fn from_env() -> Self {
		Self::from_values(
			option_env!("COMPETENCE_API_URL"),
			option_env!("COMPETENCE_ORGANIZATION"),
			option_env!("COMPETENCE_LOG"),
		)
	}

	fn from_values(api_url: Option<&str>, organization: Option<&str>, log_level: Option<&str>) -> Self {
		let defaults = Self::default();
		Self {
			api_url: api_url.map_or(defaults.api_url, str::to_string),
			organization: organization.map_or(defaults.organization, str::to_string),
			log_level: log_level
				.and_then(|level| level.parse().ok())
				.unwrap_or(defaults.log_level),
			user_storage_key: defaults.user_storage_key,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unset_values_fall_back_to_defaults() {
		assert_eq!(Config::from_values(None, None, None), Config::default());
	}

	#[test]
	fn values_override_defaults() {
		let config = Config::from_values(Some("https://hr.example.org/api"), Some("Acme"), Some("debug"));
		assert_eq!(config.api_url, "https://hr.example.org/api");
		assert_eq!(config.organization, "Acme");
		assert_eq!(config.log_level, Level::Debug);
	}

	#[test]
	fn unknown_log_level_is_ignored() {
		let config = Config::from_values(None, None, Some("chatty"));
		assert_eq!(config.log_level, Level::Info);
	}
}
