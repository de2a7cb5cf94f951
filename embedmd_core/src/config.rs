use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::EmbedError;
use crate::EmbedResult;
use crate::FetchOptions;
use crate::LanguageTable;
use crate::RewriteOptions;
use crate::fetcher::DEFAULT_TIMEOUT_SECS;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["embedmd.toml", ".embedmd.toml", ".config/embedmd.toml"];

/// Environment variable consulted for the HTTP bearer token by default.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Configuration loaded from an `embedmd.toml` file.
///
/// ```toml
/// legacy_fences = false
///
/// [fetch]
/// timeout_secs = 30
/// token_env = "GITHUB_TOKEN"
/// allow_remote = true
///
/// [languages]
/// tmpl = "html"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct EmbedConfig {
	/// Remote fetching configuration.
	#[serde(default)]
	pub fetch: FetchConfig,
	/// Extension to fence language overrides, consulted before the built-in
	/// table.
	#[serde(default)]
	pub languages: HashMap<String, String>,
	/// When true, a bare fenced code block directly after a directive is
	/// treated as previously generated output and replaced. This matches the
	/// output of older versions that did not write markers.
	#[serde(default)]
	pub legacy_fences: bool,
}

/// The `[fetch]` section.
#[derive(Debug, Deserialize)]
pub struct FetchConfig {
	/// Timeout in seconds for each HTTP request.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	/// Name of the environment variable holding a bearer token for HTTP
	/// requests. Set to an empty string to never send a token.
	#[serde(default = "default_token_env")]
	pub token_env: String,
	/// Whether `http://` and `https://` references may be fetched.
	#[serde(default = "default_allow_remote")]
	pub allow_remote: bool,
}

impl Default for FetchConfig {
	fn default() -> Self {
		Self {
			timeout_secs: DEFAULT_TIMEOUT_SECS,
			token_env: DEFAULT_TOKEN_ENV.to_string(),
			allow_remote: true,
		}
	}
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

fn default_token_env() -> String {
	DEFAULT_TOKEN_ENV.to_string()
}

fn default_allow_remote() -> bool {
	true
}

impl EmbedConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> EmbedResult<Option<EmbedConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config from an explicit path.
	pub fn load_file(path: &Path) -> EmbedResult<EmbedConfig> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml(&content)
	}

	pub fn from_toml(content: &str) -> EmbedResult<EmbedConfig> {
		toml::from_str(content).map_err(|e| EmbedError::ConfigParse(e.to_string()))
	}

	/// Options for the document rewriter.
	pub fn rewrite_options(&self) -> RewriteOptions {
		RewriteOptions {
			languages: LanguageTable::with_overrides(self.languages.clone()),
			legacy_fences: self.legacy_fences,
		}
	}

	/// Options for the content fetcher. `token` is the value of the variable
	/// named by [`FetchConfig::token_env`], looked up by the caller.
	pub fn fetch_options(&self, token: Option<String>) -> FetchOptions {
		FetchOptions {
			timeout: Duration::from_secs(self.fetch.timeout_secs),
			token: token.filter(|token| !token.is_empty()),
			allow_remote: self.fetch.allow_remote,
		}
	}
}
