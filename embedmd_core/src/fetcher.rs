use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::EmbedError;
use crate::EmbedResult;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source of the content referenced by directives.
///
/// `base_dir` is the directory of the document being processed and is used
/// to resolve relative references. Absolute paths and URLs ignore it.
pub trait Fetcher {
	fn fetch(&self, base_dir: &Path, reference: &str) -> EmbedResult<Vec<u8>>;
}

/// Settings for [`ContentFetcher`], fixed at construction time.
#[derive(Debug, Clone)]
pub struct FetchOptions {
	/// Global timeout for a single HTTP request.
	pub timeout: Duration,
	/// Bearer token attached to HTTP requests.
	pub token: Option<String>,
	/// When false, URL references fail instead of being fetched.
	pub allow_remote: bool,
}

impl Default for FetchOptions {
	fn default() -> Self {
		Self {
			timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
			token: None,
			allow_remote: true,
		}
	}
}

/// Fetches references from the local filesystem, or over HTTP for references
/// starting with `http://` or `https://`.
pub struct ContentFetcher {
	agent: Agent,
	token: Option<String>,
	allow_remote: bool,
}

impl ContentFetcher {
	pub fn new(options: FetchOptions) -> Self {
		let agent = Agent::config_builder()
			.timeout_global(Some(options.timeout))
			.http_status_as_error(false)
			.build()
			.into();

		Self {
			agent,
			token: options.token,
			allow_remote: options.allow_remote,
		}
	}

	fn fetch_url(&self, url: &str) -> EmbedResult<Vec<u8>> {
		if !self.allow_remote {
			return Err(fetch_error(url, "remote references are disabled"));
		}

		debug!(url, authorized = self.token.is_some(), "fetching remote content");

		let mut request = self.agent.get(url);
		if let Some(token) = &self.token {
			request = request.header("Authorization", &format!("Bearer {token}"));
		}

		let response = request.call().map_err(|e| fetch_error(url, e))?;
		let status = response.status();

		if status != ureq::http::StatusCode::OK {
			return Err(fetch_error(url, format!("status {status}")));
		}

		response
			.into_body()
			.read_to_vec()
			.map_err(|e| fetch_error(url, e))
	}

	fn fetch_file(base_dir: &Path, reference: &str) -> EmbedResult<Vec<u8>> {
		let path = resolve_path(base_dir, reference);
		debug!(path = %path.display(), "reading local content");

		std::fs::read(&path).map_err(|e| fetch_error(reference, e))
	}
}

impl Default for ContentFetcher {
	fn default() -> Self {
		Self::new(FetchOptions::default())
	}
}

impl Fetcher for ContentFetcher {
	fn fetch(&self, base_dir: &Path, reference: &str) -> EmbedResult<Vec<u8>> {
		if is_url(reference) {
			self.fetch_url(reference)
		} else {
			Self::fetch_file(base_dir, reference)
		}
	}
}

pub fn is_url(reference: &str) -> bool {
	reference.starts_with("http://") || reference.starts_with("https://")
}

/// Resolve a forward-slash reference against `base_dir`. Absolute paths are
/// returned unchanged.
pub fn resolve_path(base_dir: &Path, reference: &str) -> PathBuf {
	let path = Path::new(reference);
	if path.is_absolute() {
		return path.to_path_buf();
	}

	reference
		.split('/')
		.filter(|segment| !segment.is_empty())
		.fold(base_dir.to_path_buf(), |path, segment| path.join(segment))
}

fn fetch_error(reference: &str, reason: impl std::fmt::Display) -> EmbedError {
	EmbedError::Fetch {
		reference: reference.to_string(),
		reason: reason.to_string(),
	}
}
