use std::path::Path;
use std::path::PathBuf;

use ignore::WalkBuilder;
use similar::TextDiff;
use tracing::debug;

use crate::EmbedResult;
use crate::Fetcher;
use crate::RewriteOptions;
use crate::rewrite;

/// Markdown file extensions picked up when a directory is given.
pub const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Label used in diffs for a document read from standard input.
pub const STDIN_LABEL: &str = "<stdin>";

/// The original and rewritten text of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpdate {
	/// Where the document was read from. `None` for standard input.
	pub path: Option<PathBuf>,
	pub original: String,
	pub updated: String,
}

impl DocumentUpdate {
	/// Returns true when rewriting changed the document.
	pub fn has_changes(&self) -> bool {
		self.original != self.updated
	}

	/// Display name of the document.
	pub fn name(&self) -> String {
		self.path
			.as_ref()
			.map_or_else(|| STDIN_LABEL.to_string(), |path| path.display().to_string())
	}

	/// A unified diff from the original to the updated text. Empty when
	/// nothing changed.
	pub fn unified_diff(&self) -> String {
		if !self.has_changes() {
			return String::new();
		}

		let name = self.name();
		TextDiff::from_lines(&self.original, &self.updated)
			.unified_diff()
			.context_radius(3)
			.header(&format!("a/{name}"), &format!("b/{name}"))
			.to_string()
	}

	/// Persist the updated text when it differs from the original. Returns
	/// whether the file was written.
	pub fn write(&self) -> EmbedResult<bool> {
		let Some(path) = &self.path else {
			return Ok(false);
		};

		if !self.has_changes() {
			return Ok(false);
		}

		std::fs::write(path, &self.updated)?;
		Ok(true)
	}
}

/// Rewrite a document held in memory. Relative references resolve against
/// `base_dir`.
pub fn process_str(
	text: impl Into<String>,
	base_dir: &Path,
	fetcher: &dyn Fetcher,
	options: &RewriteOptions,
) -> EmbedResult<DocumentUpdate> {
	let original = text.into();
	let updated = rewrite(&original, base_dir, fetcher, options)?;

	Ok(DocumentUpdate {
		path: None,
		original,
		updated,
	})
}

/// Read and rewrite the document at `path`. Relative references resolve
/// against the document's own directory.
pub fn process_file(
	path: &Path,
	fetcher: &dyn Fetcher,
	options: &RewriteOptions,
) -> EmbedResult<DocumentUpdate> {
	debug!(path = %path.display(), "processing document");

	let original = std::fs::read_to_string(path)?;
	let base_dir = path
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."));

	let mut update = process_str(original, base_dir, fetcher, options)?;
	update.path = Some(path.to_path_buf());
	Ok(update)
}

/// Expand directories into the markdown documents below them, honouring
/// `.gitignore`. File paths are kept as given.
pub fn collect_documents(paths: &[PathBuf]) -> EmbedResult<Vec<PathBuf>> {
	let mut documents = Vec::new();

	for path in paths {
		if !path.is_dir() {
			documents.push(path.clone());
			continue;
		}

		let mut found = Vec::new();
		for entry in WalkBuilder::new(path).build() {
			let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
			let entry_path = entry.path();

			if entry.file_type().is_some_and(|kind| kind.is_file()) && is_markdown(entry_path) {
				found.push(entry_path.to_path_buf());
			}
		}

		found.sort();
		documents.extend(found);
	}

	Ok(documents)
}

fn is_markdown(path: &Path) -> bool {
	path.extension()
		.and_then(|extension| extension.to_str())
		.is_some_and(|extension| {
			MARKDOWN_EXTENSIONS
				.iter()
				.any(|candidate| extension.eq_ignore_ascii_case(candidate))
		})
}
