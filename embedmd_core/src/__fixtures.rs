use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use crate::EmbedError;
use crate::EmbedResult;
use crate::Fetcher;

/// In-memory fetcher keyed by reference. Records every fetch so tests can
/// assert on order and base directories.
#[derive(Default)]
pub struct MemoryFetcher {
	files: HashMap<String, String>,
	calls: RefCell<Vec<(PathBuf, String)>>,
}

impl MemoryFetcher {
	pub fn with(mut self, reference: &str, content: &str) -> Self {
		self.files.insert(reference.to_string(), content.to_string());
		self
	}

	pub fn calls(&self) -> Vec<(PathBuf, String)> {
		self.calls.borrow().clone()
	}
}

impl Fetcher for MemoryFetcher {
	fn fetch(&self, base_dir: &Path, reference: &str) -> EmbedResult<Vec<u8>> {
		self.calls
			.borrow_mut()
			.push((base_dir.to_path_buf(), reference.to_string()));

		self.files
			.get(reference)
			.map(|content| content.as_bytes().to_vec())
			.ok_or_else(|| {
				EmbedError::Fetch {
					reference: reference.to_string(),
					reason: "not found".into(),
				}
			})
	}
}

pub const SAMPLE_GO: &str = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hello\")\n}\n";

pub fn sample_fetcher() -> MemoryFetcher {
	MemoryFetcher::default()
		.with("sample.go", SAMPLE_GO)
		.with("lines.txt", "a\nfoo bar\nc\n")
		.with("range.txt", "x\nSTART here\nmid\nend\n")
		.with("notes.ext", "some notes\n")
}

pub fn base_dir() -> &'static Path {
	Path::new("docs")
}
