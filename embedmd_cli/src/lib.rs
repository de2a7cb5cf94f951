use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about = "Embed code snippets from files and URLs into markdown documents.",
	long_about = "embedmd keeps code samples in markdown documentation in sync with the files \
	              they come from.\n\nA directive line such as\n\n  [embedmd]:# (path/to/file.go go \
	              /func main/ $)\n\nis followed by a generated block holding the selected lines of \
	              the referenced file or URL. Every run replaces that block with fresh \
	              content.\n\nWith no paths the document is read from standard input and the \
	              result is written to standard output."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct EmbedmdCli {
	/// Markdown documents or directories to process. Directories are searched
	/// for `.md` and `.markdown` files, honouring `.gitignore`.
	pub paths: Vec<PathBuf>,

	/// Write the updated content back to each document instead of printing
	/// it.
	#[arg(long, short, default_value_t = false, conflicts_with = "diff")]
	pub write: bool,

	/// Print a unified diff for each document that would change. Exits with
	/// status 1 when any document differs.
	#[arg(long, short, default_value_t = false)]
	pub diff: bool,

	/// Replace a bare fenced code block directly after a directive, as written
	/// by versions without begin/end markers.
	#[arg(long, default_value_t = false)]
	pub legacy_fences: bool,

	/// Path to a config file. Defaults to `embedmd.toml`, `.embedmd.toml` or
	/// `.config/embedmd.toml` in the current directory.
	#[arg(long, short)]
	pub config: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

/// How the result of processing each document is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
	/// Print the rewritten document to standard output.
	Print,
	/// Write changed documents back to disk.
	Write,
	/// Print a unified diff of changed documents.
	Diff,
}

impl EmbedmdCli {
	pub fn output_mode(&self) -> OutputMode {
		if self.write {
			OutputMode::Write
		} else if self.diff {
			OutputMode::Diff
		} else {
			OutputMode::Print
		}
	}

	/// Whether the document is read from standard input.
	pub fn reads_stdin(&self) -> bool {
		self.paths.is_empty()
	}
}
