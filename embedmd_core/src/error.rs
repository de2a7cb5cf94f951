use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum EmbedError {
	#[error(transparent)]
	#[diagnostic(code(embedmd::io_error))]
	Io(#[from] std::io::Error),

	#[error("malformed directive: {0}")]
	#[diagnostic(
		code(embedmd::malformed_directive),
		help("directives look like `[embedmd]:# (path/to/file.ext lang /start/ /end/)`")
	)]
	MalformedDirective(String),

	#[error("failed to fetch `{reference}`: {reason}")]
	#[diagnostic(code(embedmd::fetch))]
	Fetch { reference: String, reason: String },

	#[error("{boundary} pattern `/{pattern}/` did not match any line")]
	#[diagnostic(
		code(embedmd::no_match),
		help("the referenced content may have changed; update the pattern in the directive")
	)]
	NoMatch {
		pattern: String,
		boundary: Boundary,
	},

	#[error("generated block is missing its closing `{marker}` line")]
	#[diagnostic(
		code(embedmd::unterminated_block),
		help("restore the closing marker or delete the stale generated block by hand")
	)]
	UnterminatedBlock { marker: String },

	#[error("content of `{reference}` contains the `{marker}` line and cannot be embedded unfenced")]
	#[diagnostic(
		code(embedmd::marker_in_snippet),
		help("embed this snippet with a language other than `none`")
	)]
	MarkerInSnippet { reference: String, marker: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(embedmd::config_parse),
		help("check that embedmd.toml is valid TOML with optional [fetch] and [languages] sections")
	)]
	ConfigParse(String),

	#[error("line {line}: {source}")]
	#[diagnostic(code(embedmd::directive))]
	AtLine {
		line: usize,
		source: Box<EmbedError>,
	},
}

impl EmbedError {
	/// Attach the 1-indexed line of the directive that produced this error.
	pub fn at_line(self, line: usize) -> Self {
		Self::AtLine {
			line,
			source: Box::new(self),
		}
	}

	/// The error with any line wrappers removed.
	pub fn root(&self) -> &EmbedError {
		match self {
			Self::AtLine { source, .. } => source.root(),
			_ => self,
		}
	}
}

/// Which side of a line range a pattern bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
	Start,
	End,
}

impl std::fmt::Display for Boundary {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Start => write!(f, "start"),
			Self::End => write!(f, "end"),
		}
	}
}

pub type EmbedResult<T> = Result<T, EmbedError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
