use std::collections::HashMap;

use derive_more::Deref;
use derive_more::DerefMut;

use crate::Directive;
use crate::EmbedError;
use crate::EmbedResult;
use crate::ExtractedSnippet;
use crate::parser::parse_command;

/// Language tag that embeds the snippet without fence delimiters.
pub const UNFENCED_LANGUAGE: &str = "none";

/// Opening of the marker line placed before every generated block.
pub const BEGIN_MARKER_PREFIX: &str = "<!-- embedmd:begin";

/// The marker line closing every generated block.
pub const END_MARKER: &str = "<!-- embedmd:end -->";

/// Built-in extension to fence language mappings. Extensions missing from this
/// table are used as the language verbatim.
const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
	("go", "go"),
	("rs", "rust"),
	("py", "python"),
	("js", "javascript"),
	("mjs", "javascript"),
	("cjs", "javascript"),
	("ts", "typescript"),
	("tsx", "tsx"),
	("jsx", "jsx"),
	("rb", "ruby"),
	("sh", "bash"),
	("bash", "bash"),
	("zsh", "zsh"),
	("yml", "yaml"),
	("yaml", "yaml"),
	("md", "markdown"),
	("markdown", "markdown"),
	("kt", "kotlin"),
	("cs", "csharp"),
	("cc", "cpp"),
	("cpp", "cpp"),
	("cxx", "cpp"),
	("hpp", "cpp"),
	("h", "c"),
	("ps1", "powershell"),
	("pl", "perl"),
	("hs", "haskell"),
	("ex", "elixir"),
	("exs", "elixir"),
];

/// Extension to language lookup used when a directive has no explicit
/// language. User overrides take precedence over the built-in entries.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
	overrides: HashMap<String, String>,
}

impl LanguageTable {
	pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
		let overrides = overrides
			.into_iter()
			.map(|(extension, language)| {
				(
					extension.trim_start_matches('.').to_ascii_lowercase(),
					language,
				)
			})
			.collect();

		Self { overrides }
	}

	/// The language for a bare extension (without the leading dot).
	pub fn language_for_extension(&self, extension: &str) -> String {
		let key = extension.to_ascii_lowercase();
		if let Some(language) = self.overrides.get(&key) {
			return language.clone();
		}

		BUILTIN_LANGUAGES
			.iter()
			.find(|(ext, _)| *ext == key)
			.map_or_else(|| extension.to_string(), |(_, language)| (*language).to_string())
	}

	/// The explicit language of the directive, or the one inferred from its
	/// reference.
	pub fn resolve(&self, directive: &Directive) -> EmbedResult<String> {
		if let Some(language) = &directive.language {
			return Ok(language.clone());
		}

		reference_extension(&directive.reference)
			.map(|extension| self.language_for_extension(extension))
			.ok_or_else(|| {
				EmbedError::MalformedDirective(format!(
					"language is required when the reference `{}` has no extension",
					directive.reference
				))
			})
	}
}

/// The file extension of a path or URL reference. For URLs the query string
/// and fragment are ignored.
pub fn reference_extension(reference: &str) -> Option<&str> {
	let path = reference
		.split(['?', '#'])
		.next()
		.unwrap_or(reference);
	let file_name = path.rsplit('/').next().unwrap_or(path);
	let (stem, extension) = file_name.rsplit_once('.')?;

	if stem.is_empty() || extension.is_empty() {
		return None;
	}

	Some(extension)
}

/// A fenced code block delimiter, either opening or closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
	pub marker: char,
	pub length: usize,
}

impl Fence {
	/// Detect a fence opening line (three or more backticks or tildes, indented
	/// by at most three spaces).
	pub fn open(line: &str) -> Option<Self> {
		let trimmed = strip_fence_indent(line)?;
		let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
		let length = trimmed.chars().take_while(|c| *c == marker).count();

		if length < 3 {
			return None;
		}

		// Backtick fences may not carry backticks in their info string.
		if marker == '`' && trimmed[length..].contains('`') {
			return None;
		}

		Some(Self { marker, length })
	}

	/// Whether `line` closes a block opened by this fence.
	pub fn closes(&self, line: &str) -> bool {
		let Some(trimmed) = strip_fence_indent(line) else {
			return false;
		};
		let trimmed = trimmed.trim_end();
		let length = trimmed.chars().take_while(|c| *c == self.marker).count();

		length >= self.length && trimmed.chars().count() == length
	}
}

/// Deeper indentation turns a fence into indented code.
const MAX_FENCE_INDENT: usize = 3;

/// The line without its leading spaces, or `None` when it is indented too far
/// to be a fence.
fn strip_fence_indent(line: &str) -> Option<&str> {
	let trimmed = line.trim_start_matches(' ');
	(line.len() - trimmed.len() <= MAX_FENCE_INDENT).then_some(trimmed)
}

/// The output lines for one directive, from the begin marker through the end
/// marker. Every line carries its own line ending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct RenderedBlock(Vec<String>);

impl std::fmt::Display for RenderedBlock {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for line in &self.0 {
			write!(f, "{line}")?;
		}
		Ok(())
	}
}

/// Format `lines` for embedding: verbatim for the `none` language, otherwise
/// inside a backtick fence tagged with `language`. The final line always ends
/// with a line ending.
pub fn render(lines: &[&str], language: &str, eol: &str) -> Vec<String> {
	let mut output: Vec<String> = Vec::with_capacity(lines.len() + 2);
	let fenced = language != UNFENCED_LANGUAGE;
	let fence = "`".repeat(fence_length(lines));

	if fenced {
		output.push(format!("{fence}{language}{eol}"));
	}

	for line in lines {
		if line.ends_with('\n') {
			output.push((*line).to_string());
		} else {
			output.push(format!("{line}{eol}"));
		}
	}

	if fenced {
		output.push(format!("{fence}{eol}"));
	}

	output
}

/// Wrap the rendered snippet in the begin and end markers that let the next
/// pass find and replace it.
pub fn render_block(
	directive: &Directive,
	snippet: &ExtractedSnippet<'_>,
	eol: &str,
) -> EmbedResult<RenderedBlock> {
	if snippet.language == UNFENCED_LANGUAGE
		&& snippet.lines.iter().any(|line| is_end_marker(line))
	{
		return Err(EmbedError::MarkerInSnippet {
			reference: directive.reference.clone(),
			marker: END_MARKER.to_string(),
		});
	}

	let mut lines = vec![begin_marker(directive, eol)];
	lines.extend(render(&snippet.lines, &snippet.language, eol));
	lines.push(format!("{END_MARKER}{eol}"));

	Ok(RenderedBlock(lines))
}

/// The begin marker echoing the directive, e.g.
/// `<!-- embedmd:begin (file.go go /start/ $) -->`.
pub fn begin_marker(directive: &Directive, eol: &str) -> String {
	let command = directive.to_string().replace("-->", "--\\>");
	format!("{BEGIN_MARKER_PREFIX} {command} -->{eol}")
}

/// The directive echoed by a begin marker line. `None` when the line is not a
/// begin marker or its echo no longer parses.
pub fn parse_begin_marker(line: &str) -> Option<Directive> {
	let command = line
		.trim()
		.strip_prefix(BEGIN_MARKER_PREFIX)?
		.strip_suffix("-->")?
		.replace("--\\>", "-->");

	parse_command(&command).ok()
}

pub fn is_begin_marker(line: &str) -> bool {
	line.trim().starts_with(BEGIN_MARKER_PREFIX)
}

pub fn is_end_marker(line: &str) -> bool {
	line.trim() == END_MARKER
}

/// The shortest backtick fence that no snippet line can close early.
fn fence_length(lines: &[&str]) -> usize {
	lines
		.iter()
		.map(|line| line.trim_start().chars().take_while(|c| *c == '`').count())
		.max()
		.map_or(3, |longest| (longest + 1).max(3))
}
