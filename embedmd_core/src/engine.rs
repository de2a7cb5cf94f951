use std::path::Path;

use tracing::debug;
use tracing::trace;

use crate::Directive;
use crate::EmbedError;
use crate::EmbedResult;
use crate::ExtractedSnippet;
use crate::Fetcher;
use crate::LanguageTable;
use crate::RenderedBlock;
use crate::extract::extract;
use crate::parser::parse_directive;
use crate::render::END_MARKER;
use crate::render::Fence;
use crate::render::UNFENCED_LANGUAGE;
use crate::render::is_begin_marker;
use crate::render::is_end_marker;
use crate::render::parse_begin_marker;
use crate::render::render_block;

/// Options controlling how a document is rewritten.
#[derive(Debug, Clone, Default)]
pub struct RewriteOptions {
	/// Language inference table for directives without an explicit language.
	pub languages: LanguageTable,
	/// Treat a bare fenced block directly after a directive as generated
	/// output.
	pub legacy_fences: bool,
}

/// Rewrite `document`, placing an up-to-date snippet below every directive
/// and dropping the block generated by the previous run.
///
/// Directives are processed top to bottom in a single pass. Directive lines
/// inside hand-written fenced code blocks are left alone. Any error aborts the
/// whole rewrite; no partially rewritten text is returned.
pub fn rewrite(
	document: &str,
	base_dir: &Path,
	fetcher: &dyn Fetcher,
	options: &RewriteOptions,
) -> EmbedResult<String> {
	let lines: Vec<&str> = document.split_inclusive('\n').collect();
	let mut output = String::with_capacity(document.len());
	let mut open_fence: Option<Fence> = None;
	let mut index = 0;

	while index < lines.len() {
		let line = lines[index];
		index += 1;

		if let Some(fence) = open_fence {
			if fence.closes(line) {
				open_fence = None;
			}
			output.push_str(line);
			continue;
		}

		if let Some(fence) = Fence::open(line) {
			open_fence = Some(fence);
			output.push_str(line);
			continue;
		}

		let line_number = index;
		let Some(directive) = parse_directive(line).map_err(|e| e.at_line(line_number))? else {
			output.push_str(line);
			continue;
		};

		let eol = line_ending(line);
		output.push_str(line);
		if !line.ends_with('\n') {
			output.push_str(eol);
		}

		index = skip_generated_block(&lines, index, options.legacy_fences)
			.map_err(|e| e.at_line(line_number))?;

		debug!(line = line_number, directive = %directive, "embedding snippet");
		let block = embed(&directive, base_dir, fetcher, &options.languages, eol)
			.map_err(|e| e.at_line(line_number))?;
		output.push_str(&block.to_string());
	}

	Ok(output)
}

/// Fetch, extract and render the block for a single directive.
pub fn embed(
	directive: &Directive,
	base_dir: &Path,
	fetcher: &dyn Fetcher,
	languages: &LanguageTable,
	eol: &str,
) -> EmbedResult<RenderedBlock> {
	let language = languages.resolve(directive)?;
	let bytes = fetcher.fetch(base_dir, &directive.reference)?;
	let content = String::from_utf8(bytes).map_err(|_| {
		EmbedError::Fetch {
			reference: directive.reference.clone(),
			reason: "content is not valid UTF-8".into(),
		}
	})?;

	let lines = extract(&content, &directive.selection)?;
	let snippet = ExtractedSnippet { lines, language };
	render_block(directive, &snippet, eol)
}

/// Return the index of the first line after the block generated for the
/// directive preceding `start`, or `start` itself when there is none.
///
/// A generated block runs from a begin marker to the next end marker. When the
/// line after the begin marker opens a fence, that fence is skipped as a whole
/// so an end marker inside the snippet cannot end the block early.
fn skip_generated_block(lines: &[&str], start: usize, legacy_fences: bool) -> EmbedResult<usize> {
	let Some(next) = lines.get(start) else {
		return Ok(start);
	};

	if is_begin_marker(next) {
		let mut index = start + 1;

		// Unfenced snippets never contain the end marker, so only a fenced
		// block needs its fence skipped as a unit.
		if is_fenced_block(next) {
			if let Some(fence) = lines.get(index).and_then(|line| Fence::open(line)) {
				index = skip_fence(lines, index, fence)?;
			}
		}

		while let Some(line) = lines.get(index) {
			index += 1;
			if is_end_marker(line) {
				trace!(from = start + 1, to = index, "removed generated block");
				return Ok(index);
			}
		}

		return Err(EmbedError::UnterminatedBlock {
			marker: END_MARKER.to_string(),
		});
	}

	if legacy_fences {
		if let Some(fence) = Fence::open(next) {
			let end = skip_fence(lines, start, fence)?;
			trace!(from = start + 1, to = end, "removed legacy fenced block");
			return Ok(end);
		}
	}

	Ok(start)
}

/// Whether the block opened by `begin_marker` was rendered inside a fence. A
/// marker whose echoed directive no longer parses is treated as unfenced so
/// the search stops at the first end marker.
fn is_fenced_block(begin_marker: &str) -> bool {
	parse_begin_marker(begin_marker).is_some_and(|directive| {
		directive.language.as_deref() != Some(UNFENCED_LANGUAGE)
	})
}

/// Skip the fence opened at `open`, returning the index after its closing line.
fn skip_fence(lines: &[&str], open: usize, fence: Fence) -> EmbedResult<usize> {
	lines
		.iter()
		.enumerate()
		.skip(open + 1)
		.find(|(_, line)| fence.closes(line))
		.map(|(index, _)| index + 1)
		.ok_or_else(|| {
			EmbedError::UnterminatedBlock {
				marker: fence.marker.to_string().repeat(fence.length),
			}
		})
}

/// The line ending used by `line`, defaulting to `\n` for a final line without
/// one.
fn line_ending(line: &str) -> &'static str {
	if line.ends_with("\r\n") { "\r\n" } else { "\n" }
}
