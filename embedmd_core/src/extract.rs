use crate::Boundary;
use crate::EmbedError;
use crate::EmbedResult;
use crate::EndPattern;
use crate::Pattern;
use crate::Selection;

/// The lines selected from fetched content together with the fence language
/// they will be rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSnippet<'a> {
	/// Selected lines, each including its original line ending (the last line
	/// of the content may have none).
	pub lines: Vec<&'a str>,
	pub language: String,
}

/// Select the lines of `content` described by `selection`.
///
/// Matching is line oriented: a pattern matching any part of a line selects
/// the whole line. Line endings are excluded while matching and preserved in
/// the result, so the selected range reproduces the source exactly.
pub fn extract<'a>(content: &'a str, selection: &Selection) -> EmbedResult<Vec<&'a str>> {
	let lines: Vec<&str> = content.split_inclusive('\n').collect();

	match selection {
		Selection::Whole => Ok(lines),
		Selection::Line(pattern) => {
			let first = find_line(&lines, 0, pattern, Boundary::Start)?;
			Ok(vec![lines[first]])
		}
		Selection::Range { start, end } => {
			let first = find_line(&lines, 0, start, Boundary::Start)?;
			let last = match end {
				EndPattern::EndOfContent => lines.len() - 1,
				EndPattern::Pattern(pattern) => {
					find_line(&lines, first + 1, pattern, Boundary::End)?
				}
			};

			Ok(lines[first..=last].to_vec())
		}
	}
}

/// Index of the first line at or after `from` matching `pattern`.
fn find_line(
	lines: &[&str],
	from: usize,
	pattern: &Pattern,
	boundary: Boundary,
) -> EmbedResult<usize> {
	lines
		.iter()
		.enumerate()
		.skip(from)
		.find(|(_, line)| pattern.is_match(strip_line_ending(line)))
		.map(|(index, _)| index)
		.ok_or_else(|| {
			EmbedError::NoMatch {
				pattern: pattern.literal().to_string(),
				boundary,
			}
		})
}

/// The line without its trailing `\n` or `\r\n`.
pub fn strip_line_ending(line: &str) -> &str {
	let line = line.strip_suffix('\n').unwrap_or(line);
	line.strip_suffix('\r').unwrap_or(line)
}
