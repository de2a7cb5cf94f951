use std::fmt::Display;
use std::iter::Peekable;
use std::vec::IntoIter;

use regex::Regex;

use crate::EmbedError;
use crate::EmbedResult;
use crate::lexer::tokenize;
use crate::render::reference_extension;
use crate::tokens::SpannedToken;
use crate::tokens::Token;

/// The literal tag that starts every directive line.
pub const DIRECTIVE_TAG: &str = "[embedmd]:#";

/// A parsed `[embedmd]:#` directive.
///
/// ```md
/// [embedmd]:# (path/to/file.go go /func main/ $)
/// ```
///
/// The [`reference`](Directive::reference) is kept exactly as written. It is
/// resolved against the document's directory only when fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
	/// Path or URL of the embedded content, using forward slashes.
	pub reference: String,
	/// Explicit fence language. When absent it is inferred from the
	/// reference's file extension.
	pub language: Option<String>,
	/// Which lines of the referenced content to embed.
	pub selection: Selection,
}

/// The portion of the referenced content a directive embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
	/// The entire content.
	Whole,
	/// The first line matching the pattern.
	Line(Pattern),
	/// From the first line matching `start` through the first later line
	/// matching `end`, or through the end of the content.
	Range { start: Pattern, end: EndPattern },
}

/// A regular expression written as a `/.../` literal.
#[derive(Debug, Clone)]
pub struct Pattern {
	literal: String,
	regex: Regex,
}

impl Pattern {
	/// Compile the body of a `/.../` literal. `\/` is read as a literal slash.
	pub fn new(literal: impl Into<String>) -> EmbedResult<Self> {
		let literal = literal.into();
		let regex = Regex::new(&literal.replace("\\/", "/")).map_err(|e| {
			EmbedError::MalformedDirective(format!("invalid regular expression `/{literal}/`: {e}"))
		})?;

		Ok(Self { literal, regex })
	}

	/// The pattern as written between the slashes.
	pub fn literal(&self) -> &str {
		&self.literal
	}

	/// Whether the pattern matches anywhere in `line`.
	pub fn is_match(&self, line: &str) -> bool {
		self.regex.is_match(line)
	}
}

impl PartialEq for Pattern {
	fn eq(&self, other: &Self) -> bool {
		self.literal == other.literal
	}
}

impl Eq for Pattern {}

impl Display for Pattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "/{}/", self.literal)
	}
}

/// The end boundary of a [`Selection::Range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndPattern {
	Pattern(Pattern),
	/// The `$` sentinel: continue to the last line of the content.
	EndOfContent,
}

impl Display for EndPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Pattern(pattern) => pattern.fmt(f),
			Self::EndOfContent => write!(f, "$"),
		}
	}
}

impl Display for Directive {
	/// Writes the canonical command, e.g. `(file.go go /start/ $)`.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.reference.chars().any(char::is_whitespace) {
			let escaped = self.reference.replace('\\', "\\\\").replace('"', "\\\"");
			write!(f, "(\"{escaped}\"")?;
		} else {
			write!(f, "({}", self.reference)?;
		}

		if let Some(language) = &self.language {
			write!(f, " {language}")?;
		}

		match &self.selection {
			Selection::Whole => {}
			Selection::Line(pattern) => write!(f, " {pattern}")?,
			Selection::Range { start, end } => write!(f, " {start} {end}")?,
		}

		write!(f, ")")
	}
}

/// If `line` is a directive line, return the command text after the tag.
///
/// Leading indentation is allowed; the tag itself must be exact.
pub fn recognize(line: &str) -> Option<&str> {
	line.trim().strip_prefix(DIRECTIVE_TAG)
}

/// Parse a single document line. Returns `Ok(None)` for lines that are not
/// directives and an error for directive lines with a malformed command.
pub fn parse_directive(line: &str) -> EmbedResult<Option<Directive>> {
	let Some(command) = recognize(line) else {
		return Ok(None);
	};

	parse_command(command).map(Some)
}

/// Parse the parenthesised command following the directive tag.
pub fn parse_command(command: &str) -> EmbedResult<Directive> {
	let tokens = tokenize(command)?;
	CommandParser::new(tokens).parse()
}

/// Recursive descent over the token list:
///
/// ```text
/// command   = "(" reference [language] [start [end]] ")"
/// start     = pattern
/// end       = pattern | "$"
/// ```
struct CommandParser {
	tokens: Peekable<IntoIter<SpannedToken>>,
}

impl CommandParser {
	fn new(tokens: Vec<SpannedToken>) -> Self {
		Self {
			tokens: tokens.into_iter().peekable(),
		}
	}

	fn next(&mut self) -> Option<Token> {
		self.tokens.next().map(|spanned| spanned.token)
	}

	fn peek(&mut self) -> Option<&Token> {
		self.tokens.peek().map(|spanned| &spanned.token)
	}

	fn parse(mut self) -> EmbedResult<Directive> {
		self.expect_open()?;
		let reference = self.parse_reference()?;
		let language = self.parse_language();
		let selection = self.parse_selection()?;
		self.expect_close()?;

		if language.is_none() && reference_extension(&reference).is_none() {
			return Err(EmbedError::MalformedDirective(format!(
				"language is required when the reference `{reference}` has no extension"
			)));
		}

		Ok(Directive {
			reference,
			language,
			selection,
		})
	}

	fn expect_open(&mut self) -> EmbedResult<()> {
		match self.next() {
			Some(Token::OpenParen) => Ok(()),
			_ => Err(EmbedError::MalformedDirective("expected `(`".into())),
		}
	}

	fn parse_reference(&mut self) -> EmbedResult<String> {
		match self.next() {
			Some(Token::Reference(reference)) if !reference.is_empty() => Ok(reference),
			_ => Err(EmbedError::MalformedDirective("missing reference".into())),
		}
	}

	fn parse_language(&mut self) -> Option<String> {
		match self.tokens.next_if(|spanned| matches!(spanned.token, Token::Word(_))) {
			Some(SpannedToken {
				token: Token::Word(language),
				..
			}) => Some(language),
			_ => None,
		}
	}

	fn parse_pattern(&mut self) -> EmbedResult<Option<Pattern>> {
		match self.tokens.next_if(|spanned| matches!(spanned.token, Token::Pattern(_))) {
			Some(SpannedToken {
				token: Token::Pattern(literal),
				..
			}) => Pattern::new(literal).map(Some),
			_ => Ok(None),
		}
	}

	fn parse_selection(&mut self) -> EmbedResult<Selection> {
		let Some(start) = self.parse_pattern()? else {
			if let Some(Token::EndOfContent) = self.peek() {
				return Err(EmbedError::MalformedDirective(
					"end pattern `$` given without a start pattern".into(),
				));
			}
			return Ok(Selection::Whole);
		};

		if let Some(end) = self.parse_pattern()? {
			return Ok(Selection::Range {
				start,
				end: EndPattern::Pattern(end),
			});
		}

		if let Some(Token::EndOfContent) = self.peek() {
			self.next();
			return Ok(Selection::Range {
				start,
				end: EndPattern::EndOfContent,
			});
		}

		Ok(Selection::Line(start))
	}

	fn expect_close(&mut self) -> EmbedResult<()> {
		match self.tokens.next() {
			Some(SpannedToken {
				token: Token::CloseParen,
				..
			}) => Ok(()),
			Some(SpannedToken { token, span }) => {
				Err(EmbedError::MalformedDirective(format!(
					"too many arguments: unexpected `{token}` at column {}",
					span.start + 1
				)))
			}
			None => {
				Err(EmbedError::MalformedDirective(
					"unbalanced parentheses: missing closing `)`".into(),
				))
			}
		}
	}
}
