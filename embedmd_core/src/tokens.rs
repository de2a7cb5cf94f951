use std::fmt::Display;
use std::ops::Range;

/// Tokens of a directive command, e.g. `(file.go go /start/ $)`.
///
/// Whitespace is dropped by the lexer since arguments are separated by it and
/// never carry meaning of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// `(`
	OpenParen,
	/// `)`
	CloseParen,
	/// The path or URL, always the first argument after `(`.
	Reference(String),
	/// A bare word argument such as the language `go`.
	Word(String),
	/// The body of a `/.../` literal, exactly as written between the slashes.
	Pattern(String),
	/// `$`
	EndOfContent,
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Token::OpenParen => write!(f, "("),
			Token::CloseParen => write!(f, ")"),
			Token::Reference(value) | Token::Word(value) => write!(f, "{value}"),
			Token::Pattern(value) => write!(f, "/{value}/"),
			Token::EndOfContent => write!(f, "$"),
		}
	}
}

/// A token together with the byte range it occupies in the command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
	pub token: Token,
	pub span: Range<usize>,
}

impl SpannedToken {
	pub fn new(token: Token, span: Range<usize>) -> Self {
		Self { token, span }
	}
}
