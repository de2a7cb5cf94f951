use std::ops::Range;

use logos::Logos;
use snailquote::unescape;

use crate::EmbedError;
use crate::EmbedResult;
use crate::tokens::SpannedToken;
use crate::tokens::Token;

/// Raw tokens produced by logos for flat tokenization of a directive command.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("(")]
	OpenParen,
	#[token(")")]
	CloseParen,
	#[token("$")]
	Dollar,
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
	#[regex(r"/([^/\\\n]|\\.)*/")]
	Pattern,
	#[regex(r"/([^/\\\n]|\\.)*")]
	UnterminatedPattern,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r#"[^\s()/$"][^\s()]*"#)]
	Word,
}

/// Context states for the state machine that turns raw tokens into directive
/// tokens.
enum LexerContext {
	/// Before the opening parenthesis.
	Outside,
	/// Directly after `(`, reading the reference.
	Reference,
	/// Reading the language and pattern arguments.
	Arguments,
	/// After the closing parenthesis.
	Closed,
}

/// Walks the logos token stream with context-dependent rules, building the
/// list of directive tokens.
struct TokenWalker<'a> {
	/// The command text following the directive tag.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
	/// Byte range of the reference collected so far.
	reference: Option<Range<usize>>,
	context: LexerContext,
	tokens: Vec<SpannedToken>,
}

impl<'a> TokenWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			reference: None,
			context: LexerContext::Outside,
			tokens: vec![],
		}
	}

	fn current_span(&self) -> Range<usize> {
		self.raw_tokens[self.cursor].1.clone()
	}

	fn current_slice(&self) -> &'a str {
		&self.source[self.current_span()]
	}

	fn push_token(&mut self, token: Token) {
		let span = self.current_span();
		self.tokens.push(SpannedToken::new(token, span));
	}

	/// Grow the reference span to cover the current raw token. References are
	/// read up to whitespace or a parenthesis, so `/abs/path.go` stays a single
	/// reference even though it starts like a pattern literal.
	///
	/// A raw token starting with `/` may run past the end of the reference
	/// (`/hello.go go)` lexes as one unterminated pattern). Such a token is cut
	/// at the first whitespace or parenthesis and the rest is lexed again.
	fn extend_reference(&mut self) {
		let span = self.current_span();
		let slice = self.current_slice();
		let end = slice
			.find(|c: char| c.is_whitespace() || c == '(' || c == ')')
			.map_or(span.end, |cut| span.start + cut);

		self.reference = Some(match self.reference.take() {
			Some(existing) => existing.start..end,
			None => span.start..end,
		});

		if end < span.end {
			self.relex_from(end);
		}
	}

	/// Replace every raw token after the cursor with a fresh lexing of the
	/// source starting at byte `offset`.
	fn relex_from(&mut self, offset: usize) {
		let source = self.source;
		let rest = RawToken::lexer(&source[offset..])
			.spanned()
			.map(|(token, span)| (token, span.start + offset..span.end + offset));

		self.raw_tokens.truncate(self.cursor + 1);
		self.raw_tokens.extend(rest);
	}

	/// Emit the collected reference (if any) and return whether one existed.
	fn finish_reference(&mut self) -> bool {
		let Some(span) = self.reference.take() else {
			return false;
		};

		let value = self.source[span.clone()].to_string();
		self.tokens.push(SpannedToken::new(Token::Reference(value), span));
		true
	}

	/// Process a double quoted reference, stripping the quotes and resolving
	/// escapes.
	fn process_quoted_reference(&mut self) -> EmbedResult<()> {
		let slice = self.current_slice();
		let inner = &slice[1..slice.len() - 1];

		let value = if inner.contains('\\') {
			unescape(inner).map_err(|e| {
				EmbedError::MalformedDirective(format!("invalid escape in reference {slice}: {e}"))
			})?
		} else {
			inner.to_string()
		};

		self.push_token(Token::Reference(value));
		self.context = LexerContext::Arguments;
		Ok(())
	}

	fn process(&mut self) -> EmbedResult<()> {
		while self.cursor < self.raw_tokens.len() {
			let (result, _) = &self.raw_tokens[self.cursor];

			match self.context {
				LexerContext::Outside => {
					match result {
						Ok(RawToken::Whitespace) => {}
						Ok(RawToken::OpenParen) => {
							self.push_token(Token::OpenParen);
							self.context = LexerContext::Reference;
						}
						_ => {
							return Err(malformed(format!(
								"expected `(` but found `{}`",
								self.current_slice()
							)));
						}
					}
				}
				LexerContext::Reference => {
					match result {
						Ok(RawToken::Whitespace) => {
							if self.finish_reference() {
								self.context = LexerContext::Arguments;
							}
						}
						Ok(RawToken::CloseParen) => {
							if !self.finish_reference() {
								return Err(malformed("missing reference"));
							}
							self.push_token(Token::CloseParen);
							self.context = LexerContext::Closed;
						}
						Ok(RawToken::OpenParen) => {
							return Err(malformed("unbalanced parentheses: unexpected `(`"));
						}
						Ok(RawToken::DoubleQuotedString) if self.reference.is_none() => {
							self.process_quoted_reference()?;
						}
						_ => self.extend_reference(),
					}
				}
				LexerContext::Arguments => {
					match result {
						Ok(RawToken::Whitespace) => {}
						Ok(RawToken::CloseParen) => {
							self.push_token(Token::CloseParen);
							self.context = LexerContext::Closed;
						}
						Ok(RawToken::OpenParen) => {
							return Err(malformed("unbalanced parentheses: unexpected `(`"));
						}
						Ok(RawToken::Word) => {
							let word = self.current_slice().to_string();
							self.push_token(Token::Word(word));
						}
						Ok(RawToken::Pattern) => {
							let slice = self.current_slice();
							let body = slice[1..slice.len() - 1].to_string();
							self.push_token(Token::Pattern(body));
						}
						Ok(RawToken::Dollar) => self.push_token(Token::EndOfContent),
						Ok(RawToken::UnterminatedPattern) => {
							return Err(malformed(format!(
								"unterminated regular expression `{}`",
								self.current_slice()
							)));
						}
						Ok(RawToken::DoubleQuotedString) | Err(()) => {
							return Err(malformed(format!(
								"unexpected `{}`",
								self.current_slice()
							)));
						}
					}
				}
				LexerContext::Closed => {
					if !matches!(result, Ok(RawToken::Whitespace)) {
						return Err(malformed(format!(
							"unexpected `{}` after closing `)`",
							self.current_slice()
						)));
					}
				}
			}

			self.cursor += 1;
		}

		match self.context {
			LexerContext::Closed => Ok(()),
			LexerContext::Outside => Err(malformed("expected `(` after `[embedmd]:#`")),
			LexerContext::Reference | LexerContext::Arguments => {
				Err(malformed("unbalanced parentheses: missing closing `)`"))
			}
		}
	}
}

fn malformed(reason: impl Into<String>) -> EmbedError {
	EmbedError::MalformedDirective(reason.into())
}

/// Tokenize the command text that follows the `[embedmd]:#` tag.
pub fn tokenize(command: &str) -> EmbedResult<Vec<SpannedToken>> {
	let mut walker = TokenWalker::new(command);
	walker.process()?;
	Ok(walker.tokens)
}
