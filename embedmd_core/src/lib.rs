//! `embedmd_core` is the core library for [embedmd](https://github.com/ifiokjr/embedmd). It keeps code samples in markdown documentation synchronized with the files they come from. A directive line names a file or URL, and every run replaces the block below it with a fresh fenced snippet of that content.
//!
//! ## Directive Syntax
//!
//! ```md
//! [embedmd]:# (path/to/file.go)
//! [embedmd]:# (path/to/file.go go)
//! [embedmd]:# (path/to/file.go go /func main/)
//! [embedmd]:# (path/to/file.go go /func main/ /^}/)
//! [embedmd]:# (https://example.com/file.go go /func main/ $)
//! ```
//!
//! - One pattern embeds the first line it matches.
//! - Two patterns embed the range from the first line matching the start through the next line matching the end. `$` as the end means the end of the content.
//! - Without a language, the fence language is inferred from the file extension. The language `none` embeds the content without a fence.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown document
//!   → Recognizer (finds `[embedmd]:#` lines, tokenizes and parses the command into a Directive)
//!   → Fetcher (reads the referenced file or URL)
//!   → Extractor (selects the lines described by the directive's patterns)
//!   → Renderer (fences the lines and wraps them in begin/end markers)
//!   → Rewriter (drops the previously generated block and splices in the new one)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `embedmd.toml`: fetch timeout, token variable and language overrides.
//! - [`document`]: File level processing: reading, diffing and writing documents, and directory discovery.
//! - [`fetcher`]: The [`Fetcher`] trait and the filesystem/HTTP [`ContentFetcher`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use embedmd_core::ContentFetcher;
//! use embedmd_core::RewriteOptions;
//! use embedmd_core::document::process_file;
//! use std::path::Path;
//!
//! let fetcher = ContentFetcher::default();
//! let update = process_file(Path::new("readme.md"), &fetcher, &RewriteOptions::default()).unwrap();
//!
//! if update.has_changes() {
//! 	print!("{}", update.unified_diff());
//! 	update.write().unwrap();
//! }
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use extract::*;
pub use fetcher::*;
pub use parser::*;
pub use render::*;

pub mod config;
pub mod document;
mod engine;
#[allow(unused_assignments)]
mod error;
mod extract;
pub mod fetcher;
pub(crate) mod lexer;
mod parser;
mod render;
pub(crate) mod tokens;

#[cfg(test)]
mod __fixtures;
