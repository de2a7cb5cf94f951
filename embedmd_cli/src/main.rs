use std::path::Path;
use std::process;

use clap::Parser;
use embedmd_cli::EmbedmdCli;
use embedmd_cli::OutputMode;
use embedmd_core::ContentFetcher;
use embedmd_core::EmbedConfig;
use embedmd_core::EmbedError;
use embedmd_core::RewriteOptions;
use embedmd_core::document::DocumentUpdate;
use embedmd_core::document::collect_documents;
use embedmd_core::document::process_file;
use embedmd_core::document::process_str;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "EMBEDMD_LOG";

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,cyan) => {
		if color_enabled() {
			format!("{}", $text.cyan())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

/// Counts gathered while processing documents, used for the exit status.
#[derive(Debug, Default)]
struct RunSummary {
	processed: usize,
	changed: usize,
	failed: usize,
}

impl RunSummary {
	fn exit_code(&self, mode: OutputMode) -> i32 {
		if self.failed > 0 {
			2
		} else if mode == OutputMode::Diff && self.changed > 0 {
			1
		} else {
			0
		}
	}
}

fn main() {
	let args = EmbedmdCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	match run(&args) {
		Ok(summary) => process::exit(summary.exit_code(args.output_mode())),
		Err(e) => {
			match e.downcast::<EmbedError>() {
				Ok(embed_err) => {
					let report: miette::Report = (*embed_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `EMBEDMD_LOG` takes precedence over the verbosity flag.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn load_config(args: &EmbedmdCli) -> Result<EmbedConfig, Box<dyn std::error::Error>> {
	if let Some(path) = &args.config {
		debug!(path = %path.display(), "loading config");
		return Ok(EmbedConfig::load_file(path)?);
	}

	let root = std::env::current_dir()?;
	Ok(EmbedConfig::load(&root)?.unwrap_or_default())
}

/// Read the bearer token once from the variable named in the config.
fn resolve_token(config: &EmbedConfig) -> Option<String> {
	let name = config.fetch.token_env.as_str();
	if name.is_empty() {
		return None;
	}

	std::env::var(name).ok()
}

fn run(args: &EmbedmdCli) -> Result<RunSummary, Box<dyn std::error::Error>> {
	let config = load_config(args)?;
	let mut options = config.rewrite_options();
	options.legacy_fences |= args.legacy_fences;

	let fetcher = ContentFetcher::new(config.fetch_options(resolve_token(&config)));
	let mode = args.output_mode();

	if args.reads_stdin() {
		return run_stdin(&fetcher, &options, mode);
	}

	let documents = collect_documents(&args.paths)?;
	let mut summary = RunSummary::default();

	for path in &documents {
		summary.processed += 1;

		let result = process_file(path, &fetcher, &options)
			.and_then(|update| report_update(&update, mode, args.verbose));

		match result {
			Ok(true) => summary.changed += 1,
			Ok(false) => {}
			Err(e) => {
				summary.failed += 1;
				print_document_error(path, e);
			}
		}
	}

	print_summary(&summary, mode);
	Ok(summary)
}

fn run_stdin(
	fetcher: &ContentFetcher,
	options: &RewriteOptions,
	mode: OutputMode,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
	if mode == OutputMode::Write {
		return Err("`--write` cannot be used when reading from standard input".into());
	}

	let text = std::io::read_to_string(std::io::stdin())?;
	let base_dir = std::env::current_dir()?;
	let update = process_str(text, &base_dir, fetcher, options)?;

	let changed = report_update(&update, mode, false)?;
	Ok(RunSummary {
		processed: 1,
		changed: usize::from(changed),
		failed: 0,
	})
}

/// Print or persist one processed document. Returns whether it changed.
fn report_update(
	update: &DocumentUpdate,
	mode: OutputMode,
	verbose: bool,
) -> Result<bool, EmbedError> {
	match mode {
		OutputMode::Print => print!("{}", update.updated),
		OutputMode::Write => {
			if update.write()? && verbose {
				println!("  {}", update.name());
			}
		}
		OutputMode::Diff => print_diff(&update.unified_diff()),
	}

	Ok(update.has_changes())
}

fn print_summary(summary: &RunSummary, mode: OutputMode) {
	let ok = summary.processed - summary.failed;

	match mode {
		OutputMode::Print => {}
		OutputMode::Write if summary.changed == 0 && summary.failed == 0 => {
			println!("All documents are already up to date.");
		}
		OutputMode::Write => {
			println!(
				"Updated {} of {ok} document(s).",
				summary.changed
			);
		}
		OutputMode::Diff if summary.changed == 0 && summary.failed == 0 => {
			println!("All documents are up to date.");
		}
		OutputMode::Diff => {
			println!(
				"\n{} of {ok} document(s) out of date. Run `embedmd -w` to update them.",
				summary.changed
			);
		}
	}

	if summary.failed > 0 {
		eprintln!(
			"{} {} document(s) could not be processed.",
			colored!("error:", red),
			summary.failed
		);
	}
}

/// Print a unified diff, coloring added and removed lines.
fn print_diff(diff: &str) {
	for line in diff.split_inclusive('\n') {
		if line.starts_with("+++") || line.starts_with("---") {
			print!("{}", colored!(line, bold));
		} else if line.starts_with("@@") {
			print!("{}", colored!(line, cyan));
		} else if line.starts_with('+') {
			print!("{}", colored!(line, green));
		} else if line.starts_with('-') {
			print!("{}", colored!(line, red));
		} else {
			print!("{line}");
		}
	}
}

fn print_document_error(path: &Path, error: EmbedError) {
	eprintln!(
		"{} {}",
		colored!("error:", red),
		colored!(path.display(), bold)
	);
	let report: miette::Report = error.into();
	eprintln!("{report:?}");
}
