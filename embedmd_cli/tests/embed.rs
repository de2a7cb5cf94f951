mod common;

use common::HELLO_GO;
use common::embedded_hello;
use embedmd_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use similar_asserts::assert_eq;

fn write_sources(root: &std::path::Path) -> AnyEmptyResult {
	std::fs::create_dir_all(root.join("code"))?;
	std::fs::write(root.join("code/hello.go"), HELLO_GO)?;
	Ok(())
}

#[test]
fn write_updates_documents_in_place() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_sources(tmp.path())?;
	std::fs::write(tmp.path().join("readme.md"), "[embedmd]:# (code/hello.go)\n")?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("--write")
		.arg("readme.md")
		.assert()
		.success()
		.stdout(predicates::str::contains("Updated 1 of 1 document(s)."));

	let content = std::fs::read_to_string(tmp.path().join("readme.md"))?;
	assert_eq!(content, embedded_hello("(code/hello.go)", "go"));

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("-w")
		.arg("readme.md")
		.assert()
		.success()
		.stdout(predicates::str::contains("already up to date"));

	Ok(())
}

#[test]
fn print_mode_writes_result_to_stdout() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_sources(tmp.path())?;
	let original = "[embedmd]:# (code/hello.go)\n";
	std::fs::write(tmp.path().join("readme.md"), original)?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("readme.md")
		.assert()
		.success()
		.stdout(embedded_hello("(code/hello.go)", "go"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		original
	);

	Ok(())
}

#[test]
fn references_resolve_from_document_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let docs = tmp.path().join("docs");
	write_sources(&docs)?;
	std::fs::write(docs.join("guide.md"), "[embedmd]:# (code/hello.go)\n")?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("-w")
		.arg("docs")
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(docs.join("guide.md"))?,
		embedded_hello("(code/hello.go)", "go")
	);

	Ok(())
}

#[test]
fn diff_reports_stale_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_sources(tmp.path())?;
	let original = "# Readme\n\n[embedmd]:# (code/hello.go go /func main/)\n";
	std::fs::write(tmp.path().join("readme.md"), original)?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("--diff")
		.arg("readme.md")
		.assert()
		.code(1)
		.stdout(
			predicates::str::contains("--- a/readme.md")
				.and(predicates::str::contains("+```go"))
				.and(predicates::str::contains("+func main() {"))
				.and(predicates::str::contains("out of date")),
		);

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		original
	);

	Ok(())
}

#[test]
fn diff_passes_when_up_to_date() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_sources(tmp.path())?;
	std::fs::write(
		tmp.path().join("readme.md"),
		embedded_hello("(code/hello.go)", "go"),
	)?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("-d")
		.arg("readme.md")
		.assert()
		.success()
		.stdout(predicates::str::contains("All documents are up to date."));

	Ok(())
}

#[test]
fn stdin_is_processed_against_current_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_sources(tmp.path())?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.write_stdin("[embedmd]:# (code/hello.go)\n")
		.assert()
		.success()
		.stdout(embedded_hello("(code/hello.go)", "go"));

	Ok(())
}

#[test]
fn stdin_cannot_be_written() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("-w")
		.write_stdin("text\n")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("--write"));

	Ok(())
}

#[test]
fn failing_document_does_not_stop_the_run() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_sources(tmp.path())?;
	let broken = "[embedmd]:# (code/missing.go)\n";
	std::fs::write(tmp.path().join("a.md"), broken)?;
	std::fs::write(tmp.path().join("b.md"), "[embedmd]:# (code/hello.go)\n")?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("-w")
		.arg("a.md")
		.arg("b.md")
		.assert()
		.code(2)
		.stderr(
			predicates::str::contains("a.md")
				.and(predicates::str::contains("could not be processed")),
		);

	assert_eq!(std::fs::read_to_string(tmp.path().join("a.md"))?, broken);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("b.md"))?,
		embedded_hello("(code/hello.go)", "go")
	);

	Ok(())
}

#[test]
fn malformed_directive_is_reported() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let original = "intro\n[embedmd]:# (code/hello.go go $)\n";
	std::fs::write(tmp.path().join("readme.md"), original)?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("-w")
		.arg("readme.md")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("malformed directive"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		original
	);

	Ok(())
}

#[test]
fn config_language_overrides_are_applied() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_sources(tmp.path())?;
	std::fs::write(tmp.path().join("embedmd.toml"), "[languages]\ngo = \"golang\"\n")?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.write_stdin("[embedmd]:# (code/hello.go)\n")
		.assert()
		.success()
		.stdout(embedded_hello("(code/hello.go)", "golang"));

	Ok(())
}

#[test]
fn explicit_config_path_is_used() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("custom.toml"), "[fetch\n")?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("--config")
		.arg("custom.toml")
		.write_stdin("text\n")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn legacy_fences_flag_replaces_bare_fence() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_sources(tmp.path())?;
	let legacy = "[embedmd]:# (code/hello.go)\n```go\nold\n```\n";

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.arg("--legacy-fences")
		.write_stdin(legacy)
		.assert()
		.success()
		.stdout(embedded_hello("(code/hello.go)", "go"));

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.write_stdin(legacy)
		.assert()
		.success()
		.stdout(predicates::str::contains("```go\nold\n```\n"));

	Ok(())
}

#[test]
fn remote_references_can_be_disabled() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join(".embedmd.toml"),
		"[fetch]\nallow_remote = false\n",
	)?;

	common::embedmd_cmd()
		.current_dir(tmp.path())
		.write_stdin("[embedmd]:# (https://example.com/hello.go)\n")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to fetch"));

	Ok(())
}
