use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn embedmd_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("embedmd"));
	cmd.env("NO_COLOR", "1").env_remove("EMBEDMD_LOG");
	cmd
}

pub const HELLO_GO: &str = "package main\n\nfunc main() {\n\tprintln(\"hello\")\n}\n";

/// The document produced by embedding `hello.go` below a plain directive.
pub fn embedded_hello(directive: &str, language: &str) -> String {
	format!(
		"[embedmd]:# {directive}\n<!-- embedmd:begin {directive} -->\n```{language}\n{HELLO_GO}```\n<!-- embedmd:end -->\n"
	)
}
