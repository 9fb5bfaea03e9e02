use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use serde::Serialize;

/// `<crate version>-<git sha>-<target triple>`, shown by `--version`.
pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default() | Effects::BOLD)
		.usage(AnsiColor::Green.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Yellow.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Renders command output as JSON, indented when `pretty` is set.
pub fn render_json<T>(value: &T, pretty: bool) -> serde_json::Result<String>
where
	T: Serialize,
{
	if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) }
}
