use std::sync::LazyLock;

use regex::Regex;

static PLAIN_CHARSET: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^\p{L}[\p{L}\s,'\-]*$").ok());

/// Collapses runs of whitespace into single spaces and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a description already reads as plain language.
///
/// Plain descriptions contain only words separated by spaces, commas, hyphens and
/// apostrophes. Codes, `key: value` fragments, underscores, digits, all-caps abbreviations
/// and mixed-case tokens such as "aPET" all count as technical.
pub fn is_plain_description(text: &str) -> bool {
	let text = normalize_whitespace(text);

	if text.is_empty() {
		return false;
	}

	let Some(charset) = PLAIN_CHARSET.as_ref() else {
		return false;
	};

	if !charset.is_match(&text) {
		return false;
	}

	text.split(|c: char| !c.is_alphabetic()).filter(|token| !token.is_empty()).all(is_plain_word)
}

fn is_plain_word(token: &str) -> bool {
	let mut chars = token.chars();
	let Some(_) = chars.next() else {
		return true;
	};

	// Only the first letter may be uppercase.
	chars.all(|c| !c.is_uppercase())
}
