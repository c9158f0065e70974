//! Accent- and case-insensitive name matching.
//!
//! Player names are full of diacritics ("Özil", "Müller", "Ødegaard") that
//! players rarely type, so searches and orderings compare folded forms.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Decompose, drop combining marks, lowercase and trim.
pub fn normalize_text(value: &str) -> String {
	value
		.nfd()
		.filter(|c| !is_combining_mark(*c))
		.collect::<String>()
		.to_lowercase()
		.trim()
		.to_string()
}

/// Order names by their folded form, falling back to the raw text so the
/// ordering stays total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
	normalize_text(a)
		.cmp(&normalize_text(b))
		.then_with(|| a.cmp(b))
}

/// Whether `name` contains the already-normalized `needle`.
pub fn matches(name: &str, needle: &str) -> bool {
	needle.is_empty() || normalize_text(name).contains(needle)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn folds_accents_and_case() {
		assert_eq!(normalize_text("  Mesut Özil "), "mesut ozil");
		assert_eq!(normalize_text("Thomas MÜLLER"), "thomas muller");
		assert_eq!(normalize_text(""), "");
	}

	#[test]
	fn accented_and_lowercase_names_sort_with_their_letter() {
		let mut names = vec!["zed", "Zlatan", "Édouard", "Adam", "eric"];
		names.sort_by(|a, b| compare_names(a, b));
		assert_eq!(names, ["Adam", "Édouard", "eric", "zed", "Zlatan"]);
	}

	#[test]
	fn plain_needle_finds_accented_name() {
		assert!(matches("Mesut Özil", &normalize_text("ozil")));
		assert!(matches("Mesut Özil", &normalize_text("ÖZIL")));
		assert!(!matches("Mesut Özil", &normalize_text("kroos")));
		assert!(matches("anyone", ""));
	}
}
