use std::sync::OnceLock;

use regex::Regex;

/// Splits raw track-file text into records and reads named fields out of them.
///
/// Field values are returned as raw text; typing is the caller's concern.
pub trait RecordExtractor {
	fn records<'a>(&self, text: &'a str) -> Vec<&'a str>;

	fn field<'a>(&self, record: &'a str, name: &str) -> Option<&'a str>;
}

/// Extracts `<trkpt>` elements from GPX text.
///
/// A field is looked up first as a child element (`<ele>12.5</ele>`) and then as
/// an attribute of the opening tag (`lat="40.1"`).
#[derive(Debug, Default, Clone, Copy)]
pub struct GpxExtractor;

impl RecordExtractor for GpxExtractor {
	fn records<'a>(&self, text: &'a str) -> Vec<&'a str> {
		trkpt_pattern().find_iter(text).map(|m| m.as_str()).collect()
	}

	fn field<'a>(&self, record: &'a str, name: &str) -> Option<&'a str> {
		element_text(record, name).or_else(|| attribute_value(opening_tag(record), name))
	}
}

/// A whole `<trkpt>` element, or a self-closing one.
fn trkpt_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| Regex::new(r"(?s)<trkpt\b[^>]*?/>|<trkpt\b.*?</trkpt>").expect("Valid regex"))
}

/// A leaf element: group 1 is the opening name, group 2 the text, group 3 the closing name.
fn element_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| Regex::new(r"<([\w:.-]+)(?:\s[^>]*)?>([^<]*)</([\w:.-]+)\s*>").expect("Valid regex"))
}

/// A quoted attribute: group 1 is the name, group 2 or 3 the value.
fn attribute_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| {
		Regex::new(r#"(?:^|\s)([\w:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Valid regex")
	})
}

fn opening_tag(record: &str) -> &str {
	record.find('>').map_or(record, |end| &record[..end])
}

fn element_text<'a>(record: &'a str, name: &str) -> Option<&'a str> {
	element_pattern()
		.captures_iter(record)
		.find(|caps| caps.get(1).is_some_and(|m| m.as_str() == name) && caps.get(3).is_some_and(|m| m.as_str() == name))
		.and_then(|caps| caps.get(2))
		.map(|m| m.as_str().trim())
}

fn attribute_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
	attribute_pattern()
		.captures_iter(tag)
		.find(|caps| caps.get(1).is_some_and(|m| m.as_str() == name))
		.and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
		.map(|m| m.as_str().trim())
}
