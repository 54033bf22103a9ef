//! HTML form scraping for the browser-style login and consent dialogs.

// crates.io
use scraper::{ElementRef, Html};
// self
use crate::_prelude::*;

/// Submission target and field values scraped from one HTML document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
	/// `action` attribute of the first `<form method="post">`, empty if none was found.
	pub url: String,
	/// `name → value` of every `<input>` that is not a submit button.
	pub fields: BTreeMap<String, String>,
}
impl Form {
	/// Parses `html` into the first POST form target and its input fields.
	///
	/// Inputs are collected from the whole document. Inputs without a `name` are skipped
	/// and a missing `value` reads as an empty string.
	pub fn parse(html: &str) -> Self {
		let document = Html::parse_document(html);
		let mut form = Self::default();
		let mut action = None;

		for element in document.root_element().descendants().filter_map(ElementRef::wrap) {
			let node = element.value();

			match node.name() {
				"form" if action.is_none() => {
					if node.attr("method").is_some_and(|m| m.eq_ignore_ascii_case("post")) {
						action = Some(node.attr("action").unwrap_or_default().to_owned());
					}
				},
				"input" => {
					if node.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("submit")) {
						continue;
					}
					if let Some(name) = node.attr("name") {
						form.fields
							.insert(name.to_owned(), node.attr("value").unwrap_or_default().to_owned());
					}
				},
				_ => {},
			}
		}

		form.url = action.unwrap_or_default();

		form
	}

	/// Sets or replaces a field value.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.fields.insert(name.into(), value.into());
	}

	/// Field values as `(name, value)` pairs ready for a form-encoded body.
	pub fn to_pairs(&self) -> Vec<(String, String)> {
		self.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const LOGIN_DIALOG: &str = r#"<!DOCTYPE html>
<html><body>
  <form method="get" action="/search"><input name="q" value="ignored-target"></form>
  <form method="POST" action="/dk?st.cmd=OAuth2Login&amp;cmd=submit">
    <input type="hidden" name="st.redirect" value="/oauth/authorize">
    <input type="text" name="fr.email">
    <input type="password" name="fr.password" value="">
    <input type="submit" name="button_login" value="Log in">
    <input type="hidden" value="nameless">
  </form>
  <form method="post" action="/second"></form>
</body></html>"#;

	#[test]
	fn parses_first_post_form_and_inputs() {
		let form = Form::parse(LOGIN_DIALOG);

		assert_eq!(form.url, "/dk?st.cmd=OAuth2Login&cmd=submit");
		assert_eq!(form.fields.get("st.redirect").map(String::as_str), Some("/oauth/authorize"));
		assert_eq!(form.fields.get("fr.email").map(String::as_str), Some(""));
		assert_eq!(form.fields.get("fr.password").map(String::as_str), Some(""));
		assert_eq!(form.fields.get("q").map(String::as_str), Some("ignored-target"));
		assert!(!form.fields.contains_key("button_login"));
		assert_eq!(form.fields.len(), 4);
	}

	#[test]
	fn missing_form_yields_empty_target() {
		let form = Form::parse("<p>No dialog here.</p>");

		assert!(form.url.is_empty());
		assert!(form.fields.is_empty());
	}

	#[test]
	fn set_overrides_scraped_values() {
		let mut form = Form::parse(LOGIN_DIALOG);

		form.set("fr.email", "user@example.com");
		form.set("fr.password", "hunter2");

		let pairs = form.to_pairs();

		assert!(pairs.contains(&("fr.email".into(), "user@example.com".into())));
		assert!(pairs.contains(&("fr.password".into(), "hunter2".into())));
	}
}
