//! Canonical query-string construction and MD5 request signatures.
//!
//! The API signs every authorized call by concatenating the sorted `key=value` pairs of
//! the request (without separators), appending the circuit secret, and hashing the result
//! with MD5. [`Params`] keeps values as JSON scalars so the same mapping can feed both the
//! signature and the transmitted query.

// crates.io
use md5::{Digest, Md5};
// self
use crate::_prelude::*;

/// Signature circuit derived from which credential fields are populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignatureCircuit {
	/// Neither circuit is usable; signing must fail.
	Undefined,
	/// Client application: the session secret key signs requests.
	ClientServer,
	/// Server application: `md5(access_token + app_secret_key)` signs requests.
	ServerServer,
}
impl SignatureCircuit {
	/// Picks a circuit from field presence, preferring server-server over client-server.
	pub const fn resolve(
		app_secret_key: bool,
		session_secret_key: bool,
		access_token: bool,
		app_key: bool,
	) -> Self {
		if app_secret_key && access_token && app_key {
			Self::ServerServer
		} else if session_secret_key && access_token && app_key {
			Self::ClientServer
		} else {
			Self::Undefined
		}
	}

	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Undefined => "undefined",
			Self::ClientServer => "client_server",
			Self::ServerServer => "server_server",
		}
	}
}
impl Display for SignatureCircuit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request parameters keyed by name; iteration is always in byte-wise key order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);
impl Params {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a parameter, builder style.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(key, value);

		self
	}

	/// Adds or replaces a parameter, returning the previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(key.into(), value.into())
	}

	/// Returns the raw value for `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns the rendered value for `key`, as it would be transmitted.
	pub fn get_str(&self, key: &str) -> Option<String> {
		self.0.get(key).map(render_value)
	}

	/// Removes `key`, returning its value.
	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.0.remove(key)
	}

	/// Returns `true` if `key` is present, whatever its value.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when there are no parameters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates parameters in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Drops every parameter whose value is empty or falsy.
	pub fn retain_truthy(&mut self) {
		self.0.retain(|_, value| is_truthy(value));
	}

	/// Copies every parameter of `other` into `self`, overriding duplicates.
	pub fn merge(&mut self, other: Params) {
		self.0.extend(other.0);
	}

	/// Rendered `(key, value)` pairs for transmission, in key order.
	pub fn to_pairs(&self) -> Vec<(String, String)> {
		self.0.iter().map(|(k, v)| (k.clone(), render_value(v))).collect()
	}
}
impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
impl<K, V> Extend<(K, V)> for Params
where
	K: Into<String>,
	V: Into<Value>,
{
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
	}
}
impl IntoIterator for Params {
	type IntoIter = std::collections::btree_map::IntoIter<String, Value>;
	type Item = (String, Value);

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Returns `false` for null, `false`, zero, and empty strings, lists, or objects.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(items) => !items.is_empty(),
		Value::Object(map) => !map.is_empty(),
	}
}

/// Renders a parameter value the way it is sent on the wire.
///
/// Strings are verbatim, lists are comma-joined, objects are serialized as JSON.
pub fn render_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
		other => other.to_string(),
	}
}

/// Builds the canonical signing string: sorted `key=value` pairs followed by `secret`.
pub fn params_to_str(params: &Params, secret: &str) -> String {
	let mut query = String::new();

	for (key, value) in params.iter().filter(|(_, value)| is_truthy(value)) {
		query.push_str(key);
		query.push('=');
		query.push_str(&render_value(value));
	}

	query.push_str(secret);

	query
}

/// Signs `params` with `secret`, returning the lowercase hex MD5 digest.
pub fn sign(params: &Params, secret: &str) -> String {
	md5_hex(&params_to_str(params, secret))
}

/// Effective secret of the server-server circuit: `md5(access_token + app_secret_key)`.
pub fn server_secret(access_token: &str, app_secret_key: &str) -> String {
	md5_hex(&format!("{access_token}{app_secret_key}"))
}

fn md5_hex(plain: &str) -> String {
	hex::encode(Md5::digest(plain.as_bytes()))
}
