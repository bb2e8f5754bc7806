//! Ordered, attribute-keyed validation failures.
//!
//! An [`ErrorSet`] is the single accumulation point for everything the
//! lifecycle learns about an operation: declared rules append to it, hooks
//! may append to it, and the engine's gates check nothing but its emptiness.
//!
//! # Key Properties
//!
//! - **Insertion order is preserved**: entries render in the order they were
//!   added, superclass rules first.
//! - **Duplicates are retained**: adding `(attribute, kind)` twice produces
//!   two entries. Deduplication, if wanted, belongs in the rule that adds.
//! - **Nothing is ever removed**: there is no `remove`/`clear` operation on
//!   the public surface.
//! - **Rendering is lazy and restartable**: [`ErrorSet::rendered_messages`]
//!   recomputes every message on each call, so an entry added after one
//!   render shows up in the next.
//!
//! # Example
//!
//! ```ignore
//! use camshaft::{ErrorEntry, ErrorSet, kind};
//!
//! let mut errors = ErrorSet::new();
//! errors.add("email", kind::BLANK);
//! errors.push(
//!     ErrorEntry::new("bio", kind::TOO_LONG).with_option("count", 500),
//! );
//!
//! assert_eq!(
//!     errors.to_sentence(),
//!     "Email can't be blank and Bio is too long (maximum is 500 characters)"
//! );
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Well-known error kinds with built-in message templates.
///
/// A kind is just a symbolic code; any `&'static str` works. Kinds not
/// listed here render as "is invalid" unless the entry carries its own
/// message template.
pub mod kind {
    /// Required value was missing or empty.
    pub const BLANK: &str = "blank";
    /// Value failed a format or content check.
    pub const INVALID: &str = "invalid";
    /// Value collides with an existing one.
    pub const TAKEN: &str = "taken";
    /// Value is below a minimum length. Template reads `%{count}`.
    pub const TOO_SHORT: &str = "too_short";
    /// Value exceeds a maximum length. Template reads `%{count}`.
    pub const TOO_LONG: &str = "too_long";
}

fn default_message(kind: &str) -> &'static str {
    match kind {
        kind::BLANK => "can't be blank",
        kind::TAKEN => "has already been taken",
        kind::TOO_SHORT => "is too short (minimum is %{count} characters)",
        kind::TOO_LONG => "is too long (maximum is %{count} characters)",
        _ => "is invalid",
    }
}

/// A single validation failure.
///
/// `attribute` is `None` for object-level failures (the whole operation is
/// wrong, not one field of it). `options` feed `%{key}` placeholders in the
/// message template; `message` overrides the kind's built-in template.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    /// The attribute this failure is scoped to, or `None` for object-level.
    pub attribute: Option<&'static str>,
    /// Symbolic failure code (see [`kind`]).
    pub kind: &'static str,
    /// Values interpolated into `%{key}` placeholders when rendering.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
    /// Custom message template, overriding the kind's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorEntry {
    /// Create an attribute-scoped entry.
    pub fn new(attribute: &'static str, kind: &'static str) -> Self {
        Self {
            attribute: Some(attribute),
            kind,
            options: Map::new(),
            message: None,
        }
    }

    /// Create an object-level entry (no target attribute).
    pub fn base(kind: &'static str) -> Self {
        Self {
            attribute: None,
            kind,
            options: Map::new(),
            message: None,
        }
    }

    /// Attach an option, readable from the message template as `%{key}`.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Override the kind's default message template.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Render this entry as a human-readable message.
    ///
    /// Attribute-scoped entries read as "Attribute message"; object-level
    /// entries render the message alone.
    pub fn render(&self) -> String {
        let template = self
            .message
            .as_deref()
            .unwrap_or_else(|| default_message(self.kind));
        let message = interpolate(template, &self.options);
        match self.attribute {
            Some(attribute) => format!("{} {}", humanize(attribute), message),
            None => message,
        }
    }
}

/// Replace `%{key}` placeholders with values from `options`.
///
/// Unknown keys are left in place so a bad template is visible rather than
/// silently blanked.
fn interpolate(template: &str, options: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match options.get(key) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        out.push_str("%{");
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// "account_name" -> "Account name".
fn humanize(attribute: &str) -> String {
    let spaced = attribute.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Ordered collection of validation failures.
///
/// Owned by exactly one [`crate::Op`] and touched only during that
/// instance's single-threaded lifecycle, so no synchronization is needed
/// or provided.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ErrorSet {
    entries: Vec<ErrorEntry>,
}

impl ErrorSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute-scoped failure with no options.
    pub fn add(&mut self, attribute: &'static str, kind: &'static str) {
        self.push(ErrorEntry::new(attribute, kind));
    }

    /// Append an object-level failure.
    pub fn add_to_base(&mut self, kind: &'static str) {
        self.push(ErrorEntry::base(kind));
    }

    /// Append a fully-built entry.
    pub fn push(&mut self, entry: ErrorEntry) {
        self.entries.push(entry);
    }

    /// True when no failure has been recorded. The lifecycle's `success`
    /// predicate is exactly this, re-evaluated at every read.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The entries in insertion order.
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ErrorEntry> {
        self.entries.iter()
    }

    /// Lazily render every entry, in order. Recomputed on each call.
    pub fn rendered_messages(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(ErrorEntry::render)
    }

    /// Join the rendered messages with a natural-language conjunction:
    /// "a", "a and b", "a, b, and c". Empty set renders as "".
    pub fn to_sentence(&self) -> String {
        let messages: Vec<String> = self.rendered_messages().collect();
        match messages.as_slice() {
            [] => String::new(),
            [one] => one.clone(),
            [first, second] => format!("{first} and {second}"),
            [head @ .., last] => format!("{}, and {last}", head.join(", ")),
        }
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sentence())
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
