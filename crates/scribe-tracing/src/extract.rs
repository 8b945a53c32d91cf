//! Attribute names and the default extraction rules.

use scribe_core::{Action, Payload, Value};

use crate::attr::Attr;

/// Attribute holding the entity key, e.g. `entity = "user:123"`.
pub const ATTR_ENTITY: &str = "entity";

/// Attribute holding the action: `create`, `update` or `delete`.
pub const ATTR_ACTION: &str = "action";

/// Attribute holding the author of the change.
pub const ATTR_AUTHOR: &str = "author";

/// Alternative attribute for the author.
pub const ATTR_USER: &str = "user";

/// Author recorded when no author attribute is present.
pub const DEFAULT_AUTHOR: &str = "system";

const RESERVED: [&str; 4] = [ATTR_ENTITY, ATTR_ACTION, ATTR_AUTHOR, ATTR_USER];

/// Returns a key extractor reading the first attribute named `name`.
///
/// ```rust
/// use scribe_tracing::{attr_extractor, Attr};
///
/// let extract = attr_extractor("entity");
/// assert_eq!(extract(&[Attr::new("entity", "user:1")]), Some("user:1".to_string()));
/// assert_eq!(extract(&[Attr::new("other", "x")]), None);
/// ```
pub fn attr_extractor(name: &str) -> impl Fn(&[Attr]) -> Option<String> + Send + Sync + 'static {
    let name = name.to_owned();
    move |attrs| {
        attrs
            .iter()
            .find(|attr| attr.key == name)
            .map(|attr| attr.as_text().into_owned())
    }
}

/// Reads the action from the first [`ATTR_ACTION`] attribute.
///
/// Missing or unrecognised actions become [`Action::Create`].
#[must_use]
pub fn default_action_extractor(attrs: &[Attr]) -> Action {
    attrs
        .iter()
        .find(|attr| attr.key == ATTR_ACTION)
        .map_or(Action::Create, |attr| Action::parse_or_default(&attr.as_text()))
}

/// Reads the author from the first [`ATTR_AUTHOR`] or [`ATTR_USER`]
/// attribute, falling back to [`DEFAULT_AUTHOR`].
#[must_use]
pub fn default_author_extractor(attrs: &[Attr]) -> String {
    attrs
        .iter()
        .find(|attr| attr.key == ATTR_AUTHOR || attr.key == ATTR_USER)
        .map_or_else(|| DEFAULT_AUTHOR.to_string(), |attr| attr.as_text().into_owned())
}

/// Turns every attribute except the reserved ones into a plain payload
/// value. A later attribute with the same name replaces an earlier one.
#[must_use]
pub fn default_payload_extractor(attrs: &[Attr]) -> Payload {
    attrs
        .iter()
        .filter(|attr| !RESERVED.contains(&attr.key.as_str()))
        .map(|attr| (attr.key.clone(), Value::plain(attr.value.clone())))
        .collect()
}
