//! Stable anchors linking summary rows, failure entries and detail blocks.
//!
//! Anchors are a pure function of `(scope, parts)`. Each part is normalized
//! on its own (trimmed, lowercased, every character outside `[a-z0-9-]`
//! replaced by `-`) and parts are joined with `_`, which never survives
//! normalization, so two tuples map to the same id only when their
//! normalized parts are equal.

/// Region of the document an anchor points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorScope {
    Summary,
    Failure,
    Detail,
}

impl AnchorScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorScope::Summary => "summary",
            AnchorScope::Failure => "failure",
            AnchorScope::Detail => "detail",
        }
    }
}

const SEPARATOR: char = '_';
const SUBSTITUTE: char = '-';

/// A computed anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub id: String,
}

impl Anchor {
    /// `#id`, used by anything linking to this location.
    pub fn link_target(&self) -> String {
        format!("#{}", self.id)
    }

    /// `<a name="id"></a>`, emitted once at the location itself.
    pub fn declaration(&self) -> String {
        format!(r#"<a name="{}"></a>"#, self.id)
    }

    /// HTML link to this anchor.
    pub fn link(&self, label: &str) -> String {
        format!(r#"<a href="{}">{}</a>"#, self.link_target(), label)
    }
}

/// Compute the anchor for `scope` and the given key parts.
pub fn anchor(scope: AnchorScope, parts: &[&str]) -> Anchor {
    let mut id = String::from(scope.as_str());
    for part in parts {
        id.push(SEPARATOR);
        id.push_str(&normalize_part(part));
    }
    Anchor { id }
}

fn normalize_part(part: &str) -> String {
    part.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == SUBSTITUTE { c } else { SUBSTITUTE })
        .collect()
}
