//! Field naming strategies mapping logical member names to wire names.
//!
//! Logical names are whatever the contract declares (`OwnerUserId`,
//! `owner_user_id`, ...). Every strategy first splits the name into words at
//! separators (`-`, `_`, space) and case boundaries, then joins them again in
//! its own style.

use serde::Deserialize;

/// A stateless naming strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldNaming {
    /// Names are written exactly as declared.
    #[serde(alias = "identity")]
    None,
    /// `ownerUserId`
    #[serde(alias = "camel-case", alias = "camelcase")]
    Camel,
    /// `owner-user-id`
    #[default]
    #[serde(alias = "kebab", alias = "kebab-case")]
    Dash,
    /// `owner_user_id`
    #[serde(alias = "snake-case", alias = "snake_case")]
    Snake,
}

impl FieldNaming {
    /// Parses a per-request override value. Unrecognized values yield `None`
    /// so the caller falls through to the configured default.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "identity" => Some(Self::None),
            "camel" | "camel-case" | "camelcase" => Some(Self::Camel),
            "dash" | "kebab" | "kebab-case" => Some(Self::Dash),
            "snake" | "snake-case" | "snake_case" => Some(Self::Snake),
            _ => None,
        }
    }

    /// Selects the effective strategy: request override, then endpoint
    /// default, then the global default.
    pub fn select(
        request_override: Option<&str>,
        endpoint_default: Option<FieldNaming>,
        global_default: FieldNaming,
    ) -> FieldNaming {
        if let Some(raw) = request_override {
            match Self::parse(raw) {
                Some(naming) => return naming,
                None => tracing::debug!(
                    target: "hypermedia::options",
                    value = raw,
                    "ignoring unrecognized naming override"
                ),
            }
        }
        endpoint_default.unwrap_or(global_default)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Camel => "camel",
            Self::Dash => "dash",
            Self::Snake => "snake",
        }
    }

    /// Maps a logical name to its wire name.
    pub fn to_wire(self, name: &str) -> String {
        match self {
            Self::None => name.to_owned(),
            Self::Camel => {
                let mut out = String::with_capacity(name.len());
                for (i, word) in split_words(name).iter().enumerate() {
                    if i == 0 {
                        out.push_str(&word.to_lowercase());
                    } else {
                        push_capitalized(&mut out, word);
                    }
                }
                out
            }
            Self::Dash => join_lower(name, '-'),
            Self::Snake => join_lower(name, '_'),
        }
    }

    /// Best-effort inverse of [`FieldNaming::to_wire`], producing a
    /// PascalCase logical name. Not exact for names whose original casing
    /// cannot be recovered (`HTTPServer` comes back as `HttpServer`).
    pub fn from_wire(self, name: &str) -> String {
        match self {
            Self::None => name.to_owned(),
            Self::Camel | Self::Dash | Self::Snake => {
                let mut out = String::with_capacity(name.len());
                for word in split_words(name) {
                    push_capitalized(&mut out, word);
                }
                out
            }
        }
    }

    /// Whether `wire` names the logical member `name`: an exact match under
    /// this strategy, or else a match ignoring case and separators.
    pub fn matches(self, wire: &str, name: &str) -> bool {
        self.to_wire(name) == wire || squash(wire) == squash(name)
    }
}

impl std::fmt::Display for FieldNaming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_lower(name: &str, sep: char) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, word) in split_words(name).iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(&word.to_lowercase());
    }
    out
}

fn push_capitalized(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(&chars.as_str().to_lowercase());
    }
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Splits a name into words at separators and case boundaries.
///
/// An uppercase run followed by a lowercase letter keeps its last capital for
/// the next word: `HTTPServer` → `HTTP`, `Server`.
pub(crate) fn split_words(name: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut start: Option<usize> = None;
    for (i, &(pos, ch)) in chars.iter().enumerate() {
        if matches!(ch, '-' | '_' | ' ') {
            if let Some(s) = start.take() {
                words.push(&name[s..pos]);
            }
            continue;
        }
        let Some(s) = start else {
            start = Some(pos);
            continue;
        };
        if ch.is_uppercase() {
            let prev = chars[i - 1].1;
            let next_is_lower = chars.get(i + 1).is_some_and(|&(_, c)| c.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && s < pos {
                words.push(&name[s..pos]);
                start = Some(pos);
            }
        }
    }
    if let Some(s) = start {
        words.push(&name[s..]);
    }
    words
}
