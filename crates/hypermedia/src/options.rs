//! Per-request options: include paths, sort order, sparse fieldsets and the
//! naming override, plus the option sets handed to the codec.

use indexmap::IndexMap;

use crate::naming::FieldNaming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One `sort` term: `-created` is `{path: "created", direction: Descending}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub path: String,
    pub direction: SortDirection,
}

impl SortField {
    pub fn parse(term: &str) -> Option<Self> {
        let term = term.trim();
        let (path, direction) = match term.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Descending),
            None => (term.strip_prefix('+').unwrap_or(term), SortDirection::Ascending),
        };
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_owned(),
            direction,
        })
    }
}

/// Options parsed from a request's query string. Immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Dotted relationship paths, in request order.
    pub include: Vec<String>,
    pub sort: Vec<SortField>,
    /// Sparse fieldsets keyed by resource type.
    pub fields: IndexMap<String, Vec<String>>,
    /// Raw naming override; validated only when a strategy is selected.
    pub naming: Option<String>,
}

impl RequestOptions {
    /// Builds options from decoded `(key, value)` query pairs. Unknown keys
    /// are ignored.
    pub fn from_query<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            match key {
                "include" => options.include.extend(split_list(value)),
                "sort" => options.sort.extend(split_list(value).filter_map(|t| SortField::parse(&t))),
                "naming" => options.naming = Some(value.trim().to_owned()),
                _ => match key.strip_prefix("fields[").and_then(|k| k.strip_suffix(']')) {
                    Some(resource_type) if !resource_type.is_empty() => {
                        options
                            .fields
                            .entry(resource_type.to_owned())
                            .or_default()
                            .extend(split_list(value));
                    }
                    _ => tracing::trace!(target: "hypermedia::options", key, "ignoring query parameter"),
                },
            }
        }
        options
    }

    /// Parses a raw query string such as `include=a,b.c&fields%5Bposts%5D=title`.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(key), percent_decode(value))
            })
            .collect();
        Self::from_query(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Sets the naming override from a header value. A header wins over the
    /// query parameter.
    pub fn with_naming_header(mut self, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.naming = Some(value.trim().to_owned());
        }
        self
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = match bytes.get(i..i + 3) {
            Some([b'%', hi, lo]) => hex(*hi).zip(hex(*lo)),
            _ => None,
        };
        match (escaped, bytes[i]) {
            (Some((hi, lo)), _) => {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
            (None, b'+') => out.push(b' '),
            (None, b) => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// What [`crate::DocumentCodec::serialize`] emits.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializeOptions {
    pub include: Vec<String>,
    /// Sparse fieldsets: wire names of the attributes and relationships to
    /// keep, per resource type. Types without an entry keep everything.
    pub fields: IndexMap<String, Vec<String>>,
    pub naming: FieldNaming,
    /// Emit resource-level `self` links.
    pub resource_links: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            fields: IndexMap::new(),
            naming: FieldNaming::default(),
            resource_links: true,
        }
    }
}

impl SerializeOptions {
    pub fn new(naming: FieldNaming) -> Self {
        Self {
            naming,
            ..Self::default()
        }
    }

    pub fn include<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.include.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn fields<S: Into<String>>(mut self, resource_type: &str, names: impl IntoIterator<Item = S>) -> Self {
        self.fields
            .entry(resource_type.to_owned())
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether the member `name` of `resource_type` survives the sparse
    /// fieldset.
    pub(crate) fn keeps(&self, resource_type: &str, name: &str) -> bool {
        match self.fields.get(resource_type) {
            None => true,
            Some(keep) => keep.iter().any(|wire| self.naming.matches(wire, name)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    pub naming: FieldNaming,
}

impl DeserializeOptions {
    pub fn new(naming: FieldNaming) -> Self {
        Self { naming }
    }
}
