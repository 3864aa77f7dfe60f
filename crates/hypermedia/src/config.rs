//! Codec configuration, loadable from TOML.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Result;
use crate::naming::FieldNaming;
use crate::options::{DeserializeOptions, RequestOptions, SerializeOptions};

/// Naming and link settings shared by every codec call.
///
/// # Example
///
/// ```toml
/// # Global default: "none", "camel", "dash" (default) or "snake"
/// default_naming = "dash"
///
/// # Honour `naming=` query parameters and headers (default: true)
/// allow_override = true
///
/// # Emit resource-level `self` links (default: true)
/// resource_links = true
///
/// [endpoints]
/// legacy-users = "camel"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    #[serde(default)]
    pub default_naming: FieldNaming,
    /// Per-endpoint naming defaults.
    #[serde(default)]
    pub endpoints: HashMap<String, FieldNaming>,
    #[serde(default = "default_true")]
    pub allow_override: bool,
    #[serde(default = "default_true")]
    pub resource_links: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_naming: FieldNaming::default(),
            endpoints: HashMap::new(),
            allow_override: true,
            resource_links: true,
        }
    }
}

impl CodecConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Selects the naming strategy for one request: the override (when
    /// allowed and recognized), then the endpoint default, then the global
    /// default.
    pub fn naming_for(&self, endpoint: Option<&str>, request_override: Option<&str>) -> FieldNaming {
        let request_override = request_override.filter(|_| self.allow_override);
        let endpoint_default = endpoint.and_then(|name| self.endpoints.get(name).copied());
        FieldNaming::select(request_override, endpoint_default, self.default_naming)
    }

    pub fn serialize_options(&self, endpoint: Option<&str>, request: &RequestOptions) -> SerializeOptions {
        SerializeOptions {
            include: request.include.clone(),
            fields: request.fields.clone(),
            naming: self.naming_for(endpoint, request.naming.as_deref()),
            resource_links: self.resource_links,
        }
    }

    pub fn deserialize_options(&self, endpoint: Option<&str>, request: &RequestOptions) -> DeserializeOptions {
        DeserializeOptions::new(self.naming_for(endpoint, request.naming.as_deref()))
    }
}
