//! Fence body configuration
//!
//!     A widget fence carries a small YAML header followed by a free-text payload (PGN, PBN
//!     or SGF). The two halves are split by the first line that holds nothing but `---`:
//!
//!         ```sbs-bridge
//!         lang: "zh"
//!         ---
//!         [Event "World Bridge Championship"]
//!         ```
//!
//!     Without a separator the whole body is tried as a YAML mapping. Anything that does not
//!     decode to a mapping is treated as payload text with an empty configuration, so a
//!     malformed header never fails a render.

use serde_yaml::{Mapping, Value};
use std::fmt;
use tracing::debug;

/// Scalar value held by a [`FenceConfig`] entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn from_yaml(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ConfigValue::Str(s)),
            Value::Bool(b) => Some(ConfigValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ConfigValue::Int(i))
                } else if n.is_u64() {
                    // too large for i64, keep the literal digits
                    Some(ConfigValue::Str(n.to_string()))
                } else {
                    n.as_f64().map(ConfigValue::Float)
                }
            }
            Value::Tagged(tagged) => Self::from_yaml(tagged.value),
            Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Str(s) => f.write_str(s),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Int(i) => write!(f, "{i}"),
            // whole floats keep their decimal point: `400.0` stays `400.0`
            ConfigValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            ConfigValue::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Ordered key/value configuration decoded from one fence body.
///
/// Keys are unique and keep the order in which they were written, so generic `data-*`
/// attributes come out in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FenceConfig {
    entries: Vec<(String, ConfigValue)>,
}

impl FenceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builder-style insert, replacing any previous value for `key`.
    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.insert(key.into(), value);
        self
    }

    /// First of `keys` that holds a value, rendered as text.
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|key| self.get(key))
            .map(ToString::to_string)
    }

    fn insert(&mut self, key: String, value: ConfigValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn from_mapping(mapping: Mapping) -> Self {
        let mut config = Self::new();
        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    debug!(?other, "skipping non-scalar fence config key");
                    continue;
                }
            };
            match ConfigValue::from_yaml(value) {
                Some(value) => config.insert(key, value),
                None => debug!(%key, "dropping null or nested fence config value"),
            }
        }
        config
    }
}

/// Parse a fence body into its configuration.
///
/// Payload text, when present, is stored under `payload_key`. This never fails: bodies
/// that are not a YAML mapping degrade to "whole body is payload".
pub fn parse_fence_config(raw: &str, payload_key: &str) -> FenceConfig {
    if raw.trim().is_empty() {
        return FenceConfig::new();
    }

    if let Some((header, payload)) = split_at_separator(raw) {
        if let Some(config) = parse_mapping(header) {
            return config.with(payload_key, ConfigValue::Str(payload.trim().to_string()));
        }
    }

    if let Some(config) = parse_mapping(raw) {
        return config;
    }

    debug!(payload_key, "fence body is not a config mapping; using it as payload");
    FenceConfig::new().with(payload_key, ConfigValue::Str(raw.to_string()))
}

/// Split on the first line consisting solely of `---`.
fn split_at_separator(raw: &str) -> Option<(&str, &str)> {
    let mut pos = 0usize;
    for line in raw.split_inclusive('\n') {
        if line.trim() == "---" {
            return Some((&raw[..pos], &raw[pos + line.len()..]));
        }
        pos += line.len();
    }
    None
}

fn parse_mapping(text: &str) -> Option<FenceConfig> {
    if text.trim().is_empty() {
        return Some(FenceConfig::new());
    }
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Mapping(mapping)) => Some(FenceConfig::from_mapping(mapping)),
        Ok(_) => None,
        Err(err) => {
            debug!(%err, "fence config is not valid YAML");
            None
        }
    }
}
