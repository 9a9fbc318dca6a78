//! Fence configuration → element attributes
//!
//! One algorithm serves every widget kind; the kinds only differ by their
//! [`AttributeSpec`] table.

use super::{AttrRule, AttributeSpec, BoolStyle, ValueClass};
use crate::fence_config::{ConfigValue, FenceConfig};
use html_escape::encode_quoted_attribute;
use tracing::debug;

/// A single rendered attribute. `value: None` renders as a bare attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Render using single-quoted attribute syntax.
    pub fn to_html(&self) -> String {
        match &self.value {
            Some(value) => format!("{}='{}'", self.name, encode_quoted_attribute(value)),
            None => self.name.clone(),
        }
    }
}

/// Map a fence configuration to the ordered attribute list of one widget element.
///
/// Table entries come first, in table order, then every remaining key as `data-<key>`
/// in configuration order. Payload keys never become attributes.
pub fn serialize_attributes(config: &FenceConfig, spec: &AttributeSpec) -> Vec<Attribute> {
    let mut attrs = Vec::new();

    for rule in spec.rules {
        match rule.keys.iter().find_map(|key| config.get(key)) {
            Some(value) => {
                if let Some(attr) = render_rule(rule, value) {
                    attrs.push(attr);
                }
            }
            None => {
                if let Some(default) = rule.default {
                    attrs.push(Attribute::new(rule.attr, default));
                }
            }
        }
    }

    for (key, value) in config.iter() {
        if spec.claims(key) || spec.payload_keys.contains(&key) {
            continue;
        }
        if !is_attribute_token(key) {
            debug!(%key, "skipping fence config key that is not a valid attribute name");
            continue;
        }
        attrs.push(Attribute::new(format!("data-{key}"), value.to_string()));
    }

    attrs
}

fn render_rule(rule: &AttrRule, value: &ConfigValue) -> Option<Attribute> {
    match (rule.class, value) {
        (ValueClass::Boolean(style), ConfigValue::Bool(flag)) => match (style, *flag) {
            (BoolStyle::Literal, flag) => Some(Attribute::new(rule.attr, flag.to_string())),
            (BoolStyle::Presence | BoolStyle::PresenceOrFalse, true) => {
                Some(Attribute::bare(rule.attr))
            }
            (BoolStyle::Presence, false) => None,
            (BoolStyle::PresenceOrFalse, false) => Some(Attribute::new(rule.attr, "false")),
        },
        _ => {
            let rendered = value.to_string();
            match rule.default {
                Some(default) if rendered.trim().is_empty() => {
                    Some(Attribute::new(rule.attr, default))
                }
                _ => Some(Attribute::new(rule.attr, rendered)),
            }
        }
    }
}

fn is_attribute_token(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}
