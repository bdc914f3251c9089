//! Field mapping
//!
//! Projects nested API response objects onto the flat domain-property bag
//! declared by each kind's mapping table. Fields whose source path is
//! missing or null are omitted from the result entirely, never stored as
//! null placeholders.
//!
//! Kind-specific transformations (deriving booleans from feature arrays,
//! synthesizing image slugs) live in registered post-processors keyed by
//! the kind definition, keeping this module free of per-resource
//! knowledge.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Walk a dot-separated path through a JSON tree.
///
/// Short-circuits to `None` the moment any segment is missing or null.
/// Numeric segments index into arrays.
pub fn get_path<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = obj;

    for part in path.split('.') {
        current = if let Ok(idx) = part.parse::<usize>() {
            current.get(idx)?
        } else {
            current.get(part)?
        };
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Apply a kind's mapping table to one raw API object.
pub fn map_fields(raw: &Value, mappings: &BTreeMap<String, String>) -> Map<String, Value> {
    let mut domain = Map::new();

    for (domain_field, source_path) in mappings {
        if let Some(value) = get_path(raw, source_path) {
            domain.insert(domain_field.clone(), value.clone());
        }
    }

    domain
}

/// Kind-specific post-processing, applied after generic mapping. May
/// overwrite or add fields.
pub type PostProcessor = fn(&Value, &mut Map<String, Value>);

/// Look up a post-processor by the key declared in the kind definition.
pub fn get_post_processor(key: &str) -> Option<PostProcessor> {
    match key {
        "droplet" => Some(droplet),
        "reserved_ip" => Some(reserved_ip),
        "app_platform" => Some(app_platform),
        _ => None,
    }
}

/// Droplet transformations: image slug fallback plus booleans derived
/// from the raw arrays the generic mapping copied verbatim.
fn droplet(raw: &Value, domain: &mut Map<String, Value>) {
    // Images without a slug get a distribution-name identifier instead.
    if let Some(slug) = get_path(raw, "image.slug") {
        domain.insert("image".to_string(), slug.clone());
    } else if let (Some(distribution), Some(name)) = (
        get_path(raw, "image.distribution").and_then(Value::as_str),
        get_path(raw, "image.name").and_then(Value::as_str),
    ) {
        let slug = format!(
            "{}-{}",
            distribution.to_lowercase(),
            name.split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
                .to_lowercase()
        );
        domain.insert("image".to_string(), Value::String(slug));
    }

    // backup_ids array -> backups boolean
    if let Some(ids) = raw.get("backup_ids").and_then(Value::as_array) {
        domain.insert("backups".to_string(), Value::Bool(!ids.is_empty()));
    }

    // features array -> monitoring / droplet agent booleans
    if let Some(features) = raw.get("features").and_then(Value::as_array) {
        let has = |feature: &str| features.iter().any(|v| v.as_str() == Some(feature));
        domain.insert("monitoring".to_string(), Value::Bool(has("monitoring")));
        domain.insert(
            "with_droplet_agent".to_string(),
            Value::Bool(has("droplet_agent")),
        );
    }

    // v6 network presence -> ipv6 boolean
    if let Some(v6) = get_path(raw, "networks.v6") {
        let enabled = v6.as_array().is_some_and(|a| !a.is_empty());
        domain.insert("ipv6".to_string(), Value::Bool(enabled));
    }
}

/// Listings return an expanded region object where imports return a
/// `region_slug` string; normalize to the slug either way.
fn reserved_ip(raw: &Value, domain: &mut Map<String, Value>) {
    if !domain.contains_key("region") {
        if let Some(slug) = get_path(raw, "region.slug") {
            domain.insert("region".to_string(), slug.clone());
        }
    }
}

/// Apps keep their identity under a nested `spec`; rebuild that shape
/// from the raw object rather than flattening it.
fn app_platform(raw: &Value, domain: &mut Map<String, Value>) {
    let mut spec = Map::new();
    if let Some(name) = get_path(raw, "spec.name") {
        spec.insert("name".to_string(), name.clone());
    }
    if let Some(region) = get_path(raw, "region.slug").or_else(|| get_path(raw, "spec.region")) {
        spec.insert("region".to_string(), region.clone());
    }
    if !spec.is_empty() {
        domain.insert("spec".to_string(), Value::Object(spec));
    }
}
