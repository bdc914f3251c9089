//! Resource kind registry - load kind definitions from JSON
//!
//! This module loads all DigitalOcean resource kind definitions from
//! embedded JSON files and provides lookup functions for the rest of the
//! crate. Kind definitions are data, not code: endpoints, envelopes,
//! identifier rules, and field mapping tables all live in
//! `src/resources/*.json`.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Embedded kind JSON files (compiled into the binary)
const KIND_FILES: &[&str] = &[
    include_str!("../resources/compute.json"),
    include_str!("../resources/network.json"),
    include_str!("../resources/storage.json"),
    include_str!("../resources/platform.json"),
];

fn default_true() -> bool {
    true
}

/// One listing endpoint for a kind. Most kinds have exactly one; Reserved
/// IPs merge two (IPv4 and IPv6 live on separate endpoints).
#[derive(Debug, Clone, Deserialize)]
pub struct ListSource {
    /// API-relative endpoint path, e.g. `/droplets`.
    pub path: String,
    /// Field in the response envelope holding the item array.
    pub items_field: String,
    /// Whether the endpoint honors `page`/`per_page` parameters.
    #[serde(default = "default_true")]
    pub paginated: bool,
    /// Static fields merged into every item from this source before
    /// mapping (e.g. tagging Reserved IPs with their IP version).
    #[serde(default)]
    pub inject: BTreeMap<String, Value>,
}

/// Single-resource fetch endpoint used by import.
///
/// When a kind declares several candidates, the first whose `id_pattern`
/// matches the identifier wins; a candidate without a pattern always
/// matches.
#[derive(Debug, Clone, Deserialize)]
pub struct GetSource {
    /// Path template with an `{id}` placeholder, e.g. `/droplets/{id}`.
    pub path: String,
    /// Field in the response envelope holding the resource object.
    pub envelope: String,
    /// Regex the identifier must match for this candidate to apply.
    #[serde(default)]
    pub id_pattern: Option<String>,
}

/// Resource kind definition from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct KindDef {
    pub display_name: String,
    /// Kind label emitted on create instructions.
    pub kind: String,
    pub list: Vec<ListSource>,
    pub get: Vec<GetSource>,
    /// Dot-path to the provider's stable identifier. Numeric identifiers
    /// are stringified.
    pub id_path: String,
    /// Dot-paths tried in order for the record's display name; the
    /// identifier is the final fallback.
    #[serde(default)]
    pub name_paths: Vec<String>,
    /// domain field -> dot-path into the raw API object.
    pub field_mappings: BTreeMap<String, String>,
    /// Key into the post-processor table (see `mapper::get_post_processor`).
    #[serde(default)]
    pub post_processor: Option<String>,
}

impl KindDef {
    /// Pick the import endpoint for an identifier. `None` means no
    /// candidate matched (e.g. a malformed Reserved IP address).
    pub fn get_source_for(&self, id: &str) -> Option<&GetSource> {
        self.get.iter().find(|source| match &source.id_pattern {
            Some(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(id))
                .unwrap_or(false),
            None => true,
        })
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct KindConfig {
    #[serde(default)]
    pub kinds: HashMap<String, KindDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<KindConfig> = OnceLock::new();

/// Get the kind registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static KindConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = KindConfig {
            kinds: HashMap::new(),
        };

        for content in KIND_FILES {
            let partial: KindConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded kind JSON: {}", e));
            final_config.kinds.extend(partial.kinds);
        }

        final_config
    })
}

/// Get a kind definition by key
pub fn get_kind(key: &str) -> Option<&'static KindDef> {
    get_registry().kinds.get(key)
}

/// Get all kind keys, sorted (for CLI listing)
pub fn get_all_kind_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry().kinds.keys().map(|s| s.as_str()).collect();
    keys.sort_unstable();
    keys
}
