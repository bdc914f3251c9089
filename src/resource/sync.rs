//! Resource synchronization
//!
//! The two user-facing operations: bulk discover and single-resource
//! import. Both are read-only against the provider; local side effects
//! (record creation, in-place field updates) are reported back to the
//! host as a structured instruction set, never applied directly.
//!
//! Every failure is converted into an error [`Output`] at the operation
//! boundary. A run owns its own state; concurrent runs over different
//! kinds share nothing.

use crate::api::client::DoClient;
use crate::error::{SyncError, SyncResult};
use crate::resource::registry::{get_kind, KindDef};
use crate::resource::{mapper, paginator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Component context supplied by the host with each invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentContext {
    /// Current properties of the invoking component; import reads the
    /// target identifier from `si.resourceId`.
    #[serde(default)]
    pub properties: Value,
    /// Attribute-source bindings propagated verbatim onto discovered
    /// records.
    #[serde(default)]
    pub sources: BTreeMap<String, Value>,
}

impl ComponentContext {
    /// The caller-supplied resource identifier, if any.
    pub fn resource_id(&self) -> Option<String> {
        match self.properties.pointer("/si/resourceId") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One normalized remote resource. Immutable once produced; a later run
/// supersedes it rather than mutating it.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    /// The provider's stable identifier.
    pub resource_id: String,
    /// Display name, from the kind's fallback chain.
    pub name: String,
    /// Locally-normalized subset of provider fields.
    pub domain_fields: Map<String, Value>,
    /// Verbatim API payload, retained for audit and refresh.
    pub raw_resource: Value,
}

/// Operation status reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Instruction set returned to the host: `status`/`message` plus the
/// create/update operations for the host to apply.
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ops: Option<Ops>,
}

impl Output {
    pub fn ok(message: impl Into<String>, ops: Ops) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
            ops: Some(ops),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            ops: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Ops {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub create: BTreeMap<String, CreateEntry>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, ActionEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateOps>,
}

/// Create instruction for one discovered resource.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEntry {
    pub kind: String,
    pub properties: RecordProperties,
    pub attributes: BTreeMap<String, AttributeBinding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordProperties {
    pub si: SiProperties,
    pub domain: Map<String, Value>,
    pub resource: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiProperties {
    #[serde(rename = "resourceId")]
    pub resource_id: String,
    pub name: String,
}

/// Pass-through binding of an upstream attribute source.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeBinding {
    #[serde(rename = "$source")]
    pub source: Value,
}

/// Housekeeping attached to each discovered record: drop the transient
/// create action so rediscovering the same resource stays idempotent.
#[derive(Debug, Clone, Serialize)]
pub struct ActionEntry {
    pub remove: Vec<String>,
}

impl ActionEntry {
    fn remove_create() -> Self {
        Self {
            remove: vec!["create".to_string()],
        }
    }
}

/// Update instruction targeting the invoking component itself.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOps {
    #[serde(rename = "self")]
    pub this: UpdateEntry,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateEntry {
    pub properties: UpdateProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProperties {
    pub domain: Map<String, Value>,
    pub resource: Value,
}

/// Orchestrates discover and import flows for one resource kind at a
/// time. Holds no state between runs; the credential source is injected
/// through the client.
pub struct Synchronizer {
    client: DoClient,
}

impl Synchronizer {
    pub fn new(client: DoClient) -> Self {
        Self { client }
    }

    /// Bulk discovery: list every remote resource of `kind_key` and emit
    /// one create instruction per resource.
    ///
    /// Any failure yields a single error result for the whole batch;
    /// records mapped from earlier pages are discarded, not emitted.
    pub async fn discover(&self, kind_key: &str, ctx: &ComponentContext) -> Output {
        let Some(kind) = get_kind(kind_key) else {
            return Output::error(format!("unknown resource kind: {kind_key}"));
        };

        match self.discover_inner(kind, ctx).await {
            Ok(output) => output,
            Err(err) => Output::error(format!("{} list error: {}", kind.display_name, err)),
        }
    }

    async fn discover_inner(&self, kind: &KindDef, ctx: &ComponentContext) -> SyncResult<Output> {
        self.client.preflight()?;

        let mut resource_list: Vec<Value> = Vec::new();
        for source in &kind.list {
            let items = paginator::fetch_all(&self.client, source).await?;
            paginator::union_extend(&mut resource_list, items);
        }
        tracing::info!(kind = %kind.display_name, total = resource_list.len(), "listing complete");

        let mut create = BTreeMap::new();
        let mut actions = BTreeMap::new();

        for raw in &resource_list {
            let record = map_record(kind, raw)?;
            tracing::debug!(kind = %kind.display_name, resource_id = %record.resource_id, "mapped resource");

            if create.contains_key(&record.resource_id) {
                tracing::warn!(
                    resource_id = %record.resource_id,
                    "duplicate resource id in listing; last write wins"
                );
            }

            actions.insert(record.resource_id.clone(), ActionEntry::remove_create());
            create.insert(
                record.resource_id.clone(),
                CreateEntry {
                    kind: kind.kind.clone(),
                    properties: RecordProperties {
                        si: SiProperties {
                            resource_id: record.resource_id,
                            name: record.name,
                        },
                        domain: record.domain_fields,
                        resource: record.raw_resource,
                    },
                    attributes: pass_through_attributes(ctx),
                },
            );
        }

        let count = create.len();
        Ok(Output::ok(
            format!("Discovered {count} components"),
            Ops {
                create,
                actions,
                update: None,
            },
        ))
    }

    /// Single-resource import: fetch by identifier and emit an in-place
    /// update of the caller's record.
    pub async fn import(&self, kind_key: &str, ctx: &ComponentContext) -> Output {
        let Some(kind) = get_kind(kind_key) else {
            return Output::error(format!("unknown resource kind: {kind_key}"));
        };

        let Some(resource_id) = ctx.resource_id() else {
            return Output::error(format!(
                "resource ID not provided; please specify a {} ID to import",
                kind.display_name
            ));
        };

        match self.import_inner(kind, &resource_id).await {
            Ok(output) => output,
            Err(SyncError::NotFound { .. }) => Output::error(format!(
                "{} with ID {} not found",
                kind.display_name, resource_id
            )),
            Err(err) => Output::error(format!(
                "Unable to fetch {}; {}",
                kind.display_name, err
            )),
        }
    }

    async fn import_inner(&self, kind: &KindDef, resource_id: &str) -> SyncResult<Output> {
        self.client.preflight()?;

        let Some(source) = kind.get_source_for(resource_id) else {
            return Ok(Output::error(format!(
                "invalid {} identifier: {}",
                kind.display_name, resource_id
            )));
        };

        let response = self.client.get_resource(&source.path, resource_id).await?;
        let raw = response
            .get(&source.envelope)
            .filter(|v| !v.is_null())
            .ok_or_else(|| SyncError::Extraction(format!("{} data", kind.display_name)))?;

        let domain = map_domain_fields(kind, raw);
        tracing::info!(kind = %kind.display_name, resource_id, "imported resource");

        Ok(Output::ok(
            "Imported resource",
            Ops {
                update: Some(UpdateOps {
                    this: UpdateEntry {
                        properties: UpdateProperties {
                            domain,
                            resource: raw.clone(),
                        },
                    },
                }),
                ..Ops::default()
            },
        ))
    }
}

/// Run the kind's mapping table and post-processor over one raw object.
fn map_domain_fields(kind: &KindDef, raw: &Value) -> Map<String, Value> {
    let mut domain = mapper::map_fields(raw, &kind.field_mappings);

    if let Some(key) = kind.post_processor.as_deref() {
        match mapper::get_post_processor(key) {
            Some(post) => post(raw, &mut domain),
            None => tracing::warn!(key, "unknown post-processor; skipping"),
        }
    }

    domain
}

/// Build the full record for one discovered item.
fn map_record(kind: &KindDef, raw: &Value) -> SyncResult<ResourceRecord> {
    let resource_id = extract_id(kind, raw)?;
    let name = extract_name(kind, raw, &resource_id);
    let domain_fields = map_domain_fields(kind, raw);

    Ok(ResourceRecord {
        resource_id,
        name,
        domain_fields,
        raw_resource: raw.clone(),
    })
}

/// Extract the provider identifier; numbers are stringified.
fn extract_id(kind: &KindDef, raw: &Value) -> SyncResult<String> {
    match mapper::get_path(raw, &kind.id_path) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(SyncError::Extraction(format!(
            "{} id ({})",
            kind.display_name, kind.id_path
        ))),
    }
}

/// Display name fallback chain, ending at the identifier.
fn extract_name(kind: &KindDef, raw: &Value, resource_id: &str) -> String {
    for path in &kind.name_paths {
        match mapper::get_path(raw, path) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    resource_id.to_string()
}

fn pass_through_attributes(ctx: &ComponentContext) -> BTreeMap<String, AttributeBinding> {
    ctx.sources
        .iter()
        .map(|(key, value)| {
            (
                key.clone(),
                AttributeBinding {
                    source: value.clone(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::registry;
    use serde_json::json;

    #[test]
    fn context_reads_string_and_numeric_ids() {
        let ctx: ComponentContext =
            serde_json::from_value(json!({ "properties": { "si": { "resourceId": "abc-123" } } }))
                .unwrap();
        assert_eq!(ctx.resource_id().unwrap(), "abc-123");

        let ctx: ComponentContext =
            serde_json::from_value(json!({ "properties": { "si": { "resourceId": 42 } } }))
                .unwrap();
        assert_eq!(ctx.resource_id().unwrap(), "42");

        let ctx = ComponentContext::default();
        assert!(ctx.resource_id().is_none());
    }

    #[test]
    fn extract_id_stringifies_numbers() {
        let kind = registry::get_kind("ssh-key").unwrap();
        let id = extract_id(kind, &json!({ "id": 512190 })).unwrap();
        assert_eq!(id, "512190");
    }

    #[test]
    fn extract_id_missing_is_an_extraction_error() {
        let kind = registry::get_kind("ssh-key").unwrap();
        let err = extract_id(kind, &json!({ "name": "no id here" })).unwrap_err();
        assert!(matches!(err, SyncError::Extraction(_)));
    }

    #[test]
    fn name_falls_back_to_identifier() {
        let kind = registry::get_kind("kubernetes-cluster").unwrap();
        let raw = json!({ "id": "c-1", "name": "prod-cluster" });
        assert_eq!(extract_name(kind, &raw, "c-1"), "prod-cluster");

        let raw = json!({ "id": "c-1" });
        assert_eq!(extract_name(kind, &raw, "c-1"), "c-1");
    }

    #[test]
    fn mapped_record_is_pure_over_input() {
        let kind = registry::get_kind("droplet").unwrap();
        let raw = json!({
            "id": 3164444,
            "name": "web-01",
            "region": { "slug": "nyc3" },
            "size": { "slug": "s-1vcpu-1gb" },
            "features": ["monitoring"],
            "tags": ["web"]
        });

        let first = map_record(kind, &raw).unwrap();
        let second = map_record(kind, &raw).unwrap();

        assert_eq!(first.resource_id, "web-01");
        assert_eq!(first.domain_fields, second.domain_fields);
        assert_eq!(first.raw_resource, raw);
    }

    #[test]
    fn attribute_bindings_wrap_sources_verbatim() {
        let ctx: ComponentContext = serde_json::from_value(json!({
            "sources": { "/domain/region": { "component": "config", "path": "/region" } }
        }))
        .unwrap();

        let attributes = pass_through_attributes(&ctx);
        let binding = attributes.get("/domain/region").unwrap();
        assert_eq!(
            binding.source,
            json!({ "component": "config", "path": "/region" })
        );
    }

    #[test]
    fn output_serializes_host_contract_shape() {
        let output = Output::error("Droplet with ID 999 not found");
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "Droplet with ID 999 not found");
        assert!(value.get("ops").is_none());
    }
}
