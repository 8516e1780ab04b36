// ── Object mapper ──
//
// Composes the field projections of one resource kind into whole-object
// conversions: declared record → per-stage RESTCONF payloads, and stage
// read-backs → declared record. A kind may span several write stages
// (BGP neighbor + its address-family config); stages are ordered parent
// first and the payload of each is wrapped in its yang module envelope.

use crate::error::ReconcileError;
use crate::model::{DeclaredRecord, Identity, KeyValue, RemoteObject, RemoteValue};
use crate::projection::FieldProjection;

/// A RESTCONF path with `{field}` placeholders filled from identity keys.
///
/// The engine never interprets path contents beyond substitution -- the
/// template is data supplied by the resource-kind table.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
}

impl PathTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Placeholder names appearing in the template, in order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            names.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }
        names
    }

    /// Substitute identity key values into the template.
    pub fn render(&self, identity: &Identity) -> Result<String, ReconcileError> {
        let mut rendered = self.template.clone();
        for name in self.placeholders() {
            let value = identity.get(name).ok_or_else(|| ReconcileError::ValidationFailed {
                kind: identity.kind().to_owned(),
                message: format!("path placeholder '{{{name}}}' has no identity value"),
            })?;
            rendered = rendered.replace(&format!("{{{name}}}"), &value.to_string());
        }
        Ok(rendered)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

/// One dependent remote write of a resource kind.
#[derive(Debug, Clone)]
pub struct WriteStage {
    name: String,
    path: PathTemplate,
    envelope: String,
    fields: Vec<FieldProjection>,
}

impl WriteStage {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        envelope: impl Into<String>,
        fields: Vec<FieldProjection>,
    ) -> Self {
        Self {
            name: name.into(),
            path: PathTemplate::new(path),
            envelope: envelope.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    pub fn envelope(&self) -> &str {
        &self.envelope
    }

    pub fn fields(&self) -> &[FieldProjection] {
        &self.fields
    }
}

/// The full bidirectional mapping for one resource kind: identity
/// derivation plus ordered write stages. Built once at registration,
/// immutable, shared across all reconcile calls.
#[derive(Debug, Clone)]
pub struct ResourceKind {
    name: String,
    identity_fields: Vec<String>,
    stages: Vec<WriteStage>,
}

impl ResourceKind {
    pub fn new(name: impl Into<String>, identity: &[&str], stages: Vec<WriteStage>) -> Self {
        Self {
            name: name.into(),
            identity_fields: identity.iter().map(ToString::to_string).collect(),
            stages,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity_fields(&self) -> &[String] {
        &self.identity_fields
    }

    pub fn stages(&self) -> &[WriteStage] {
        &self.stages
    }

    /// The parent stage -- the one whose path owns the object's lifetime
    /// on the device (delete targets only this stage).
    pub fn parent_stage(&self) -> &WriteStage {
        &self.stages[0]
    }

    /// All projections across all stages, for drift iteration.
    pub fn projections(&self) -> impl Iterator<Item = &FieldProjection> {
        self.stages.iter().flat_map(|s| s.fields.iter())
    }

    // ── Identity ─────────────────────────────────────────────────────

    /// Derive the immutable identity from declared fields.
    pub fn derive_identity(&self, declared: &DeclaredRecord) -> Result<Identity, ReconcileError> {
        let mut keys = Vec::with_capacity(self.identity_fields.len());
        for field in &self.identity_fields {
            let value = declared.get(field).ok_or_else(|| ReconcileError::ValidationFailed {
                kind: self.name.clone(),
                message: format!("identity field '{field}' is not set"),
            })?;
            let key = KeyValue::from_value(value).ok_or_else(|| ReconcileError::ValidationFailed {
                kind: self.name.clone(),
                message: format!(
                    "identity field '{field}' must be a string or int, got {}",
                    value.type_name()
                ),
            })?;
            keys.push((field.clone(), key));
        }
        Ok(Identity::new(self.name.clone(), keys))
    }

    // ── Expand ───────────────────────────────────────────────────────

    /// Expand the declared record into one envelope-wrapped payload per
    /// stage, in stage order. A field absent from the record never
    /// materializes a key, regardless of kind.
    pub fn expand_all(&self, declared: &DeclaredRecord) -> Result<Vec<RemoteObject>, ReconcileError> {
        self.stages
            .iter()
            .map(|stage| self.expand_stage(stage, declared))
            .collect()
    }

    pub fn expand_stage(
        &self,
        stage: &WriteStage,
        declared: &DeclaredRecord,
    ) -> Result<RemoteObject, ReconcileError> {
        let mut payload = RemoteObject::new();
        for field in &stage.fields {
            match declared.get(field.declared_name()) {
                Some(value) => {
                    let fragment = field
                        .expand(value)
                        .map_err(|e| ReconcileError::from_projection(&self.name, field.declared_name(), e))?;
                    if let Some(fragment) = fragment {
                        payload.set_path(field.remote_path(), fragment);
                    }
                }
                None if field.is_required() && field.is_expandable() => {
                    return Err(ReconcileError::ValidationFailed {
                        kind: self.name.clone(),
                        message: format!("field '{}' is required but was not set", field.declared_name()),
                    });
                }
                None => {}
            }
        }

        let mut body = RemoteObject::new();
        body.insert(stage.envelope.clone(), RemoteValue::Object(payload));
        Ok(body)
    }

    // ── Flatten ──────────────────────────────────────────────────────

    /// Flatten per-stage read-backs into one declared record.
    ///
    /// `None` readings (a child stage the device knows nothing about)
    /// flatten as empty config: tri-states come back `false` and computed
    /// fields get their zero value. Later stages win on (identical)
    /// overlapping fields such as the echoed list key.
    pub fn flatten_all(
        &self,
        readings: &[Option<RemoteObject>],
    ) -> Result<DeclaredRecord, ReconcileError> {
        let mut merged = DeclaredRecord::new();
        for (stage, reading) in self.stages.iter().zip(readings) {
            self.flatten_stage(stage, reading.as_ref(), &mut merged)?;
        }
        Ok(merged)
    }

    pub fn flatten_stage(
        &self,
        stage: &WriteStage,
        reading: Option<&RemoteObject>,
        into: &mut DeclaredRecord,
    ) -> Result<(), ReconcileError> {
        let empty = RemoteObject::new();
        let payload = reading.map_or(&empty, |body| unwrap_envelope(body, &stage.envelope));

        for field in &stage.fields {
            let target = payload.get_path(field.remote_path());
            let value = field
                .flatten(target)
                .map_err(|e| ReconcileError::from_projection(&self.name, field.declared_name(), e))?;
            if let Some(value) = value {
                into.set(field.declared_name(), value);
            }
        }
        Ok(())
    }
}

/// Strip the yang module envelope from a read body. RESTCONF returns list
/// entries either as a bare object or as a one-element array.
fn unwrap_envelope<'a>(body: &'a RemoteObject, envelope: &str) -> &'a RemoteObject {
    static EMPTY: std::sync::LazyLock<RemoteObject> = std::sync::LazyLock::new(RemoteObject::new);
    match body.get(envelope) {
        Some(RemoteValue::Object(o)) => o,
        Some(RemoteValue::List(items)) => items
            .first()
            .and_then(RemoteValue::as_object)
            .unwrap_or(&EMPTY),
        _ => &EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::projection::{BlockSpec, FieldProjection};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// A compact stand-in for the SVI table: key, cidr, tri-state,
    /// computed name.
    fn test_kind() -> ResourceKind {
        ResourceKind::new(
            "interface_vlan",
            &["vlanid"],
            vec![WriteStage::new(
                "interface",
                "data/Cisco-IOS-XE-native:native/interface/Vlan={vlanid}",
                "Cisco-IOS-XE-native:Vlan",
                vec![
                    FieldProjection::int("vlanid", &["name"]).required().remote_string(),
                    FieldProjection::string("name", &["name"]).computed().display_prefix("Vlan"),
                    FieldProjection::string("description", &["description"]),
                    FieldProjection::cidr("ip", &["ip", "address", "primary"]).required(),
                    FieldProjection::tri_state("shutdown", &["shutdown"]),
                ],
            )],
        )
    }

    #[test]
    fn expand_wraps_payload_in_envelope() {
        let kind = test_kind();
        let declared = DeclaredRecord::new()
            .with("vlanid", 100)
            .with("ip", "10.1.1.1/24")
            .with("shutdown", true);
        let payloads = kind.expand_all(&declared).expect("expand ok");
        assert_eq!(payloads.len(), 1);
        assert_eq!(
            payloads[0].to_json(),
            json!({
                "Cisco-IOS-XE-native:Vlan": {
                    "name": "100",
                    "ip": { "address": { "primary": {
                        "address": "10.1.1.1", "mask": "255.255.255.0"
                    } } },
                    "shutdown": [null],
                }
            })
        );
    }

    #[test]
    fn absent_fields_never_materialize_keys() {
        let kind = test_kind();
        let declared = DeclaredRecord::new().with("vlanid", 100).with("ip", "10.1.1.1/24");
        let payloads = kind.expand_all(&declared).expect("expand ok");
        let vlan = payloads[0]
            .get("Cisco-IOS-XE-native:Vlan")
            .and_then(RemoteValue::as_object)
            .expect("envelope present");
        assert!(!vlan.contains("description"));
        assert!(!vlan.contains("shutdown"));
    }

    #[test]
    fn missing_required_field_fails_before_any_payload() {
        let kind = test_kind();
        let declared = DeclaredRecord::new().with("vlanid", 100);
        assert!(matches!(
            kind.expand_all(&declared),
            Err(ReconcileError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn flatten_round_trips_and_derives_name() {
        let kind = test_kind();
        let declared = DeclaredRecord::new()
            .with("vlanid", 100)
            .with("ip", "10.1.1.1/24")
            .with("shutdown", true);
        let payloads = kind.expand_all(&declared).expect("expand ok");
        let readings: Vec<Option<RemoteObject>> = payloads.into_iter().map(Some).collect();
        let flattened = kind.flatten_all(&readings).expect("flatten ok");

        assert_eq!(flattened.get("vlanid"), Some(&Value::Int(100)));
        assert_eq!(flattened.get("ip"), Some(&Value::Str("10.1.1.1/24".into())));
        assert_eq!(flattened.get("shutdown"), Some(&Value::Bool(true)));
        // Derived on read only.
        assert_eq!(flattened.get("name"), Some(&Value::Str("Vlan100".into())));
        // Never set, never invented.
        assert_eq!(flattened.get("description"), None);
    }

    #[test]
    fn flatten_unwraps_single_element_list_body() {
        let kind = test_kind();
        let body = RemoteObject::from_json(json!({
            "Cisco-IOS-XE-native:Vlan": [ { "name": "20", "ip": { "address": { "primary": {
                "address": "10.2.0.1", "mask": "255.255.0.0"
            } } } } ]
        }));
        let flattened = kind.flatten_all(&[Some(body)]).expect("flatten ok");
        assert_eq!(flattened.get("vlanid"), Some(&Value::Int(20)));
        assert_eq!(flattened.get("ip"), Some(&Value::Str("10.2.0.1/16".into())));
    }

    #[test]
    fn missing_child_stage_flattens_as_empty_config() {
        let kind = ResourceKind::new(
            "bgp_neighbor",
            &["as", "ip"],
            vec![
                WriteStage::new(
                    "neighbor",
                    "data/bgp={as}/neighbor={ip}",
                    "Cisco-IOS-XE-bgp:neighbor",
                    vec![FieldProjection::string("ip", &["id"]).required()],
                ),
                WriteStage::new(
                    "neighbor-config",
                    "data/bgp={as}/af/neighbor={ip}",
                    "Cisco-IOS-XE-bgp:neighbor",
                    vec![FieldProjection::presence_container(
                        "default_originate",
                        &["default-originate"],
                    )],
                ),
            ],
        );
        let parent = RemoteObject::from_json(json!({
            "Cisco-IOS-XE-bgp:neighbor": { "id": "10.0.0.1" }
        }));
        let flattened = kind.flatten_all(&[Some(parent), None]).expect("flatten ok");
        assert_eq!(flattened.get("ip"), Some(&Value::Str("10.0.0.1".into())));
        assert_eq!(flattened.get("default_originate"), Some(&Value::Bool(false)));
    }

    #[test]
    fn path_template_renders_identity_chain() {
        let kind = ResourceKind::new(
            "bgp_neighbor_prefix_list",
            &["routing_instance", "neighbor_ip", "name"],
            vec![WriteStage::new(
                "prefix-list",
                "data/bgp={routing_instance}/neighbor={neighbor_ip}/prefix-list={name}",
                "Cisco-IOS-XE-bgp:prefix-list",
                vec![FieldProjection::string("name", &["prefix-list-name"]).required()],
            )],
        );
        let declared = DeclaredRecord::new()
            .with("routing_instance", "65000")
            .with("neighbor_ip", "10.0.0.1")
            .with("name", "pl-in");
        let identity = kind.derive_identity(&declared).expect("identity ok");
        assert_eq!(
            kind.parent_stage().path().render(&identity).expect("render ok"),
            "data/bgp=65000/neighbor=10.0.0.1/prefix-list=pl-in"
        );
    }

    #[test]
    fn identity_requires_scalar_fields() {
        let kind = test_kind();
        let err = kind
            .derive_identity(&DeclaredRecord::new().with("vlanid", true))
            .expect_err("bool key must fail");
        assert!(matches!(err, ReconcileError::ValidationFailed { .. }));

        let err = kind
            .derive_identity(&DeclaredRecord::new())
            .expect_err("missing key must fail");
        assert!(err.to_string().contains("vlanid"));
    }

    #[test]
    fn placeholders_are_extracted_in_order() {
        let path = PathTemplate::new("data/bgp={as}/neighbor={ip}");
        assert_eq!(path.placeholders(), vec!["as", "ip"]);
    }
}
