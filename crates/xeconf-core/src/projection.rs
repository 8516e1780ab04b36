// ── Field projection codec ──
//
// Converts one declared field between its flat `Value` form and its nested
// `RemoteValue` form. Projections are pure data built once per resource
// kind at registration and shared across all reconcile calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cidr;
use crate::model::{DeclaredRecord, RemoteObject, RemoteValue, Value};

/// Conversion-time failures. These become `ReconcileError::ValidationFailed`
/// (or the dedicated CIDR variants) once the mapper attaches kind and
/// identity context.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProjectionError {
    #[error("invalid CIDR '{value}'")]
    InvalidCidr { value: String },

    #[error("invalid netmask '{value}' (not a contiguous mask)")]
    InvalidNetmask { value: String },

    #[error("field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: String,
    },

    #[error("field '{field}' is required but was not set")]
    MissingRequired { field: String },

    #[error("field '{field}' allows at most one element, got {got}")]
    TooManyElements { field: String, got: usize },
}

/// Declared scalar type. Used for expand-time type checks and for the
/// zero-value fallback of computed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    Str,
    Int,
    Bool,
}

impl ScalarType {
    pub fn zero(self) -> Value {
        match self {
            Self::Str => Value::Str(String::new()),
            Self::Int => Value::Int(0),
            Self::Bool => Value::Bool(false),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "int",
            Self::Bool => "bool",
        }
    }
}

/// How a presence-encoded boolean is written on the wire.
///
/// IOS-XE uses both forms: `"shutdown": [null]` (empty leaf) and
/// `"default-originate": {}` (presence container). Reads accept either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriStateEncoding {
    #[default]
    EmptyLeaf,
    PresenceContainer,
}

/// Element projections for a repeated block, plus block-level quirks.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    fields: Vec<FieldProjection>,
    /// Keys written as empty leafs into every expanded element and ignored
    /// on flatten (e.g. the `secondary` marker on secondary IP addresses).
    markers: Vec<String>,
    /// Declared as a one-element list, stored remotely as a single object
    /// (BGP timers).
    singleton: bool,
}

impl BlockSpec {
    pub fn new(fields: Vec<FieldProjection>) -> Self {
        Self {
            fields,
            markers: Vec::new(),
            singleton: false,
        }
    }

    #[must_use]
    pub fn marker(mut self, key: impl Into<String>) -> Self {
        self.markers.push(key.into());
        self
    }

    #[must_use]
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn fields(&self) -> &[FieldProjection] {
        &self.fields
    }
}

/// The per-field conversion kind.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarType),
    BoolTriState(TriStateEncoding),
    CidrAddress,
    RepeatedBlock(BlockSpec),
}

/// Declarative mapping of one flat field to a path in the remote tree.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct FieldProjection {
    declared_name: String,
    remote_path: Vec<String>,
    kind: FieldKind,
    required: bool,
    computed: bool,
    read_omitted: bool,
    /// Flatten-only prefix for derived names ("Vlan" + 100 → "Vlan100").
    /// A projection with a prefix is never expanded.
    display_prefix: Option<String>,
    /// Expand ints as strings and parse them back (yang keys like the
    /// Vlan interface name are string-typed even when numeric).
    remote_string: bool,
}

impl FieldProjection {
    fn new(declared_name: &str, remote_path: &[&str], kind: FieldKind) -> Self {
        Self {
            declared_name: declared_name.to_owned(),
            remote_path: remote_path.iter().map(ToString::to_string).collect(),
            kind,
            required: false,
            computed: false,
            read_omitted: false,
            display_prefix: None,
            remote_string: false,
        }
    }

    pub fn string(name: &str, path: &[&str]) -> Self {
        Self::new(name, path, FieldKind::Scalar(ScalarType::Str))
    }

    pub fn int(name: &str, path: &[&str]) -> Self {
        Self::new(name, path, FieldKind::Scalar(ScalarType::Int))
    }

    pub fn bool(name: &str, path: &[&str]) -> Self {
        Self::new(name, path, FieldKind::Scalar(ScalarType::Bool))
    }

    pub fn tri_state(name: &str, path: &[&str]) -> Self {
        Self::new(name, path, FieldKind::BoolTriState(TriStateEncoding::EmptyLeaf))
    }

    /// Tri-state written as `{}` instead of `[null]`.
    pub fn presence_container(name: &str, path: &[&str]) -> Self {
        Self::new(
            name,
            path,
            FieldKind::BoolTriState(TriStateEncoding::PresenceContainer),
        )
    }

    pub fn cidr(name: &str, path: &[&str]) -> Self {
        Self::new(name, path, FieldKind::CidrAddress)
    }

    pub fn repeated(name: &str, path: &[&str], spec: BlockSpec) -> Self {
        Self::new(name, path, FieldKind::RepeatedBlock(spec))
    }

    // ── Builder flags ────────────────────────────────────────────────

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// The device never returns this field on read; drift comparison
    /// skips it instead of reporting a false diff.
    #[must_use]
    pub fn read_omitted(mut self) -> Self {
        self.read_omitted = true;
        self
    }

    #[must_use]
    pub fn display_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.display_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn remote_string(mut self) -> Self {
        self.remote_string = true;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    pub fn remote_path(&self) -> &[String] {
        &self.remote_path
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn is_read_omitted(&self) -> bool {
        self.read_omitted
    }

    /// Whether expand ever emits this field (derived display names are
    /// flatten-only).
    pub fn is_expandable(&self) -> bool {
        self.display_prefix.is_none()
    }

    // ── Expand ───────────────────────────────────────────────────────

    /// Convert a declared value into its remote fragment.
    ///
    /// Returns `Ok(None)` when the field must be omitted from the remote
    /// tree entirely (tri-state false, flatten-only projections).
    pub fn expand(&self, value: &Value) -> Result<Option<RemoteValue>, ProjectionError> {
        if !self.is_expandable() {
            return Ok(None);
        }
        match &self.kind {
            FieldKind::Scalar(t) => self.expand_scalar(*t, value).map(Some),
            FieldKind::BoolTriState(encoding) => {
                let flag = value.as_bool().ok_or_else(|| self.mismatch("bool", value))?;
                if flag {
                    Ok(Some(match encoding {
                        TriStateEncoding::EmptyLeaf => RemoteValue::Empty,
                        TriStateEncoding::PresenceContainer => {
                            RemoteValue::Object(RemoteObject::new())
                        }
                    }))
                } else {
                    // Never emit `false` -- absence of the key is the
                    // device's encoding of "off".
                    Ok(None)
                }
            }
            FieldKind::CidrAddress => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| self.mismatch("CIDR string", value))?;
                let (address, mask) = cidr::split_cidr(raw)?;
                let mut pair = RemoteObject::new();
                pair.insert("address", RemoteValue::Str(address));
                pair.insert("mask", RemoteValue::Str(mask));
                Ok(Some(RemoteValue::Object(pair)))
            }
            FieldKind::RepeatedBlock(spec) => self.expand_block(spec, value),
        }
    }

    fn expand_scalar(&self, t: ScalarType, value: &Value) -> Result<RemoteValue, ProjectionError> {
        match (t, value) {
            (ScalarType::Str, Value::Str(s)) => Ok(RemoteValue::Str(s.clone())),
            (ScalarType::Int, Value::Int(i)) => {
                if self.remote_string {
                    Ok(RemoteValue::Str(i.to_string()))
                } else {
                    Ok(RemoteValue::Int(*i))
                }
            }
            (ScalarType::Bool, Value::Bool(b)) => Ok(RemoteValue::Bool(*b)),
            _ => Err(self.mismatch(t.name(), value)),
        }
    }

    fn expand_block(
        &self,
        spec: &BlockSpec,
        value: &Value,
    ) -> Result<Option<RemoteValue>, ProjectionError> {
        let elements = value.as_list().ok_or_else(|| self.mismatch("list", value))?;
        if elements.is_empty() {
            return Ok(None);
        }
        if spec.singleton && elements.len() > 1 {
            return Err(ProjectionError::TooManyElements {
                field: self.declared_name.clone(),
                got: elements.len(),
            });
        }

        let mut expanded = Vec::with_capacity(elements.len());
        for element in elements {
            expanded.push(RemoteValue::Object(expand_element(spec, element)?));
        }

        if spec.singleton {
            Ok(expanded.into_iter().next())
        } else {
            Ok(Some(RemoteValue::List(expanded)))
        }
    }

    // ── Flatten ──────────────────────────────────────────────────────

    /// Convert a remote fragment (or its absence) back to a declared value.
    ///
    /// `Ok(None)` means the declared field stays absent. Tri-states always
    /// produce a value (absence flattens to `false`); computed fields fall
    /// back to their zero value when the device omits them.
    pub fn flatten(&self, remote: Option<&RemoteValue>) -> Result<Option<Value>, ProjectionError> {
        match &self.kind {
            FieldKind::Scalar(t) => match remote {
                Some(v) => self.flatten_scalar(*t, v).map(Some),
                None => Ok(self.computed.then(|| t.zero())),
            },
            FieldKind::BoolTriState(_) => Ok(Some(Value::Bool(remote.is_some()))),
            FieldKind::CidrAddress => match remote {
                Some(v) => self.flatten_cidr(v).map(Some),
                None => Ok(None),
            },
            FieldKind::RepeatedBlock(spec) => match remote {
                Some(v) => self.flatten_block(spec, v).map(Some),
                None => Ok(self.computed.then(|| Value::List(Vec::new()))),
            },
        }
    }

    fn flatten_scalar(&self, t: ScalarType, remote: &RemoteValue) -> Result<Value, ProjectionError> {
        if let Some(prefix) = &self.display_prefix {
            let raw = match remote {
                RemoteValue::Str(s) => s.clone(),
                RemoteValue::Int(i) => i.to_string(),
                other => return Err(self.remote_mismatch("scalar", other)),
            };
            return Ok(Value::Str(format!("{prefix}{raw}")));
        }
        match (t, remote) {
            (ScalarType::Str, RemoteValue::Str(s)) => Ok(Value::Str(s.clone())),
            (ScalarType::Str, RemoteValue::Int(i)) => Ok(Value::Str(i.to_string())),
            (ScalarType::Int, RemoteValue::Int(i)) => Ok(Value::Int(*i)),
            (ScalarType::Int, RemoteValue::Str(s)) => s
                .parse()
                .map(Value::Int)
                .map_err(|_| self.remote_mismatch("int", remote)),
            (ScalarType::Bool, RemoteValue::Bool(b)) => Ok(Value::Bool(*b)),
            _ => Err(self.remote_mismatch(t.name(), remote)),
        }
    }

    fn flatten_cidr(&self, remote: &RemoteValue) -> Result<Value, ProjectionError> {
        let pair = remote
            .as_object()
            .ok_or_else(|| self.remote_mismatch("address/mask object", remote))?;
        let address = pair
            .get("address")
            .and_then(RemoteValue::as_str)
            .ok_or_else(|| self.remote_mismatch("address/mask object", remote))?;
        let mask = pair
            .get("mask")
            .and_then(RemoteValue::as_str)
            .ok_or_else(|| self.remote_mismatch("address/mask object", remote))?;
        Ok(Value::Str(cidr::join_cidr(address, mask)?))
    }

    fn flatten_block(&self, spec: &BlockSpec, remote: &RemoteValue) -> Result<Value, ProjectionError> {
        // A singleton block comes back as a bare object; everything else
        // as a list. Order is preserved as received -- the device does not
        // guarantee canonical ordering across reads.
        let elements: Vec<&RemoteValue> = match remote {
            RemoteValue::Object(_) if spec.singleton => vec![remote],
            RemoteValue::List(items) => items.iter().collect(),
            RemoteValue::Object(_) => vec![remote],
            other => return Err(self.remote_mismatch("list", other)),
        };

        let mut records = Vec::with_capacity(elements.len());
        for element in elements {
            records.push(flatten_element(spec, element)?);
        }
        Ok(Value::List(records))
    }

    fn mismatch(&self, expected: &'static str, got: &Value) -> ProjectionError {
        ProjectionError::TypeMismatch {
            field: self.declared_name.clone(),
            expected,
            got: got.type_name().to_owned(),
        }
    }

    fn remote_mismatch(&self, expected: &'static str, got: &RemoteValue) -> ProjectionError {
        ProjectionError::TypeMismatch {
            field: self.declared_name.clone(),
            expected,
            got: format!("{got:?}"),
        }
    }
}

fn expand_element(
    spec: &BlockSpec,
    element: &DeclaredRecord,
) -> Result<RemoteObject, ProjectionError> {
    let mut obj = RemoteObject::new();
    for field in &spec.fields {
        match element.get(field.declared_name()) {
            Some(value) => {
                if let Some(fragment) = field.expand(value)? {
                    obj.set_path(field.remote_path(), fragment);
                }
            }
            None if field.is_required() && field.is_expandable() => {
                return Err(ProjectionError::MissingRequired {
                    field: field.declared_name().to_owned(),
                });
            }
            None => {}
        }
    }
    for marker in &spec.markers {
        obj.insert(marker.clone(), RemoteValue::Empty);
    }
    Ok(obj)
}

fn flatten_element(
    spec: &BlockSpec,
    element: &RemoteValue,
) -> Result<DeclaredRecord, ProjectionError> {
    let empty = RemoteObject::new();
    let obj = element.as_object().unwrap_or(&empty);

    let mut record = DeclaredRecord::new();
    for field in &spec.fields {
        // An empty remote path means the field's fragment lives at the
        // element root (secondary IPs are bare address/mask objects).
        let target = if field.remote_path().is_empty() {
            Some(element)
        } else {
            obj.get_path(field.remote_path())
        };
        if let Some(value) = field.flatten(target)? {
            record.set(field.declared_name(), value);
        }
    }
    Ok(record)
}
