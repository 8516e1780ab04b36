// ── Error taxonomy ──
//
// Callers never see transport details directly: a `RemoteStore`
// implementation reports `StoreError`, and the reconciler translates that
// into domain errors that always carry the resource kind and identity.
// Nothing here retries -- retry policy belongs to the store or the caller.

use thiserror::Error;

use crate::model::Identity;
use crate::projection::ProjectionError;

/// Errors reported by a `RemoteStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target object does not exist on the device.
    #[error("remote object not found")]
    NotFound,

    /// The device rejected a syntactically valid request.
    #[error("remote rejected request{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Rejected {
        status: Option<u16>,
        message: String,
    },

    /// Transport-level failure (connection, TLS, timeout, malformed body).
    #[error("transport error: {message}")]
    Transport { message: String },
}

/// Unified error type for reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    // ── Pre-network validation ───────────────────────────────────────
    #[error("{kind}: validation failed: {message}")]
    ValidationFailed { kind: String, message: String },

    #[error("{kind}: field '{field}': invalid CIDR '{value}'")]
    InvalidCidr {
        kind: String,
        field: String,
        value: String,
    },

    #[error("{kind}: field '{field}': invalid netmask '{value}'")]
    InvalidNetmask {
        kind: String,
        field: String,
        value: String,
    },

    /// Identity fields are immutable; the caller must destroy and
    /// recreate instead. Raised before any remote call.
    #[error("{identity}: identity field '{field}' cannot change -- destroy and recreate")]
    ImmutableFieldChanged { identity: Identity, field: String },

    // ── Remote outcomes ──────────────────────────────────────────────
    /// The device rejected the request; detail is surfaced verbatim.
    #[error("{identity}: rejected by device: {detail}")]
    RemoteRejected { identity: Identity, detail: String },

    /// Read/delete target is gone. For reads the caller should treat the
    /// resource as unmanaged and recreate on the next cycle; delete maps
    /// this to success internally.
    #[error("{identity}: not found on device")]
    NotFound { identity: Identity },

    /// The request never reached a device verdict (connection, TLS,
    /// timeout, malformed body).
    #[error("{identity}: transport failure: {detail}")]
    Transport { identity: Identity, detail: String },

    /// A multi-stage apply stopped partway. `completed` names the stages
    /// already written so the caller can resume with the remainder.
    #[error("{identity}: partial apply -- completed {completed:?}, failed at '{failed}': {detail}")]
    PartialApply {
        identity: Identity,
        completed: Vec<String>,
        failed: String,
        detail: String,
    },

    /// Cooperative cancellation observed before the next remote call.
    #[error("{identity}: cancelled before next remote call")]
    Cancelled { identity: Identity },
}

impl ReconcileError {
    /// Attach kind context to a conversion-time failure, routing the CIDR
    /// variants to their dedicated errors.
    pub(crate) fn from_projection(kind: &str, field: &str, err: ProjectionError) -> Self {
        match err {
            ProjectionError::InvalidCidr { value } => Self::InvalidCidr {
                kind: kind.to_owned(),
                field: field.to_owned(),
                value,
            },
            ProjectionError::InvalidNetmask { value } => Self::InvalidNetmask {
                kind: kind.to_owned(),
                field: field.to_owned(),
                value,
            },
            other => Self::ValidationFailed {
                kind: kind.to_owned(),
                message: other.to_string(),
            },
        }
    }

    /// The resource kind this error belongs to.
    pub fn kind(&self) -> &str {
        match self {
            Self::ValidationFailed { kind, .. }
            | Self::InvalidCidr { kind, .. }
            | Self::InvalidNetmask { kind, .. } => kind,
            Self::ImmutableFieldChanged { identity, .. }
            | Self::RemoteRejected { identity, .. }
            | Self::NotFound { identity }
            | Self::Transport { identity, .. }
            | Self::PartialApply { identity, .. }
            | Self::Cancelled { identity } => identity.kind(),
        }
    }

    /// The identity involved, when one was derivable.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::ImmutableFieldChanged { identity, .. }
            | Self::RemoteRejected { identity, .. }
            | Self::NotFound { identity }
            | Self::Transport { identity, .. }
            | Self::PartialApply { identity, .. }
            | Self::Cancelled { identity } => Some(identity),
            Self::ValidationFailed { .. }
            | Self::InvalidCidr { .. }
            | Self::InvalidNetmask { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyValue;

    fn identity() -> Identity {
        Identity::new("vrf", vec![("name".into(), KeyValue::Str("blue".into()))])
    }

    #[test]
    fn projection_errors_route_to_dedicated_variants() {
        let err = ReconcileError::from_projection(
            "interface_vlan",
            "ip",
            ProjectionError::InvalidCidr {
                value: "bogus".into(),
            },
        );
        assert!(matches!(err, ReconcileError::InvalidCidr { .. }));
        assert_eq!(err.kind(), "interface_vlan");

        let err = ReconcileError::from_projection(
            "interface_vlan",
            "shutdown",
            ProjectionError::MissingRequired {
                field: "shutdown".into(),
            },
        );
        assert!(matches!(err, ReconcileError::ValidationFailed { .. }));
    }

    #[test]
    fn errors_carry_kind_and_identity() {
        let err = ReconcileError::NotFound {
            identity: identity(),
        };
        assert_eq!(err.kind(), "vrf");
        assert_eq!(
            err.identity().map(ToString::to_string),
            Some("vrf[name=blue]".to_owned())
        );
        assert_eq!(err.to_string(), "vrf[name=blue]: not found on device");
    }

    #[test]
    fn partial_apply_names_completed_and_failed() {
        let err = ReconcileError::PartialApply {
            identity: identity(),
            completed: vec!["neighbor".into()],
            failed: "neighbor-config".into(),
            detail: "status 409".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("neighbor"));
        assert!(msg.contains("neighbor-config"));
    }
}
