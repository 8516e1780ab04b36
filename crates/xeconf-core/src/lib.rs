// xeconf-core: bidirectional mapping and reconciliation between flat declared
// records and nested RESTCONF device state.

pub mod cidr;
pub mod drift;
pub mod error;
pub mod mapper;
pub mod model;
pub mod projection;
pub mod reconciler;
pub mod registry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::{ReconcileError, StoreError};
pub use drift::{FieldDrift, drift};
pub use mapper::{PathTemplate, ResourceKind, WriteStage};
pub use projection::{BlockSpec, FieldKind, FieldProjection, ProjectionError, ScalarType};
pub use reconciler::{Reconciler, RemoteStore, ResourceState};
pub use registry::{RegistryError, ResourceRegistry};

// Re-export model types at the crate root for ergonomics.
pub use model::{DeclaredRecord, Identity, KeyValue, RemoteObject, RemoteValue, Value};
