// ── Data model ──
//
// Two representations of the same resource: the flat, caller-facing
// `DeclaredRecord` and the nested, device-facing `RemoteObject`. The
// conversion between them lives in `projection` and `mapper`.

pub mod declared;
pub mod identity;
pub mod remote;

pub use declared::{DeclaredRecord, Value};
pub use identity::{Identity, KeyValue};
pub use remote::{RemoteObject, RemoteValue};
