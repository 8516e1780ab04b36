// ── Drift detection ──
//
// Compares a declared record against an observed read-back, field by
// field over the kind's projection table. Fields the device never echoes
// are skipped rather than reported as perpetual diffs.

use crate::mapper::ResourceKind;
use crate::model::{DeclaredRecord, Value};
use crate::projection::FieldKind;

/// One field whose observed state differs from the declared state.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDrift {
    pub field: String,
    pub declared: Option<Value>,
    pub observed: Option<Value>,
}

/// Report every managed field where the device disagrees with the
/// declared record.
///
/// Rules, per projection:
/// - read-omitted fields are never compared;
/// - tri-states compare with absence normalized to `false` on both sides,
///   so an unset declared flag and a missing remote key agree;
/// - repeated blocks compare with an empty list and absence as equal: an
///   empty block writes no key, so the device reads it back as absent;
/// - any other field absent from the declared record is unmanaged and
///   skipped (computed fields land here until the caller persists them).
pub fn drift(
    kind: &ResourceKind,
    declared: &DeclaredRecord,
    observed: &DeclaredRecord,
) -> Vec<FieldDrift> {
    let mut drifts = Vec::new();

    for projection in kind.projections() {
        if projection.is_read_omitted() {
            continue;
        }
        let name = projection.declared_name();
        let want = declared.get(name);
        let have = observed.get(name);

        if matches!(projection.kind(), FieldKind::BoolTriState(_)) {
            let want = want.and_then(Value::as_bool).unwrap_or(false);
            let have = have.and_then(Value::as_bool).unwrap_or(false);
            if want != have {
                drifts.push(FieldDrift {
                    field: name.to_owned(),
                    declared: Some(Value::Bool(want)),
                    observed: Some(Value::Bool(have)),
                });
            }
            continue;
        }

        // Unmanaged field: nothing declared means nothing to enforce.
        if want.is_none() {
            continue;
        }

        if matches!(projection.kind(), FieldKind::RepeatedBlock(_)) {
            let want = want.filter(|v| !is_empty_list(v));
            let have = have.filter(|v| !is_empty_list(v));
            if want != have {
                drifts.push(FieldDrift {
                    field: name.to_owned(),
                    declared: want.cloned(),
                    observed: have.cloned(),
                });
            }
            continue;
        }

        if want != have {
            drifts.push(FieldDrift {
                field: name.to_owned(),
                declared: want.cloned(),
                observed: have.cloned(),
            });
        }
    }

    drifts
}

fn is_empty_list(value: &Value) -> bool {
    value.as_list().is_some_and(<[_]>::is_empty)
}
