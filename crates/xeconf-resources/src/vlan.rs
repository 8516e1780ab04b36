// ── VLAN tables ──
//
// Two distinct objects share the VLAN id: the L2 VLAN database entry
// under `native/vlan`, and the routed SVI under `native/interface/Vlan`.
// The SVI's yang list key is the string-typed interface `name`, which is
// just the VLAN id; the human-facing name is derived as "Vlan" + id and
// never written.

use xeconf_core::{BlockSpec, FieldProjection, ResourceKind, WriteStage};

/// L2 VLAN database entry (VLAN ids 1..=4096 on the device).
pub fn l2_vlan() -> ResourceKind {
    ResourceKind::new(
        "l2_vlan",
        &["vlanid"],
        vec![WriteStage::new(
            "vlan-list",
            "data/Cisco-IOS-XE-native:native/vlan/vlan-list={vlanid}",
            "Cisco-IOS-XE-vlan:vlan-list",
            vec![
                FieldProjection::int("vlanid", &["id"]).required(),
                // Devices auto-assign "VLANxxxx" when unset.
                FieldProjection::string("name", &["name"]).computed(),
            ],
        )],
    )
}

/// Switched virtual interface for a VLAN.
pub fn interface_vlan() -> ResourceKind {
    ResourceKind::new(
        "interface_vlan",
        &["vlanid"],
        vec![WriteStage::new(
            "interface",
            "data/Cisco-IOS-XE-native:native/interface/Vlan={vlanid}",
            "Cisco-IOS-XE-native:Vlan",
            vec![
                FieldProjection::int("vlanid", &["name"]).required().remote_string(),
                FieldProjection::string("name", &["name"])
                    .computed()
                    .display_prefix("Vlan"),
                FieldProjection::string("description", &["description"]),
                FieldProjection::cidr("ip", &["ip", "address", "primary"]).required(),
                FieldProjection::repeated(
                    "secondary_ip",
                    &["ip", "address", "secondary"],
                    BlockSpec::new(vec![FieldProjection::cidr("ip", &[]).required()])
                        .marker("secondary"),
                ),
                FieldProjection::tri_state("shutdown", &["shutdown"]),
                FieldProjection::string("vrf", &["vrf", "forwarding"]),
            ],
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use xeconf_core::{DeclaredRecord, RemoteObject, Value};

    #[test]
    fn l2_vlan_expands_to_vlan_list_entry() {
        let kind = l2_vlan();
        let declared = DeclaredRecord::new().with("vlanid", 100).with("name", "users");
        let payloads = kind.expand_all(&declared).expect("expand ok");
        assert_eq!(
            payloads[0].to_json(),
            json!({ "Cisco-IOS-XE-vlan:vlan-list": { "id": 100, "name": "users" } })
        );
    }

    #[test]
    fn l2_vlan_flattens_device_assigned_name() {
        let kind = l2_vlan();
        let body = RemoteObject::from_json(json!({
            "Cisco-IOS-XE-vlan:vlan-list": [ { "id": 200, "name": "VLAN0200" } ]
        }));
        let flattened = kind.flatten_all(&[Some(body)]).expect("flatten ok");
        assert_eq!(flattened.get("vlanid"), Some(&Value::Int(200)));
        assert_eq!(flattened.get("name"), Some(&Value::Str("VLAN0200".into())));
    }

    #[test]
    fn svi_round_trips_with_secondary_ips() {
        let kind = interface_vlan();
        let declared = DeclaredRecord::new()
            .with("vlanid", 100)
            .with("ip", "10.1.1.1/24")
            .with(
                "secondary_ip",
                Value::List(vec![DeclaredRecord::new().with("ip", "10.1.2.1/24")]),
            )
            .with("shutdown", true)
            .with("vrf", "blue");
        let payloads = kind.expand_all(&declared).expect("expand ok");
        assert_eq!(
            payloads[0].to_json(),
            json!({
                "Cisco-IOS-XE-native:Vlan": {
                    "name": "100",
                    "ip": { "address": {
                        "primary": { "address": "10.1.1.1", "mask": "255.255.255.0" },
                        "secondary": [
                            { "address": "10.1.2.1", "mask": "255.255.255.0", "secondary": [null] },
                        ],
                    } },
                    "shutdown": [null],
                    "vrf": { "forwarding": "blue" },
                }
            })
        );

        let readings = vec![Some(payloads.into_iter().next().expect("one stage"))];
        let flattened = kind.flatten_all(&readings).expect("flatten ok");
        assert_eq!(flattened.get("vlanid"), Some(&Value::Int(100)));
        assert_eq!(flattened.get("name"), Some(&Value::Str("Vlan100".into())));
        assert_eq!(flattened.get("ip"), Some(&Value::Str("10.1.1.1/24".into())));
        assert_eq!(
            flattened.get("secondary_ip"),
            Some(&Value::List(vec![
                DeclaredRecord::new().with("ip", "10.1.2.1/24")
            ]))
        );
        assert_eq!(flattened.get("shutdown"), Some(&Value::Bool(true)));
        assert_eq!(flattened.get("vrf"), Some(&Value::Str("blue".into())));
    }

    #[test]
    fn svi_with_no_secondary_ips_settles_after_write() {
        let kind = interface_vlan();
        let declared = DeclaredRecord::new()
            .with("vlanid", 100)
            .with("ip", "10.1.1.1/24")
            .with("secondary_ip", Value::List(Vec::new()));

        // An empty secondary list writes no key at all.
        let payloads = kind.expand_all(&declared).expect("expand ok");
        assert_eq!(
            payloads[0].to_json(),
            json!({
                "Cisco-IOS-XE-native:Vlan": {
                    "name": "100",
                    "ip": { "address": {
                        "primary": { "address": "10.1.1.1", "mask": "255.255.255.0" },
                    } },
                }
            })
        );

        // So the device reads the field back as absent, which must not
        // register as drift against the declared empty list.
        let readings = vec![Some(payloads.into_iter().next().expect("one stage"))];
        let observed = kind.flatten_all(&readings).expect("flatten ok");
        assert_eq!(observed.get("secondary_ip"), None);
        assert_eq!(xeconf_core::drift(&kind, &declared, &observed), Vec::new());
    }

    #[test]
    fn svi_requires_vlanid_and_ip() {
        let kind = interface_vlan();
        assert!(kind.expand_all(&DeclaredRecord::new().with("vlanid", 100)).is_err());
        assert!(kind.expand_all(&DeclaredRecord::new().with("ip", "10.1.1.1/24")).is_err());
    }
}
