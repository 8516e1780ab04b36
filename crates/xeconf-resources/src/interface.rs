// ── Port-channel tables ──
//
// Aggregate interfaces and their dot1q subinterfaces. Both share the SVI
// field family, but here the primary address is optional (an L2-only
// port-channel has none) and the list key doubles as the declared name:
// "10" for the aggregate, "10.20" for a subinterface.

use xeconf_core::{BlockSpec, FieldProjection, ResourceKind, WriteStage};

fn interface_fields() -> Vec<FieldProjection> {
    vec![
        FieldProjection::string("name", &["name"]).required(),
        FieldProjection::string("description", &["description"]),
        FieldProjection::cidr("ip", &["ip", "address", "primary"]),
        FieldProjection::repeated(
            "secondary_ip",
            &["ip", "address", "secondary"],
            BlockSpec::new(vec![FieldProjection::cidr("ip", &[]).required()]).marker("secondary"),
        ),
        FieldProjection::tri_state("shutdown", &["shutdown"]),
        FieldProjection::string("vrf", &["vrf", "forwarding"]),
    ]
}

pub fn port_channel() -> ResourceKind {
    ResourceKind::new(
        "port_channel",
        &["name"],
        vec![WriteStage::new(
            "interface",
            "data/Cisco-IOS-XE-native:native/interface/Port-channel={name}",
            "Cisco-IOS-XE-native:Port-channel",
            interface_fields(),
        )],
    )
}

pub fn port_channel_subinterface() -> ResourceKind {
    ResourceKind::new(
        "port_channel_subinterface",
        &["name"],
        vec![WriteStage::new(
            "interface",
            "data/Cisco-IOS-XE-native:native/interface/Port-channel-subinterface/Port-channel={name}",
            "Cisco-IOS-XE-native:Port-channel",
            interface_fields(),
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use xeconf_core::{DeclaredRecord, Value};

    #[test]
    fn port_channel_without_ip_is_valid() {
        let kind = port_channel();
        let declared = DeclaredRecord::new().with("name", "10").with("shutdown", false);
        let payloads = kind.expand_all(&declared).expect("expand ok");
        assert_eq!(
            payloads[0].to_json(),
            json!({ "Cisco-IOS-XE-native:Port-channel": { "name": "10" } })
        );
    }

    #[test]
    fn subinterface_key_renders_dotted_name() {
        let kind = port_channel_subinterface();
        let declared = DeclaredRecord::new()
            .with("name", "10.20")
            .with("ip", "172.16.0.1/30");
        let identity = kind.derive_identity(&declared).expect("identity ok");
        assert_eq!(
            kind.parent_stage().path().render(&identity).expect("render ok"),
            "data/Cisco-IOS-XE-native:native/interface/Port-channel-subinterface/Port-channel=10.20"
        );
    }

    #[test]
    fn port_channel_round_trips() {
        let kind = port_channel();
        let declared = DeclaredRecord::new()
            .with("name", "10")
            .with("description", "uplink bundle")
            .with("ip", "192.0.2.1/31");
        let payloads = kind.expand_all(&declared).expect("expand ok");
        let readings: Vec<_> = payloads.into_iter().map(Some).collect();
        let flattened = kind.flatten_all(&readings).expect("flatten ok");
        assert_eq!(flattened.get("name"), Some(&Value::Str("10".into())));
        assert_eq!(flattened.get("ip"), Some(&Value::Str("192.0.2.1/31".into())));
        assert_eq!(flattened.get("shutdown"), Some(&Value::Bool(false)));
    }
}
