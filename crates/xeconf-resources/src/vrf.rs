// ── VRF table ──
//
// VRF definitions under `native/vrf/definition`. Address families are
// presence containers per family, and route targets are split into
// import/export lists of `asn-ip` community strings.

use xeconf_core::{BlockSpec, FieldProjection, ResourceKind, WriteStage};

pub fn vrf() -> ResourceKind {
    ResourceKind::new(
        "vrf",
        &["name"],
        vec![WriteStage::new(
            "definition",
            "data/Cisco-IOS-XE-native:native/vrf/definition={name}",
            "Cisco-IOS-XE-native:definition",
            vec![
                FieldProjection::string("name", &["name"]).required(),
                FieldProjection::string("description", &["description"]),
                FieldProjection::string("rd", &["rd"]),
                FieldProjection::presence_container(
                    "address_family_ipv4",
                    &["address-family", "ipv4"],
                ),
                FieldProjection::presence_container(
                    "address_family_ipv6",
                    &["address-family", "ipv6"],
                ),
                FieldProjection::repeated(
                    "route_target_import",
                    &["route-target", "import"],
                    BlockSpec::new(vec![FieldProjection::string("rt", &["asn-ip"]).required()]),
                ),
                FieldProjection::repeated(
                    "route_target_export",
                    &["route-target", "export"],
                    BlockSpec::new(vec![FieldProjection::string("rt", &["asn-ip"]).required()]),
                ),
            ],
        )],
    )
}
