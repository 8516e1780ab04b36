// ── BGP tables ──
//
// The BGP process and its neighbors live under the Cisco-IOS-XE-bgp
// augmentation of `native/router`. A neighbor is the one two-stage kind:
// the neighbor entry itself plus its ipv4-unicast address-family config,
// written in that order. Deleting the neighbor entry cascades the
// address-family config, so delete targets the parent stage only.

use xeconf_core::{BlockSpec, FieldProjection, ResourceKind, WriteStage};

/// The BGP routing process, keyed by autonomous system number. The yang
/// key is string-typed to admit asdot notation.
pub fn bgp_router() -> ResourceKind {
    ResourceKind::new(
        "bgp_router",
        &["as"],
        vec![WriteStage::new(
            "bgp",
            "data/Cisco-IOS-XE-native:native/router/Cisco-IOS-XE-bgp:bgp={as}",
            "Cisco-IOS-XE-bgp:bgp",
            vec![
                FieldProjection::int("as", &["id"]).required().remote_string(),
                FieldProjection::bool("log_neighbor_changes", &["bgp", "log-neighbor-changes"])
                    .computed(),
            ],
        )],
    )
}

pub fn bgp_neighbor() -> ResourceKind {
    ResourceKind::new(
        "bgp_neighbor",
        &["as", "ip"],
        vec![
            WriteStage::new(
                "neighbor",
                "data/Cisco-IOS-XE-native:native/router/Cisco-IOS-XE-bgp:bgp={as}/neighbor={ip}",
                "Cisco-IOS-XE-bgp:neighbor",
                vec![
                    FieldProjection::string("ip", &["id"]).required(),
                    FieldProjection::string("description", &["description"]),
                    FieldProjection::tri_state(
                        "disable_connected_check",
                        &["disable-connected-check"],
                    ),
                    FieldProjection::int("ebgp_multihop", &["ebgp-multihop", "max-hop"]),
                    FieldProjection::int("local_as", &["local-as", "as-no"]),
                    FieldProjection::int("remote_as", &["remote-as"]).required(),
                    FieldProjection::tri_state("shutdown", &["shutdown"]),
                    FieldProjection::repeated(
                        "timers",
                        &["timers"],
                        BlockSpec::new(vec![
                            FieldProjection::int("keepalive_interval", &["keepalive-interval"])
                                .required(),
                            FieldProjection::int("holdtime", &["holdtime"]).required(),
                            FieldProjection::int(
                                "minimum_neighbor_hold",
                                &["minimum-neighbor-hold"],
                            ),
                        ])
                        .singleton(),
                    ),
                ],
            ),
            WriteStage::new(
                "neighbor-config",
                "data/Cisco-IOS-XE-native:native/router/Cisco-IOS-XE-bgp:bgp={as}/address-family/no-vrf/ipv4=unicast/ipv4-unicast/neighbor={ip}",
                "Cisco-IOS-XE-bgp:neighbor",
                vec![
                    FieldProjection::string("ip", &["id"]).required(),
                    FieldProjection::presence_container(
                        "default_originate",
                        &["default-originate"],
                    ),
                    FieldProjection::presence_container(
                        "remove_private_as",
                        &["remove-private-as"],
                    ),
                    FieldProjection::repeated(
                        "prefix_list",
                        &["prefix-list"],
                        BlockSpec::new(vec![
                            FieldProjection::string("direction", &["inout"]).required(),
                            FieldProjection::string("name", &["prefix-list-name"]).required(),
                        ]),
                    ),
                    FieldProjection::string("soft_reconfiguration", &["soft-reconfiguration"]),
                ],
            ),
        ],
    )
}

/// A single prefix-list binding on an existing neighbor, addressed through
/// the router/neighbor identity chain.
pub fn bgp_neighbor_prefix_list() -> ResourceKind {
    ResourceKind::new(
        "bgp_neighbor_prefix_list",
        &["routing_instance", "neighbor_ip", "name"],
        vec![WriteStage::new(
            "prefix-list",
            "data/Cisco-IOS-XE-native:native/router/Cisco-IOS-XE-bgp:bgp={routing_instance}/address-family/no-vrf/ipv4=unicast/ipv4-unicast/neighbor={neighbor_ip}/prefix-list={name}",
            "Cisco-IOS-XE-bgp:prefix-list",
            vec![
                FieldProjection::string("name", &["prefix-list-name"]).required(),
                FieldProjection::string("direction", &["inout"]).required(),
            ],
        )],
    )
}
