// xeconf-resources: projection tables for the IOS-XE objects the engine
// manages. Everything in this crate is data -- paths, envelopes, field
// projections -- consumed by the xeconf-core mapper and reconciler.

use xeconf_core::{RegistryError, ResourceRegistry};

pub mod bgp;
pub mod interface;
pub mod vlan;
pub mod vrf;

pub use bgp::{bgp_neighbor, bgp_neighbor_prefix_list, bgp_router};
pub use interface::{port_channel, port_channel_subinterface};
pub use vlan::{interface_vlan, l2_vlan};
pub use vrf::vrf;

/// Registry preloaded with every supported resource kind.
pub fn default_registry() -> Result<ResourceRegistry, RegistryError> {
    let mut registry = ResourceRegistry::new();
    registry.register(l2_vlan())?;
    registry.register(interface_vlan())?;
    registry.register(port_channel())?;
    registry.register(port_channel_subinterface())?;
    registry.register(bgp_router())?;
    registry.register(bgp_neighbor())?;
    registry.register(bgp_neighbor_prefix_list())?;
    registry.register(vrf())?;
    Ok(registry)
}
