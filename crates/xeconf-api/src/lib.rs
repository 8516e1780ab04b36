// xeconf-api: RESTCONF transport for IOS-XE devices. Implements the
// xeconf-core `RemoteStore` contract over HTTPS with basic auth and the
// yang-data JSON media type.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{DeviceConfig, RestconfClient};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig, YANG_DATA_JSON};
