//! IPC Layer - typed channels between the host and UI surfaces
//!
//! This module provides:
//! - Direction markers and typed channel handles
//! - The channel registry and the application's channel namespace
//! - Host endpoint (scoped listeners, send, broadcast)
//! - Surface endpoint (listeners, send to host)
//! - JSON payload snapshots
//!
//! Sending against a channel's direction does not compile:
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use olive::ipc::{ChannelRegistry, HostToUiOnly, SurfaceEndpoint};
//!
//! let registry = Arc::new(ChannelRegistry::new());
//! let save_request = registry.declare::<bool, HostToUiOnly>("SAVE_REQUEST").unwrap();
//! let surface = SurfaceEndpoint::detached(registry);
//! surface.send(&save_request, &true).unwrap();
//! ```

pub mod channel;
pub mod channels;
pub mod codec;
pub mod host;
pub mod messages;
pub mod registry;
pub mod surface;

pub use channel::{
    Channel, ChannelDescriptor, ChannelDirection, Direction, HostSends, HostToUiOnly, Payload, TwoWay, UiSends,
    UiToHostOnly,
};
pub use channels::{Channels, names};
pub use codec::{deep_clone, restore, snapshot};
pub use host::{HostEndpoint, HostSender};
pub use messages::{Envelope, SurfaceId};
pub use registry::ChannelRegistry;
pub use surface::{SurfaceEndpoint, SurfaceSender};
