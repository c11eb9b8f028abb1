//! UI-surface side of the channel layer.
//!
//! A surface either has a host attached (desktop) or runs detached (for
//! example in a browser demo), in which case sends are no-ops and no
//! messages ever arrive.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use super::channel::{Channel, HostSends, Payload, UiSends};
use super::codec::{restore, snapshot};
use super::messages::{Envelope, SurfaceId};
use super::registry::ChannelRegistry;
use crate::error::Result;

/// Cloneable sending half of a surface endpoint.
#[derive(Debug, Clone)]
pub struct SurfaceSender {
    id: SurfaceId,
    host_tx: Option<mpsc::UnboundedSender<Envelope>>,
}

impl SurfaceSender {
    /// This surface's identity.
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Whether a host process is attached.
    pub fn host_attached(&self) -> bool {
        self.host_tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Send to the host.
    ///
    /// Serialization failure is returned. With no host attached this is a
    /// no-op.
    pub fn send<T: Payload, D: UiSends>(&self, channel: &Channel<T, D>, payload: &T) -> Result<()> {
        let value = snapshot(payload)?;
        match &self.host_tx {
            Some(tx) => {
                if tx.send(Envelope::from_surface(self.id, channel.name(), value)).is_err() {
                    log::debug!("Host gone, dropped {} from {}", channel.name(), self.id);
                }
            }
            None => log::debug!("No host attached, dropped {} from {}", channel.name(), self.id),
        }
        Ok(())
    }
}

/// A surface's end of every channel.
pub struct SurfaceEndpoint {
    registry: Arc<ChannelRegistry>,
    sender: SurfaceSender,
    inbox: mpsc::UnboundedReceiver<Envelope>,
    listeners: HashMap<String, Vec<Box<dyn FnMut(&Value) + Send>>>,
}

impl SurfaceEndpoint {
    pub(crate) fn connected(
        id: SurfaceId,
        registry: Arc<ChannelRegistry>,
        host_tx: mpsc::UnboundedSender<Envelope>,
        inbox: mpsc::UnboundedReceiver<Envelope>,
    ) -> Self {
        Self {
            registry,
            sender: SurfaceSender {
                id,
                host_tx: Some(host_tx),
            },
            inbox,
            listeners: HashMap::new(),
        }
    }

    /// A surface with no host: nothing is sent and nothing arrives.
    pub fn detached(registry: Arc<ChannelRegistry>) -> Self {
        let (_tx, inbox) = mpsc::unbounded_channel();
        Self {
            registry,
            sender: SurfaceSender {
                id: SurfaceId(0),
                host_tx: None,
            },
            inbox,
            listeners: HashMap::new(),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.sender.id
    }

    /// A cloneable sender for use inside listeners.
    pub fn sender(&self) -> SurfaceSender {
        self.sender.clone()
    }

    pub fn host_attached(&self) -> bool {
        self.sender.host_attached()
    }

    /// Send to the host.
    pub fn send<T: Payload, D: UiSends>(&self, channel: &Channel<T, D>, payload: &T) -> Result<()> {
        self.sender.send(channel, payload)
    }

    /// Run `callback` for each message the host sends on `channel`.
    pub fn on_update<T, D, F>(&mut self, channel: &Channel<T, D>, mut callback: F)
    where
        T: Payload,
        D: HostSends,
        F: FnMut(T) + Send + 'static,
    {
        if !self.host_attached() {
            return;
        }
        let channel_name = channel.name().to_string();
        self.listeners
            .entry(channel.name().to_string())
            .or_default()
            .push(Box::new(move |value| match restore::<T>(value) {
                Ok(payload) => callback(payload),
                Err(e) => log::warn!("Dropped undecodable {} message: {}", channel_name, e),
            }));
    }

    /// Deliver every queued message, returning how many were taken.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(envelope) = self.inbox.try_recv() {
            self.dispatch(envelope);
            count += 1;
        }
        count
    }

    /// Wait for the next message and deliver it. Returns `false` once the
    /// host has gone away.
    pub async fn dispatch_next(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(envelope) => {
                self.dispatch(envelope);
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, envelope: Envelope) {
        match self.registry.direction_of(&envelope.channel) {
            Some(direction) if direction.host_can_send() => {}
            _ => {
                log::warn!("{} ignored {}: not a host-to-ui channel", self.sender.id, envelope.channel);
                return;
            }
        }
        if let Some(listeners) = self.listeners.get_mut(&envelope.channel) {
            for listener in listeners.iter_mut() {
                listener(&envelope.payload);
            }
        }
    }
}
