//! Host side of the channel layer.
//!
//! Provides:
//! - Surface table (identity, parent, delivery queue)
//! - Scoped listeners filtered by sender or by sender's parent
//! - Direct sends and broadcast to every open surface

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::mpsc;

use super::channel::{Channel, HostSends, Payload, UiSends};
use super::codec::{restore, snapshot};
use super::messages::{Envelope, SurfaceId};
use super::registry::ChannelRegistry;
use super::surface::SurfaceEndpoint;
use crate::error::{OliveError, Result};

/// Host-side state for one surface.
#[derive(Debug)]
struct SurfaceSlot {
    parent: Option<SurfaceId>,
    tx: mpsc::UnboundedSender<Envelope>,
}

type SurfaceTable = Arc<RwLock<HashMap<SurfaceId, SurfaceSlot>>>;

/// Cloneable sending half of the host endpoint.
///
/// Listeners capture one of these to reply from inside a callback.
#[derive(Debug, Clone)]
pub struct HostSender {
    surfaces: SurfaceTable,
}

impl HostSender {
    /// Send to one surface.
    ///
    /// Serialization failure is returned. A surface that is unknown, torn
    /// down, or no longer draining its queue is skipped silently.
    pub fn send<T: Payload, D: HostSends>(&self, window: SurfaceId, channel: &Channel<T, D>, payload: &T) -> Result<()> {
        let value = snapshot(payload)?;
        let surfaces = self.surfaces.read().map_err(|e| OliveError::Ipc(e.to_string()))?;
        match surfaces.get(&window) {
            Some(slot) => {
                if slot.tx.send(Envelope::from_host(channel.name(), value)).is_err() {
                    log::debug!("{} no longer receiving, dropped {}", window, channel.name());
                }
            }
            None => log::debug!("{} not available, dropped {}", window, channel.name()),
        }
        Ok(())
    }

    /// Send to every open surface, returning how many were reached.
    pub fn send_to_all_windows<T: Payload, D: HostSends>(&self, channel: &Channel<T, D>, payload: &T) -> Result<usize> {
        let value = snapshot(payload)?;
        let surfaces = self.surfaces.read().map_err(|e| OliveError::Ipc(e.to_string()))?;
        let mut delivered = 0;
        for slot in surfaces.values() {
            if slot.tx.send(Envelope::from_host(channel.name(), value.clone())).is_ok() {
                delivered += 1;
            }
        }
        log::debug!("Broadcast {} to {} surfaces", channel.name(), delivered);
        Ok(delivered)
    }

    /// Whether the surface exists and has not been torn down.
    pub fn is_alive(&self, window: SurfaceId) -> bool {
        self.surfaces
            .read()
            .map(|s| s.contains_key(&window))
            .unwrap_or(false)
    }

    /// Parent of a surface, if it was opened as a child.
    pub fn parent_of(&self, window: SurfaceId) -> Option<SurfaceId> {
        self.surfaces
            .read()
            .ok()
            .and_then(|s| s.get(&window).and_then(|slot| slot.parent))
    }

    /// Open surfaces that are children of `window`.
    pub fn children_of(&self, window: SurfaceId) -> Vec<SurfaceId> {
        let Ok(surfaces) = self.surfaces.read() else {
            return Vec::new();
        };
        let mut children: Vec<SurfaceId> = surfaces
            .iter()
            .filter(|(_, slot)| slot.parent == Some(window))
            .map(|(id, _)| *id)
            .collect();
        children.sort();
        children
    }

    /// Number of surfaces that are not torn down.
    pub fn open_count(&self) -> usize {
        self.surfaces.read().map(|s| s.len()).unwrap_or(0)
    }
}

/// Which senders a listener accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Only messages sent by this surface
    Window(SurfaceId),
    /// Only messages sent by a direct child of this surface
    ChildOf(SurfaceId),
    /// Any surface
    Any,
}

struct HostListener {
    channel: String,
    scope: Scope,
    callback: Box<dyn FnMut(&Value) + Send>,
}

/// The host's end of every channel.
pub struct HostEndpoint {
    registry: Arc<ChannelRegistry>,
    sender: HostSender,
    inbox_tx: mpsc::UnboundedSender<Envelope>,
    inbox_rx: mpsc::UnboundedReceiver<Envelope>,
    listeners: Vec<HostListener>,
    next_surface_id: u64,
}

impl HostEndpoint {
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            registry,
            sender: HostSender {
                surfaces: Arc::new(RwLock::new(HashMap::new())),
            },
            inbox_tx,
            inbox_rx,
            listeners: Vec::new(),
            next_surface_id: 1,
        }
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// A cloneable sender for use inside listeners.
    pub fn sender(&self) -> HostSender {
        self.sender.clone()
    }

    /// Register a new surface and return its endpoint.
    pub fn open_surface(&mut self, parent: Option<SurfaceId>) -> Result<SurfaceEndpoint> {
        let id = SurfaceId(self.next_surface_id);
        self.next_surface_id += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut surfaces = self.sender.surfaces.write().map_err(|e| OliveError::Ipc(e.to_string()))?;
            surfaces.insert(
                id,
                SurfaceSlot { parent, tx },
            );
        }

        log::info!("Opened {} (parent: {:?})", id, parent);
        Ok(SurfaceEndpoint::connected(
            id,
            Arc::clone(&self.registry),
            self.inbox_tx.clone(),
            rx,
        ))
    }

    /// Tear down a surface and drop its listeners.
    ///
    /// The surface's queue closes, so its endpoint stops waiting for
    /// messages. Later sends to it are skipped and messages still queued
    /// from it are ignored.
    pub fn destroy_surface(&mut self, window: SurfaceId) -> Result<()> {
        {
            let mut surfaces = self.sender.surfaces.write().map_err(|e| OliveError::Ipc(e.to_string()))?;
            surfaces
                .remove(&window)
                .ok_or_else(|| OliveError::WindowNotFound(window.to_string()))?;
        }
        self.listeners
            .retain(|l| l.scope != Scope::Window(window) && l.scope != Scope::ChildOf(window));
        log::info!("Destroyed {}", window);
        Ok(())
    }

    /// Run `callback` for each message on `channel` sent by `window`.
    pub fn on_update<T, D, F>(&mut self, window: SurfaceId, channel: &Channel<T, D>, callback: F)
    where
        T: Payload,
        D: UiSends,
        F: FnMut(T) + Send + 'static,
    {
        self.listen(Scope::Window(window), channel, callback);
    }

    /// Run `callback` for each message on `channel` sent by a direct child
    /// of `window`.
    pub fn on_update_from_child<T, D, F>(&mut self, window: SurfaceId, channel: &Channel<T, D>, callback: F)
    where
        T: Payload,
        D: UiSends,
        F: FnMut(T) + Send + 'static,
    {
        self.listen(Scope::ChildOf(window), channel, callback);
    }

    /// Run `callback` for each message on `channel` from any surface.
    pub fn on_update_from_any<T, D, F>(&mut self, channel: &Channel<T, D>, callback: F)
    where
        T: Payload,
        D: UiSends,
        F: FnMut(T) + Send + 'static,
    {
        self.listen(Scope::Any, channel, callback);
    }

    fn listen<T, D, F>(&mut self, scope: Scope, channel: &Channel<T, D>, mut callback: F)
    where
        T: Payload,
        D: UiSends,
        F: FnMut(T) + Send + 'static,
    {
        let name = channel.name().to_string();
        let channel_name = name.clone();
        self.listeners.push(HostListener {
            channel: name,
            scope,
            callback: Box::new(move |value| match restore::<T>(value) {
                Ok(payload) => callback(payload),
                Err(e) => log::warn!("Dropped undecodable {} message: {}", channel_name, e),
            }),
        });
    }

    /// Deliver every queued message, returning how many were taken.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(envelope) = self.inbox_rx.try_recv() {
            self.dispatch(envelope);
            count += 1;
        }
        count
    }

    /// Wait for the next message and deliver it.
    pub async fn dispatch_next(&mut self) -> bool {
        match self.inbox_rx.recv().await {
            Some(envelope) => {
                self.dispatch(envelope);
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, envelope: Envelope) {
        let Some(sender) = envelope.sender else {
            log::warn!("Ignored {} message with no sender", envelope.channel);
            return;
        };

        match self.registry.direction_of(&envelope.channel) {
            Some(direction) if direction.ui_can_send() => {}
            Some(direction) => {
                log::warn!("Ignored {} from {}: channel is {}", envelope.channel, sender, direction);
                return;
            }
            None => {
                log::warn!("Ignored message on undeclared channel {}", envelope.channel);
                return;
            }
        }

        if !self.sender.is_alive(sender) {
            log::debug!("Ignored {} from torn down {}", envelope.channel, sender);
            return;
        }
        let parent = self.sender.parent_of(sender);

        for listener in self.listeners.iter_mut().filter(|l| l.channel == envelope.channel) {
            let accepted = match listener.scope {
                Scope::Window(window) => window == sender,
                Scope::ChildOf(window) => parent == Some(window) && self.sender.is_alive(window),
                Scope::Any => true,
            };
            if accepted {
                (listener.callback)(&envelope.payload);
            }
        }
    }
}
