//! Components and the handles callers hold on them.
//!
//! A component is anything implementing [`Component`]: the core only ever
//! asks it to negotiate a tunnel on one of its ports or to deinitialize
//! itself. Callers hold components through a [`ComponentHandle`].
//!
//! The built-in DSP components are all instances of [`AudioComponent`],
//! parameterised by a static [`ComponentDescription`].

mod audio;
mod builtin;
mod port;

pub use audio::{AudioComponent, ComponentDescription, ComponentState};
pub use builtin::{
    AAC_DECODER, AAC_ENCODER, CAPTURE, EQUALIZER, MP3_DECODER, RENDERER, TDM_CAPTURE,
    TDM_RENDERER, VORBIS_DECODER, create_aac_decoder, create_aac_encoder, create_capture,
    create_equalizer, create_mp3_decoder, create_renderer, create_tdm_capture,
    create_tdm_renderer, create_vorbis_decoder,
};
pub use port::{AudioEncoding, PortDefinition, PortDirection, PortTemplate};

use crate::error::{OmxError, Result};
use crate::tunnel::{BufferSupplier, TunnelSetup};
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;

/// Opaque caller data handed back with every callback.
pub type AppData = Option<Arc<dyn Any + Send + Sync>>;

/// Events a component reports to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentEvent {
    /// A port's settings changed, e.g. it was tunneled or untunneled.
    PortSettingsChanged {
        /// Port index.
        port: u32,
    },
    /// The component hit an asynchronous error.
    Error(OmxError),
}

/// Notifications from a component to the caller that created it.
pub trait ComponentCallbacks: Send + Sync {
    /// Called when `component` raises `event`.
    fn event(&self, component: &str, app_data: &AppData, event: ComponentEvent) {
        let _ = (component, app_data, event);
    }
}

/// Callbacks that ignore every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl ComponentCallbacks for NoCallbacks {}

/// The capability table every component exposes.
pub trait Component: Send + Sync {
    /// Component name, e.g. `OMX.xa.mp3.decoder`.
    fn name(&self) -> &str;

    /// Role the component was created for, if it has one.
    fn role(&self) -> Option<&str> {
        None
    }

    /// Definition of `port`, as queried by tunnel peers.
    fn port_definition(&self, port: u32) -> Result<PortDefinition> {
        let _ = port;
        Err(OmxError::NotImplemented)
    }

    /// Negotiated buffer supplier on `port`.
    fn buffer_supplier(&self, port: u32) -> Result<BufferSupplier> {
        let _ = port;
        Err(OmxError::NotImplemented)
    }

    /// Set up or tear down the tunnel on `port`.
    ///
    /// With a peer, the component records the tunnel and updates `setup`
    /// with its supplier proposal and flags. Without a peer, any tunnel on
    /// `port` is removed.
    fn tunnel_request(
        &self,
        port: u32,
        peer: Option<&ComponentHandle>,
        peer_port: u32,
        setup: &mut TunnelSetup,
    ) -> Result<()>;

    /// Release the component's resources.
    fn deinit(&self) -> Result<()>;
}

/// Caller-visible reference to a live component.
#[derive(Clone)]
pub struct ComponentHandle(Arc<dyn Component>);

impl ComponentHandle {
    /// Wrap a component.
    pub fn new(component: impl Component + 'static) -> Self {
        Self(Arc::new(component))
    }

    /// Wrap an already shared component.
    pub fn from_arc(component: Arc<dyn Component>) -> Self {
        Self(component)
    }

    /// Whether two handles refer to the same component.
    pub fn ptr_eq(&self, other: &ComponentHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for ComponentHandle {
    type Target = dyn Component;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl std::fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ComponentHandle").field(&self.0.name()).finish()
    }
}
