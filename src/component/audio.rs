//! DSP-proxied audio component.
//!
//! Every built-in component (decoders, encoder, renderers, capturers,
//! equalizer) is an [`AudioComponent`] driven by a static
//! [`ComponentDescription`]. The component owns one auxiliary message slot
//! of its session for as long as it lives, so the auxiliary pool bounds the
//! number of live components.

use super::port::{PortDefinition, PortDirection, PortTemplate};
use super::{AppData, Component, ComponentCallbacks, ComponentEvent, ComponentHandle};
use crate::error::{OmxError, Result};
use crate::proxy::AuxBuffer;
use crate::session::Session;
use crate::tunnel::{BufferSupplier, TunnelFlags, TunnelSetup};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Static description of a component kind.
#[derive(Debug)]
pub struct ComponentDescription {
    /// Component name, e.g. `OMX.xa.mp3.decoder`.
    pub name: &'static str,
    /// Standard role, e.g. `audio_decoder.mp3`.
    pub role: &'static str,
    /// Ports, indexed by position.
    pub ports: &'static [PortTemplate],
}

/// Lifecycle state of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// Created and configurable; tunnels may be changed.
    Loaded,
    /// Deinitialized; every further request fails.
    Invalid,
}

#[derive(Debug, Clone)]
struct Tunnel {
    peer: String,
    peer_port: u32,
    supplier: BufferSupplier,
}

#[derive(Debug)]
struct Inner {
    state: ComponentState,
    tunnels: Vec<Option<Tunnel>>,
    aux: Option<AuxBuffer>,
}

/// A component running on the DSP behind the session's proxy.
pub struct AudioComponent {
    desc: &'static ComponentDescription,
    session: Session,
    app_data: AppData,
    callbacks: Arc<dyn ComponentCallbacks>,
    inner: Mutex<Inner>,
}

impl AudioComponent {
    /// Create a component of kind `desc` bound to `session`.
    ///
    /// Fails with `InsufficientResources` when the session's auxiliary pool
    /// has no free slot.
    pub fn new(
        desc: &'static ComponentDescription,
        session: &Session,
        app_data: AppData,
        callbacks: Arc<dyn ComponentCallbacks>,
    ) -> Result<Self> {
        let aux = session.loan_aux().ok_or_else(|| {
            tracing::warn!(component = desc.name, "auxiliary pool exhausted");
            OmxError::InsufficientResources
        })?;

        tracing::debug!(
            component = desc.name,
            role = desc.role,
            aux_slot = aux.slot_index(),
            "component created"
        );

        Ok(Self {
            desc,
            session: session.clone(),
            app_data,
            callbacks,
            inner: Mutex::new(Inner {
                state: ComponentState::Loaded,
                tunnels: vec![None; desc.ports.len()],
                aux: Some(aux),
            }),
        })
    }

    /// Create a component and wrap it in a handle.
    pub fn create(
        desc: &'static ComponentDescription,
        session: &Session,
        app_data: AppData,
        callbacks: Arc<dyn ComponentCallbacks>,
    ) -> Result<ComponentHandle> {
        let component = Self::new(desc, session, app_data, callbacks)?;
        Ok(ComponentHandle::new(component))
    }

    /// Static description of this component's kind.
    pub fn description(&self) -> &'static ComponentDescription {
        self.desc
    }

    /// Session the component was created in.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Caller data given at creation.
    pub fn app_data(&self) -> &AppData {
        &self.app_data
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ComponentState {
        self.lock().state
    }

    /// Name and port of the peer tunneled to `port`, if any.
    pub fn tunnel_peer(&self, port: u32) -> Option<(String, u32)> {
        self.lock()
            .tunnels
            .get(port as usize)
            .and_then(|t| t.as_ref())
            .map(|t| (t.peer.clone(), t.peer_port))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn template(&self, port: u32) -> Result<&'static PortTemplate> {
        self.desc
            .ports
            .get(port as usize)
            .ok_or(OmxError::BadPortIndex)
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.state() {
            ComponentState::Loaded => Ok(()),
            ComponentState::Invalid => Err(OmxError::InvalidState),
        }
    }

    fn notify(&self, event: ComponentEvent) {
        self.callbacks.event(self.desc.name, &self.app_data, event);
    }

    /// Input side of a tunnel: check the peer's port and settle the supplier.
    fn settle_input(
        &self,
        template: &PortTemplate,
        port: u32,
        peer: &ComponentHandle,
        peer_port: u32,
        setup: &mut TunnelSetup,
    ) -> Result<()> {
        match peer.port_definition(peer_port) {
            Ok(peer_def) => {
                if !template.definition(port).accepts(&peer_def) {
                    tracing::warn!(
                        component = self.desc.name,
                        port,
                        peer = peer.name(),
                        peer_port,
                        "peer port not compatible"
                    );
                    return Err(OmxError::PortsNotCompatible);
                }
            }
            // Peers that cannot describe their ports are taken on trust.
            Err(OmxError::NotImplemented) => {}
            Err(e) => {
                tracing::warn!(
                    component = self.desc.name,
                    peer = peer.name(),
                    peer_port,
                    error = %e,
                    "cannot query peer port"
                );
                return Err(OmxError::PortsNotCompatible);
            }
        }

        if setup.supplier == BufferSupplier::Unspecified {
            setup.supplier = template.preferred_supplier;
        }
        Ok(())
    }
}

impl Component for AudioComponent {
    fn name(&self) -> &str {
        self.desc.name
    }

    fn role(&self) -> Option<&str> {
        Some(self.desc.role)
    }

    fn port_definition(&self, port: u32) -> Result<PortDefinition> {
        self.ensure_loaded()?;
        Ok(self.template(port)?.definition(port))
    }

    fn buffer_supplier(&self, port: u32) -> Result<BufferSupplier> {
        self.template(port)?;
        self.ensure_loaded()?;
        let inner = self.lock();
        Ok(inner.tunnels[port as usize]
            .as_ref()
            .map(|t| t.supplier)
            .unwrap_or_default())
    }

    fn tunnel_request(
        &self,
        port: u32,
        peer: Option<&ComponentHandle>,
        peer_port: u32,
        setup: &mut TunnelSetup,
    ) -> Result<()> {
        let template = self.template(port)?;
        self.ensure_loaded()?;

        let Some(peer) = peer else {
            let removed = self.lock().tunnels[port as usize].take();
            if removed.is_some() {
                tracing::debug!(component = self.desc.name, port, "tunnel removed");
                self.notify(ComponentEvent::PortSettingsChanged { port });
            }
            return Ok(());
        };

        match template.direction {
            PortDirection::Output => {
                setup.supplier = template.preferred_supplier;
                setup.flags = if template.read_only {
                    TunnelFlags::READ_ONLY
                } else {
                    TunnelFlags::empty()
                };
            }
            PortDirection::Input => {
                self.settle_input(template, port, peer, peer_port, setup)?;
            }
        }

        {
            let mut inner = self.lock();
            if inner.state != ComponentState::Loaded {
                return Err(OmxError::InvalidState);
            }
            inner.tunnels[port as usize] = Some(Tunnel {
                peer: peer.name().to_string(),
                peer_port,
                supplier: setup.supplier,
            });
        }

        tracing::debug!(
            component = self.desc.name,
            port,
            peer = peer.name(),
            peer_port,
            supplier = ?setup.supplier,
            flags = setup.flags.bits(),
            "tunnel recorded"
        );
        self.notify(ComponentEvent::PortSettingsChanged { port });
        Ok(())
    }

    fn deinit(&self) -> Result<()> {
        let aux = {
            let mut inner = self.lock();
            if inner.state == ComponentState::Invalid {
                return Err(OmxError::InvalidState);
            }
            inner.state = ComponentState::Invalid;
            inner.tunnels.iter_mut().for_each(|t| *t = None);
            inner.aux.take()
        };
        drop(aux);

        tracing::debug!(component = self.desc.name, "component destroyed");
        Ok(())
    }
}

impl std::fmt::Debug for AudioComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioComponent")
            .field("name", &self.desc.name)
            .field("role", &self.desc.role)
            .field("state", &self.state())
            .finish()
    }
}
