//! The OMX core: the boundary a host framework calls into.
//!
//! [`OmxCore`] bundles a [`SessionManager`] with a [`Catalog`] and exposes
//! the OMX-IL core entry points on top of them. Every operation runs to
//! completion on the calling thread.

use crate::catalog::Catalog;
use crate::component::{AppData, ComponentCallbacks, ComponentHandle};
use crate::error::{OmxError, Result};
use crate::lifecycle;
use crate::observability::span_core_call;
use crate::proxy::{LocalProxy, Proxy};
use crate::session::{Session, SessionConfig, SessionManager};
use crate::tunnel::{self, TunnelSetup};
use std::sync::Arc;

/// OMX-IL core over one proxy session.
#[derive(Debug)]
pub struct OmxCore {
    sessions: SessionManager,
    catalog: Catalog,
}

impl OmxCore {
    /// A core over `proxy` with the built-in catalog and default settings.
    pub fn new(proxy: Arc<dyn Proxy>) -> Self {
        Self::with_config(proxy, SessionConfig::default())
    }

    /// A core over an in-process [`LocalProxy`].
    pub fn local() -> Self {
        Self::new(Arc::new(LocalProxy::new()))
    }

    /// A core with a custom session configuration.
    pub fn with_config(proxy: Arc<dyn Proxy>, config: SessionConfig) -> Self {
        Self {
            sessions: SessionManager::with_config(proxy, config),
            catalog: Catalog::builtin(),
        }
    }

    /// Replace the component catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// `OMX_Init`: bring the proxy session up.
    ///
    /// Fails with `InsufficientResources` if the session is already up or
    /// cannot be created.
    pub fn init(&mut self) -> Result<()> {
        let _span = span_core_call("init").entered();
        self.sessions.open_session().map_err(|e| {
            tracing::warn!(error = %e, "core initialization failed");
            OmxError::from(e)
        })
    }

    /// `OMX_Deinit`: tear the proxy session down.
    ///
    /// Fails with `Undefined` if the session is not up.
    pub fn deinit(&mut self) -> Result<()> {
        let _span = span_core_call("deinit").entered();
        self.sessions.close_session().map_err(|e| {
            tracing::warn!(error = %e, "core deinitialization failed");
            OmxError::from(e)
        })
    }

    /// `OMX_GetHandle`: create the component `name`.
    pub fn get_handle(
        &self,
        name: &str,
        app_data: AppData,
        callbacks: Arc<dyn ComponentCallbacks>,
    ) -> Result<ComponentHandle> {
        let _span = span_core_call("get_handle").entered();
        lifecycle::create_handle(&self.catalog, &self.sessions, name, app_data, callbacks)
    }

    /// `OMX_FreeHandle`: destroy a component.
    pub fn free_handle(&self, handle: Option<ComponentHandle>) -> Result<()> {
        let _span = span_core_call("free_handle").entered();
        lifecycle::destroy_handle(handle)
    }

    /// `OMX_SetupTunnel`: connect an output port to an input port.
    pub fn setup_tunnel(
        &self,
        output: Option<&ComponentHandle>,
        output_port: u32,
        input: Option<&ComponentHandle>,
        input_port: u32,
    ) -> Result<TunnelSetup> {
        let _span = span_core_call("setup_tunnel").entered();
        tunnel::connect(output, output_port, input, input_port)
    }

    /// `OMX_TeardownTunnel`: disconnect an output port from an input port.
    pub fn teardown_tunnel(
        &self,
        output: Option<&ComponentHandle>,
        output_port: u32,
        input: Option<&ComponentHandle>,
        input_port: u32,
    ) -> Result<()> {
        let _span = span_core_call("teardown_tunnel").entered();
        tunnel::disconnect(output, output_port, input, input_port)
    }

    /// `OMX_ComponentNameEnum`: name of the component at `index`.
    ///
    /// Fails with `NoMore` past the end of the catalog.
    pub fn component_name_enum(&self, index: usize) -> Result<&'static str> {
        self.catalog.name_at(index).ok_or(OmxError::NoMore)
    }

    /// `OMX_GetRolesOfComponent`: roles of the component `name`.
    pub fn roles_of_component(&self, name: &str) -> Result<Vec<&'static str>> {
        if name.is_empty() {
            return Err(OmxError::BadParameter);
        }
        let roles = self.catalog.roles_of(name);
        if roles.is_empty() {
            return Err(OmxError::ComponentNotFound);
        }
        Ok(roles)
    }

    /// `OMX_GetComponentsOfRole`: components implementing `role`.
    ///
    /// An unknown role yields an empty list.
    pub fn components_of_role(&self, role: &str) -> Result<Vec<&'static str>> {
        if role.is_empty() {
            return Err(OmxError::BadParameter);
        }
        Ok(self.catalog.components_of_role(role))
    }

    /// Whether the session is up.
    pub fn is_initialized(&self) -> bool {
        self.sessions.is_live()
    }

    /// The live session, if the core is initialized.
    pub fn session(&self) -> Option<Session> {
        self.sessions.session()
    }

    /// The component catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::NoCallbacks;

    #[test]
    fn test_init_deinit_guards() {
        let mut core = OmxCore::local();
        assert_eq!(core.deinit(), Err(OmxError::Undefined));

        core.init().unwrap();
        assert!(core.is_initialized());
        assert_eq!(core.init(), Err(OmxError::InsufficientResources));
        assert!(core.is_initialized());

        core.deinit().unwrap();
        assert!(!core.is_initialized());
        assert_eq!(core.deinit(), Err(OmxError::Undefined));
    }

    #[test]
    fn test_init_failure_on_missing_core() {
        let config = SessionConfig::default().with_dsp_core(1);
        let mut core = OmxCore::with_config(Arc::new(LocalProxy::new()), config);
        assert_eq!(core.init(), Err(OmxError::InsufficientResources));
        assert!(!core.is_initialized());
    }

    #[test]
    fn test_get_handle_before_init() {
        let core = OmxCore::local();
        let err = core
            .get_handle("OMX.xa.mp3.decoder", None, Arc::new(NoCallbacks))
            .unwrap_err();
        assert_eq!(err, OmxError::InvalidState);
    }

    #[test]
    fn test_name_enum() {
        let core = OmxCore::local();
        let names: Vec<_> = (0..)
            .map_while(|i| core.component_name_enum(i).ok())
            .collect();
        assert_eq!(names.len(), 9);
        assert_eq!(names[1], "OMX.xa.mp3.decoder");
        assert_eq!(core.component_name_enum(9), Err(OmxError::NoMore));
    }

    #[test]
    fn test_roles() {
        let core = OmxCore::local();
        assert_eq!(
            core.roles_of_component("OMX.xa.aac.encoder"),
            Ok(vec!["audio_encoder.aac"])
        );
        assert_eq!(
            core.roles_of_component("OMX.nonexistent"),
            Err(OmxError::ComponentNotFound)
        );
        assert_eq!(core.roles_of_component(""), Err(OmxError::BadParameter));

        assert_eq!(
            core.components_of_role("audio_capture.pcm"),
            Ok(vec!["OMX.RENESAS.AUDIO.DSP.CAPTURE"])
        );
        assert_eq!(core.components_of_role("audio_decoder.flac"), Ok(vec![]));
        assert_eq!(core.components_of_role(""), Err(OmxError::BadParameter));
    }
}
