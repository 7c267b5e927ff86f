//! Session management: the proxy transport plus its auxiliary pool.
//!
//! A [`SessionManager`] owns at most one live session. The session is live
//! exactly while its auxiliary pool is allocated. Components hold a cheap
//! [`Session`] clone taken from the manager at creation time.

use crate::error::{ErrorKind, OmxError};
use crate::proxy::{AuxBuffer, MessagePool, PoolConfig, Proxy, ProxyError};
use std::sync::Arc;
use thiserror::Error;

/// Errors from opening or closing a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session is already live on this manager.
    #[error("session already open")]
    AlreadyOpen,

    /// No session is live on this manager.
    #[error("session not open")]
    NotOpen,

    /// The proxy failed to open or to allocate the auxiliary pool.
    #[error("proxy failure: {0}")]
    Proxy(#[from] ProxyError),
}

impl SessionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyOpen | Self::Proxy(_) => ErrorKind::ResourceExhausted,
            Self::NotOpen => ErrorKind::InvalidState,
        }
    }
}

impl From<SessionError> for OmxError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::AlreadyOpen | SessionError::Proxy(_) => OmxError::InsufficientResources,
            SessionError::NotOpen => OmxError::Undefined,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// DSP core the proxy transport is opened on.
    pub dsp_core: u32,
    /// Shape of the auxiliary control-message pool.
    pub aux_pool: PoolConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dsp_core: 0,
            aux_pool: PoolConfig::auxiliary(),
        }
    }
}

impl SessionConfig {
    /// Set the DSP core.
    pub fn with_dsp_core(mut self, core: u32) -> Self {
        self.dsp_core = core;
        self
    }

    /// Set the auxiliary pool shape.
    pub fn with_aux_pool(mut self, aux_pool: PoolConfig) -> Self {
        self.aux_pool = aux_pool;
        self
    }
}

/// A live session as handed to component factories.
#[derive(Clone)]
pub struct Session {
    proxy: Arc<dyn Proxy>,
    aux: Arc<MessagePool>,
}

impl Session {
    /// The proxy transport.
    pub fn proxy(&self) -> &Arc<dyn Proxy> {
        &self.proxy
    }

    /// The auxiliary message pool.
    pub fn aux_pool(&self) -> &Arc<MessagePool> {
        &self.aux
    }

    /// Loan one auxiliary message slot.
    pub fn loan_aux(&self) -> Option<AuxBuffer> {
        self.aux.loan()
    }

    /// Whether two sessions are the same live session.
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.aux, &other.aux)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("aux", &self.aux).finish()
    }
}

/// Owner of the proxy session.
///
/// Open and close take `&mut self`, so lifecycle calls on one manager are
/// serialized by ownership.
pub struct SessionManager {
    proxy: Arc<dyn Proxy>,
    config: SessionConfig,
    aux: Option<Arc<MessagePool>>,
}

impl SessionManager {
    /// Create a manager with the default configuration.
    pub fn new(proxy: Arc<dyn Proxy>) -> Self {
        Self::with_config(proxy, SessionConfig::default())
    }

    /// Create a manager with a custom configuration.
    pub fn with_config(proxy: Arc<dyn Proxy>, config: SessionConfig) -> Self {
        Self {
            proxy,
            config,
            aux: None,
        }
    }

    /// Bring the session up.
    ///
    /// Opens the proxy transport, then allocates the auxiliary pool. If the
    /// pool cannot be allocated the transport is closed again.
    pub fn open_session(&mut self) -> Result<(), SessionError> {
        if self.aux.is_some() {
            return Err(SessionError::AlreadyOpen);
        }

        self.proxy.open(self.config.dsp_core)?;

        let aux = match self.proxy.pool_alloc(self.config.aux_pool) {
            Ok(aux) => aux,
            Err(e) => {
                self.proxy.close();
                return Err(e.into());
            }
        };
        self.aux = Some(aux);

        tracing::info!(
            core = self.config.dsp_core,
            aux_slots = self.config.aux_pool.slots,
            aux_slot_size = self.config.aux_pool.slot_size,
            "proxy initialized"
        );
        Ok(())
    }

    /// Tear the session down: free the auxiliary pool, then close the
    /// transport.
    pub fn close_session(&mut self) -> Result<(), SessionError> {
        let aux = self.aux.take().ok_or(SessionError::NotOpen)?;
        self.proxy.pool_free(aux);
        self.proxy.close();

        tracing::info!(core = self.config.dsp_core, "proxy destroyed");
        Ok(())
    }

    /// Whether a session is live.
    pub fn is_live(&self) -> bool {
        self.aux.is_some()
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<Session> {
        self.aux.as_ref().map(|aux| Session {
            proxy: Arc::clone(&self.proxy),
            aux: Arc::clone(aux),
        })
    }

    /// The manager's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("live", &self.is_live())
            .finish()
    }
}
