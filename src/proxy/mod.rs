//! Proxy transport to the DSP and its message pools.
//!
//! Components run on a companion DSP and are driven through a proxy. The
//! core only needs a narrow slice of it: open and close the transport on a
//! given DSP core, and allocate or free message pools.
//!
//! [`LocalProxy`] is an in-process implementation that backs pools with heap
//! memory. It is what [`OmxCore::new`](crate::omx::OmxCore::new) uses by
//! default and what the tests run against.

mod bitmap;
mod pool;

pub use pool::{AUX_POOL_MSG_LENGTH, AUX_POOL_SLOTS, AuxBuffer, MessagePool, PoolConfig, PoolKind};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Errors reported by a proxy transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The transport is already open.
    #[error("proxy already open on core {0}")]
    AlreadyOpen(u32),

    /// The transport is not open.
    #[error("proxy not open")]
    NotOpen,

    /// The requested DSP core does not exist.
    #[error("no such DSP core: {0}")]
    NoSuchCore(u32),

    /// A pool could not be allocated.
    #[error("cannot allocate {kind:?} pool of {slots} x {slot_size} bytes")]
    PoolAlloc {
        /// Pool kind.
        kind: PoolKind,
        /// Requested slot count.
        slots: usize,
        /// Requested slot size.
        slot_size: usize,
    },

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// The DSP proxy as seen by the core.
///
/// Implementations guard their own state; the core calls these methods from
/// whichever thread owns the session.
pub trait Proxy: Send + Sync {
    /// Open the transport to DSP core `core`.
    fn open(&self, core: u32) -> Result<(), ProxyError>;

    /// Close the transport. Closing a closed transport is a no-op.
    fn close(&self);

    /// Whether the transport is open.
    fn is_open(&self) -> bool;

    /// Allocate a message pool shared with the DSP.
    fn pool_alloc(&self, config: PoolConfig) -> Result<Arc<MessagePool>, ProxyError>;

    /// Release a pool obtained from [`pool_alloc`](Self::pool_alloc).
    fn pool_free(&self, pool: Arc<MessagePool>) {
        drop(pool);
    }
}

/// In-process proxy with heap-backed pools.
#[derive(Debug)]
pub struct LocalProxy {
    cores: u32,
    opened: Mutex<Option<u32>>,
    pools: AtomicUsize,
}

impl LocalProxy {
    /// Create a proxy exposing a single DSP core.
    pub fn new() -> Self {
        Self::with_cores(1)
    }

    /// Create a proxy exposing `cores` DSP cores.
    pub fn with_cores(cores: u32) -> Self {
        Self {
            cores,
            opened: Mutex::new(None),
            pools: AtomicUsize::new(0),
        }
    }

    /// The core the transport is open on, if any.
    pub fn core(&self) -> Option<u32> {
        *self.opened.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of pools allocated and not yet freed.
    pub fn live_pools(&self) -> usize {
        self.pools.load(Ordering::Acquire)
    }
}

impl Default for LocalProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl Proxy for LocalProxy {
    fn open(&self, core: u32) -> Result<(), ProxyError> {
        if core >= self.cores {
            return Err(ProxyError::NoSuchCore(core));
        }
        let mut opened = self.opened.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = *opened {
            return Err(ProxyError::AlreadyOpen(current));
        }
        *opened = Some(core);
        tracing::debug!(core, "proxy transport opened");
        Ok(())
    }

    fn close(&self) {
        let mut opened = self.opened.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(core) = opened.take() {
            tracing::debug!(core, "proxy transport closed");
        }
    }

    fn is_open(&self) -> bool {
        self.core().is_some()
    }

    fn pool_alloc(&self, config: PoolConfig) -> Result<Arc<MessagePool>, ProxyError> {
        if !self.is_open() {
            return Err(ProxyError::NotOpen);
        }
        let pool = MessagePool::new(config).ok_or(ProxyError::PoolAlloc {
            kind: config.kind,
            slots: config.slots,
            slot_size: config.slot_size,
        })?;
        self.pools.fetch_add(1, Ordering::AcqRel);
        Ok(Arc::new(pool))
    }

    fn pool_free(&self, pool: Arc<MessagePool>) {
        let freed = self
            .pools
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if freed.is_err() {
            tracing::warn!(kind = ?pool.kind(), "freeing a pool this proxy did not allocate");
        }
        drop(pool);
    }
}
