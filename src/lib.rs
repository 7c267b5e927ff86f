//! # xaomx
//!
//! OMX-IL core for audio components running on a companion DSP.
//!
//! The core resolves component names to factories, binds every component
//! to a single proxy session, and negotiates tunnels between component
//! ports.
//!
//! ## Features
//!
//! - **Component catalog**: static name/role/factory table for the built-in
//!   decoders, encoder, renderers, capturers and equalizer
//! - **Explicit sessions**: the proxy transport and its auxiliary message
//!   pool are owned by a [`SessionManager`](session::SessionManager), not a global
//! - **Tunnel negotiation**: output-first connect with rollback, input-first
//!   disconnect
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use xaomx::prelude::*;
//!
//! let mut core = OmxCore::local();
//! core.init()?;
//!
//! let decoder = core.get_handle("OMX.xa.mp3.decoder", None, Arc::new(NoCallbacks))?;
//! let renderer = core.get_handle("OMX.RENESAS.AUDIO.DSP.RENDERER", None, Arc::new(NoCallbacks))?;
//!
//! core.setup_tunnel(Some(&decoder), 1, Some(&renderer), 0)?;
//! core.teardown_tunnel(Some(&decoder), 1, Some(&renderer), 0)?;
//!
//! core.free_handle(Some(renderer))?;
//! core.free_handle(Some(decoder))?;
//! core.deinit()?;
//! # Ok::<(), xaomx::OmxError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod component;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod omx;
pub mod proxy;
pub mod session;
pub mod tunnel;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::{Catalog, CatalogEntry};
    pub use crate::component::{
        AppData, Component, ComponentCallbacks, ComponentEvent, ComponentHandle, NoCallbacks,
    };
    pub use crate::error::{ErrorKind, OmxError, Result};
    pub use crate::omx::OmxCore;
    pub use crate::session::{Session, SessionConfig, SessionManager};
    pub use crate::tunnel::{BufferSupplier, TunnelFlags, TunnelSetup};
}

pub use error::{ErrorKind, OmxError, Result};
pub use omx::OmxCore;
