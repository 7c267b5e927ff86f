//! Tracing spans for core calls and tunnel negotiation.
//!
//! The core emits structured `tracing` events; these helpers give them a
//! consistent span context. Install any subscriber to see them, e.g.
//!
//! ```rust,ignore
//! tracing_subscriber::fmt().with_env_filter("xaomx=debug").init();
//! ```

use crate::component::ComponentHandle;
use tracing::{Level, Span, span};

/// Span for one boundary call on the core (`init`, `get_handle`, ...).
#[inline]
pub fn span_core_call(op: &'static str) -> Span {
    span!(Level::DEBUG, "omx", op = op)
}

/// Span for one tunnel connect or disconnect.
pub fn span_tunnel(
    op: &'static str,
    output: Option<&ComponentHandle>,
    output_port: u32,
    input: Option<&ComponentHandle>,
    input_port: u32,
) -> Span {
    span!(
        Level::DEBUG,
        "tunnel",
        op = op,
        output = output.map(|h| h.name()).unwrap_or("-"),
        output_port = output_port,
        input = input.map(|h| h.name()).unwrap_or("-"),
        input_port = input_port
    )
}
