//! Tunnel negotiation between an output port and an input port.
//!
//! Connecting is a two-phase handshake: the output side is asked first so
//! it can propose who supplies buffers, then the input side settles the
//! proposal. If the input side refuses, the output side's half of the
//! tunnel is revoked again. Disconnecting releases the input side first so
//! the sink stops before its source is released.
//!
//! The negotiator does not check that the two sides agree on the supplier;
//! that is left to the components.

use crate::component::ComponentHandle;
use crate::error::{OmxError, Result};
use crate::observability::span_tunnel;

/// Which side of a tunnel provides the data buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferSupplier {
    /// Not decided yet.
    #[default]
    Unspecified,
    /// The input port supplies buffers.
    Input,
    /// The output port supplies buffers.
    Output,
}

/// Tunnel flags proposed by the output side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TunnelFlags(u32);

impl TunnelFlags {
    /// The peer must not modify the supplied buffers.
    pub const READ_ONLY: Self = Self(0x0000_0001);

    /// No flags.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Flags from their raw OMX-IL value.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw OMX-IL value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether all of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for TunnelFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Negotiation record passed to each `tunnel_request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TunnelSetup {
    /// Tunnel flags.
    pub flags: TunnelFlags,
    /// Proposed or settled buffer supplier.
    pub supplier: BufferSupplier,
}

impl TunnelSetup {
    /// A fresh record: no flags, supplier unspecified.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Connect `output_port` of `output` to `input_port` of `input`.
///
/// Either handle may be absent, for tunnels to or from a port the caller
/// drives directly, but not both. Returns the setup as left by the last
/// side asked; it is informational only.
pub fn connect(
    output: Option<&ComponentHandle>,
    output_port: u32,
    input: Option<&ComponentHandle>,
    input_port: u32,
) -> Result<TunnelSetup> {
    if output.is_none() && input.is_none() {
        return Err(OmxError::BadParameter);
    }

    let _span = span_tunnel("connect", output, output_port, input, input_port).entered();
    let mut setup = TunnelSetup::new();

    if let Some(out) = output {
        if let Err(e) = out.tunnel_request(output_port, input, input_port, &mut setup) {
            tracing::warn!(error = %e, code = e.code(), "tunneling failed: output port rejected");
            return Err(e);
        }
    }
    tracing::debug!(
        supplier = ?setup.supplier,
        flags = setup.flags.bits(),
        "first stage of tunneling achieved"
    );

    if let Some(inp) = input {
        if let Err(e) = inp.tunnel_request(input_port, output, output_port, &mut setup) {
            tracing::warn!(error = %e, code = e.code(), "tunneling failed: input port rejected");
            if let Some(out) = output {
                revoke(out, output_port)?;
            }
            return Err(e);
        }
    }
    tracing::debug!(
        supplier = ?setup.supplier,
        flags = setup.flags.bits(),
        "second stage of tunneling achieved"
    );

    Ok(setup)
}

/// Tear down the tunnel between `output_port` of `output` and `input_port`
/// of `input`.
///
/// Both handles are required. The input side is released first; if the
/// output side then fails, the input side stays released.
pub fn disconnect(
    output: Option<&ComponentHandle>,
    output_port: u32,
    input: Option<&ComponentHandle>,
    input_port: u32,
) -> Result<()> {
    let (Some(out), Some(inp)) = (output, input) else {
        return Err(OmxError::BadParameter);
    };

    let _span = span_tunnel("disconnect", output, output_port, input, input_port).entered();

    if let Err(e) = inp.tunnel_request(input_port, None, 0, &mut TunnelSetup::new()) {
        tracing::warn!(error = %e, code = e.code(), "teardown failed: input port rejected");
        return Err(e);
    }

    if let Err(e) = out.tunnel_request(output_port, None, 0, &mut TunnelSetup::new()) {
        tracing::warn!(error = %e, code = e.code(), "teardown failed: output port rejected");
        return Err(e);
    }

    tracing::debug!("tunnel torn down");
    Ok(())
}

/// Undo the output side of a half-made tunnel. A failure here leaves the
/// output port in an unknown state and is reported as `Undefined`.
fn revoke(output: &ComponentHandle, output_port: u32) -> Result<()> {
    output
        .tunnel_request(output_port, None, 0, &mut TunnelSetup::new())
        .map_err(|e| {
            tracing::error!(error = %e, port = output_port, "cannot remove output port");
            OmxError::Undefined
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use std::sync::{Arc, Mutex};

    /// One recorded `tunnel_request` call.
    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        component: &'static str,
        port: u32,
        peer: Option<String>,
        peer_port: u32,
        seen: TunnelSetup,
    }

    type Log = Arc<Mutex<Vec<Call>>>;

    /// Fake component whose answers are scripted per call.
    struct Scripted {
        name: &'static str,
        log: Log,
        /// Results for successive calls; the last one repeats.
        script: Vec<Result<()>>,
        calls: Mutex<usize>,
        proposal: Option<TunnelSetup>,
    }

    impl Scripted {
        fn new(name: &'static str, log: &Log, script: Vec<Result<()>>) -> Self {
            Self {
                name,
                log: Arc::clone(log),
                script,
                calls: Mutex::new(0),
                proposal: None,
            }
        }

        fn proposing(mut self, setup: TunnelSetup) -> Self {
            self.proposal = Some(setup);
            self
        }
    }

    impl Component for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn tunnel_request(
            &self,
            port: u32,
            peer: Option<&ComponentHandle>,
            peer_port: u32,
            setup: &mut TunnelSetup,
        ) -> Result<()> {
            self.log.lock().unwrap().push(Call {
                component: self.name,
                port,
                peer: peer.map(|p| p.name().to_string()),
                peer_port,
                seen: *setup,
            });
            let mut calls = self.calls.lock().unwrap();
            let result = self.script[(*calls).min(self.script.len() - 1)];
            *calls += 1;
            if result.is_ok() && peer.is_some() {
                if let Some(proposal) = self.proposal {
                    *setup = proposal;
                }
            }
            result
        }

        fn deinit(&self) -> Result<()> {
            Ok(())
        }
    }

    fn calls_of(log: &Log, name: &str) -> Vec<Call> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|c| c.component == name)
            .cloned()
            .collect()
    }

    #[test]
    fn test_connect_requires_a_handle() {
        assert_eq!(connect(None, 0, None, 0), Err(OmxError::BadParameter));
    }

    #[test]
    fn test_connect_output_first() {
        let log = Log::default();
        let proposal = TunnelSetup {
            flags: TunnelFlags::READ_ONLY,
            supplier: BufferSupplier::Output,
        };
        let out = ComponentHandle::new(Scripted::new("out", &log, vec![Ok(())]).proposing(proposal));
        let inp = ComponentHandle::new(Scripted::new("in", &log, vec![Ok(())]));

        let setup = connect(Some(&out), 1, Some(&inp), 0).unwrap();
        assert_eq!(setup, proposal);

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].component, "out");
        assert_eq!(calls[0].port, 1);
        assert_eq!(calls[0].peer.as_deref(), Some("in"));
        assert_eq!(calls[0].peer_port, 0);
        assert_eq!(calls[0].seen, TunnelSetup::new());

        assert_eq!(calls[1].component, "in");
        assert_eq!(calls[1].port, 0);
        assert_eq!(calls[1].peer.as_deref(), Some("out"));
        assert_eq!(calls[1].peer_port, 1);
        assert_eq!(calls[1].seen, proposal);
    }

    #[test]
    fn test_connect_output_failure_skips_input() {
        let log = Log::default();
        let out = ComponentHandle::new(Scripted::new(
            "out",
            &log,
            vec![Err(OmxError::PortsNotCompatible)],
        ));
        let inp = ComponentHandle::new(Scripted::new("in", &log, vec![Ok(())]));

        assert_eq!(
            connect(Some(&out), 1, Some(&inp), 0),
            Err(OmxError::PortsNotCompatible)
        );
        assert_eq!(calls_of(&log, "out").len(), 1);
        assert!(calls_of(&log, "in").is_empty());
    }

    #[test]
    fn test_connect_rolls_back_output_on_input_failure() {
        let log = Log::default();
        let out = ComponentHandle::new(Scripted::new("out", &log, vec![Ok(())]));
        let inp = ComponentHandle::new(Scripted::new(
            "in",
            &log,
            vec![Err(OmxError::BadPortIndex)],
        ));

        assert_eq!(
            connect(Some(&out), 1, Some(&inp), 7),
            Err(OmxError::BadPortIndex)
        );

        let out_calls = calls_of(&log, "out");
        assert_eq!(out_calls.len(), 2);
        assert_eq!(out_calls[0].peer.as_deref(), Some("in"));
        assert_eq!(out_calls[1].port, 1);
        assert_eq!(out_calls[1].peer, None);
        assert_eq!(out_calls[1].peer_port, 0);
        assert_eq!(out_calls[1].seen, TunnelSetup::new());
        assert_eq!(calls_of(&log, "in").len(), 1);
    }

    #[test]
    fn test_connect_failed_rollback_is_undefined() {
        let log = Log::default();
        let out = ComponentHandle::new(Scripted::new(
            "out",
            &log,
            vec![Ok(()), Err(OmxError::Hardware)],
        ));
        let inp = ComponentHandle::new(Scripted::new(
            "in",
            &log,
            vec![Err(OmxError::BadPortIndex)],
        ));

        assert_eq!(
            connect(Some(&out), 1, Some(&inp), 0),
            Err(OmxError::Undefined)
        );
        assert_eq!(calls_of(&log, "out").len(), 2);
    }

    #[test]
    fn test_connect_input_only() {
        let log = Log::default();
        let inp = ComponentHandle::new(Scripted::new(
            "in",
            &log,
            vec![Err(OmxError::TunnelingUnsupported)],
        ));
        assert_eq!(
            connect(None, 0, Some(&inp), 0),
            Err(OmxError::TunnelingUnsupported)
        );

        let log = Log::default();
        let inp = ComponentHandle::new(Scripted::new("in", &log, vec![Ok(())]));
        assert!(connect(None, 3, Some(&inp), 0).is_ok());
        let calls = calls_of(&log, "in");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].peer, None);
        assert_eq!(calls[0].peer_port, 3);
    }

    #[test]
    fn test_connect_output_only() {
        let log = Log::default();
        let out = ComponentHandle::new(Scripted::new("out", &log, vec![Ok(())]));
        assert!(connect(Some(&out), 1, None, 0).is_ok());
        assert_eq!(calls_of(&log, "out").len(), 1);
    }

    #[test]
    fn test_disconnect_requires_both_handles() {
        let log = Log::default();
        let out = ComponentHandle::new(Scripted::new("out", &log, vec![Ok(())]));
        assert_eq!(
            disconnect(Some(&out), 1, None, 0),
            Err(OmxError::BadParameter)
        );
        assert_eq!(
            disconnect(None, 1, Some(&out), 0),
            Err(OmxError::BadParameter)
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disconnect_input_first() {
        let log = Log::default();
        let out = ComponentHandle::new(Scripted::new("out", &log, vec![Ok(())]));
        let inp = ComponentHandle::new(Scripted::new("in", &log, vec![Ok(())]));

        disconnect(Some(&out), 0, Some(&inp), 1).unwrap();

        let calls = log.lock().unwrap().clone();
        let order: Vec<_> = calls.iter().map(|c| (c.component, c.port)).collect();
        assert_eq!(order, [("in", 1), ("out", 0)]);
        assert!(calls.iter().all(|c| c.peer.is_none() && c.peer_port == 0));
    }

    #[test]
    fn test_disconnect_stops_on_input_failure() {
        let log = Log::default();
        let out = ComponentHandle::new(Scripted::new("out", &log, vec![Ok(())]));
        let inp = ComponentHandle::new(Scripted::new("in", &log, vec![Err(OmxError::InvalidState)]));

        assert_eq!(
            disconnect(Some(&out), 0, Some(&inp), 1),
            Err(OmxError::InvalidState)
        );
        assert!(calls_of(&log, "out").is_empty());
    }

    #[test]
    fn test_disconnect_output_failure_leaves_input_released() {
        let log = Log::default();
        let out = ComponentHandle::new(Scripted::new("out", &log, vec![Err(OmxError::Hardware)]));
        let inp = ComponentHandle::new(Scripted::new("in", &log, vec![Ok(())]));

        assert_eq!(
            disconnect(Some(&out), 0, Some(&inp), 1),
            Err(OmxError::Hardware)
        );
        assert_eq!(calls_of(&log, "in").len(), 1);
        assert_eq!(calls_of(&log, "out").len(), 1);
    }

    #[test]
    fn test_tunnel_flags() {
        let flags = TunnelFlags::empty() | TunnelFlags::READ_ONLY;
        assert!(flags.contains(TunnelFlags::READ_ONLY));
        assert!(!TunnelFlags::empty().contains(TunnelFlags::READ_ONLY));
        assert_eq!(TunnelFlags::from_bits(1), TunnelFlags::READ_ONLY);
        assert_eq!(flags.bits(), 1);
    }
}
