//! Port descriptions for components.
//!
//! Ports are the tunnel endpoints of a component. Built-in components
//! declare their ports as static [`PortTemplate`]s; the runtime view
//! returned to peers is a [`PortDefinition`].

use crate::tunnel::BufferSupplier;

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// Receives buffers from upstream.
    Input,
    /// Sends buffers downstream.
    Output,
}

impl PortDirection {
    /// The direction a tunnel peer must have.
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// Audio coding carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioEncoding {
    /// Linear PCM.
    Pcm,
    /// AAC bitstream.
    Aac,
    /// MPEG-1/2 layer 3 bitstream.
    Mp3,
    /// Ogg Vorbis bitstream.
    Vorbis,
}

/// Static description of one port of a component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortTemplate {
    /// Port direction.
    pub direction: PortDirection,
    /// Coding of the data on this port.
    pub encoding: AudioEncoding,
    /// Minimum number of buffers the port needs.
    pub buffer_count_min: u32,
    /// Size of each buffer in bytes.
    pub buffer_size: u32,
    /// Which side this port wants to supply buffers when tunneled.
    pub preferred_supplier: BufferSupplier,
    /// Whether the port's buffers must not be modified by the peer.
    pub read_only: bool,
}

impl PortTemplate {
    /// An input port that prefers to supply its own buffers.
    pub const fn input(encoding: AudioEncoding, buffer_count_min: u32, buffer_size: u32) -> Self {
        Self {
            direction: PortDirection::Input,
            encoding,
            buffer_count_min,
            buffer_size,
            preferred_supplier: BufferSupplier::Input,
            read_only: false,
        }
    }

    /// An output port that prefers to supply its own buffers.
    pub const fn output(encoding: AudioEncoding, buffer_count_min: u32, buffer_size: u32) -> Self {
        Self {
            direction: PortDirection::Output,
            encoding,
            buffer_count_min,
            buffer_size,
            preferred_supplier: BufferSupplier::Output,
            read_only: false,
        }
    }

    /// Mark the port's buffers read-only for the peer.
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Runtime definition of this template at `index`.
    pub fn definition(&self, index: u32) -> PortDefinition {
        PortDefinition {
            index,
            direction: self.direction,
            encoding: self.encoding,
            buffer_count_min: self.buffer_count_min,
            buffer_size: self.buffer_size,
            enabled: true,
        }
    }
}

/// Runtime view of a port, as queried by a tunnel peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDefinition {
    /// Port index within its component.
    pub index: u32,
    /// Port direction.
    pub direction: PortDirection,
    /// Coding of the data on this port.
    pub encoding: AudioEncoding,
    /// Minimum number of buffers.
    pub buffer_count_min: u32,
    /// Size of each buffer in bytes.
    pub buffer_size: u32,
    /// Whether the port is enabled.
    pub enabled: bool,
}

impl PortDefinition {
    /// Check if this is an input port.
    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    /// Check if this is an output port.
    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }

    /// Whether this port can be tunneled to `peer`: opposite directions,
    /// same coding.
    pub fn accepts(&self, peer: &PortDefinition) -> bool {
        peer.direction == self.direction.opposite() && peer.encoding == self.encoding
    }
}
