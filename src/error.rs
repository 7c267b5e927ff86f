//! Error types for the OMX core.
//!
//! [`OmxError`] mirrors the OMX-IL error codes. Collaborators (factories,
//! components) report failures with the same type, so the core forwards
//! their errors verbatim instead of translating them.

use thiserror::Error;

/// Result type alias using [`OmxError`].
pub type Result<T> = std::result::Result<T, OmxError>;

/// Coarse classification of an [`OmxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required parameter was missing, empty or out of range.
    InvalidArgument,
    /// The operation needs a lifecycle step that has not happened yet.
    InvalidState,
    /// The requested component or port does not exist.
    NotFound,
    /// A session, pool or slot could not be allocated.
    ResourceExhausted,
    /// State is inconsistent; the caller must recover manually.
    Undefined,
    /// A collaborator error outside the core taxonomy.
    Other,
}

/// OMX-IL error codes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OmxError {
    /// `OMX_ErrorInsufficientResources`.
    #[error("insufficient resources")]
    InsufficientResources,

    /// `OMX_ErrorUndefined`.
    #[error("undefined error")]
    Undefined,

    /// `OMX_ErrorInvalidComponentName`.
    #[error("invalid component name")]
    InvalidComponentName,

    /// `OMX_ErrorComponentNotFound`.
    #[error("component not found")]
    ComponentNotFound,

    /// `OMX_ErrorInvalidComponent`.
    #[error("invalid component")]
    InvalidComponent,

    /// `OMX_ErrorBadParameter`.
    #[error("bad parameter")]
    BadParameter,

    /// `OMX_ErrorNotImplemented`.
    #[error("not implemented")]
    NotImplemented,

    /// `OMX_ErrorHardware`.
    #[error("hardware error")]
    Hardware,

    /// `OMX_ErrorInvalidState`.
    #[error("invalid state")]
    InvalidState,

    /// `OMX_ErrorPortsNotCompatible`.
    #[error("ports not compatible")]
    PortsNotCompatible,

    /// `OMX_ErrorNoMore`.
    #[error("no more items")]
    NoMore,

    /// `OMX_ErrorTimeout`.
    #[error("timeout")]
    Timeout,

    /// `OMX_ErrorIncorrectStateOperation`.
    #[error("operation not allowed in current state")]
    IncorrectStateOperation,

    /// `OMX_ErrorUnsupportedSetting`.
    #[error("unsupported setting")]
    UnsupportedSetting,

    /// `OMX_ErrorBadPortIndex`.
    #[error("bad port index")]
    BadPortIndex,

    /// `OMX_ErrorTunnelingUnsupported`.
    #[error("tunneling unsupported")]
    TunnelingUnsupported,

    /// Any other OMX-IL or vendor error code.
    #[error("error code {0:#010x}")]
    Other(u32),
}

impl OmxError {
    /// Numeric OMX-IL value of this error.
    pub fn code(&self) -> u32 {
        match self {
            Self::InsufficientResources => 0x8000_1000,
            Self::Undefined => 0x8000_1001,
            Self::InvalidComponentName => 0x8000_1002,
            Self::ComponentNotFound => 0x8000_1003,
            Self::InvalidComponent => 0x8000_1004,
            Self::BadParameter => 0x8000_1005,
            Self::NotImplemented => 0x8000_1006,
            Self::Hardware => 0x8000_1009,
            Self::InvalidState => 0x8000_100A,
            Self::PortsNotCompatible => 0x8000_100C,
            Self::NoMore => 0x8000_100E,
            Self::Timeout => 0x8000_1011,
            Self::IncorrectStateOperation => 0x8000_1018,
            Self::UnsupportedSetting => 0x8000_1019,
            Self::BadPortIndex => 0x8000_101B,
            Self::TunnelingUnsupported => 0x8000_1026,
            Self::Other(code) => *code,
        }
    }

    /// Map a raw OMX-IL code back to an error.
    ///
    /// Returns `None` for `OMX_ErrorNone` (zero).
    pub fn from_code(code: u32) -> Option<Self> {
        let err = match code {
            0 => return None,
            0x8000_1000 => Self::InsufficientResources,
            0x8000_1001 => Self::Undefined,
            0x8000_1002 => Self::InvalidComponentName,
            0x8000_1003 => Self::ComponentNotFound,
            0x8000_1004 => Self::InvalidComponent,
            0x8000_1005 => Self::BadParameter,
            0x8000_1006 => Self::NotImplemented,
            0x8000_1009 => Self::Hardware,
            0x8000_100A => Self::InvalidState,
            0x8000_100C => Self::PortsNotCompatible,
            0x8000_100E => Self::NoMore,
            0x8000_1011 => Self::Timeout,
            0x8000_1018 => Self::IncorrectStateOperation,
            0x8000_1019 => Self::UnsupportedSetting,
            0x8000_101B => Self::BadPortIndex,
            0x8000_1026 => Self::TunnelingUnsupported,
            other => Self::Other(other),
        };
        Some(err)
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadParameter | Self::BadPortIndex | Self::UnsupportedSetting => {
                ErrorKind::InvalidArgument
            }
            Self::InvalidState | Self::IncorrectStateOperation => ErrorKind::InvalidState,
            Self::InvalidComponentName | Self::ComponentNotFound | Self::NoMore => {
                ErrorKind::NotFound
            }
            Self::InsufficientResources => ErrorKind::ResourceExhausted,
            Self::Undefined => ErrorKind::Undefined,
            _ => ErrorKind::Other,
        }
    }
}
