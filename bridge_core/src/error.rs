use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("mapping conflict: cc1={primary}, cc11={secondary}, cc_opt={auxiliary}")]
    MappingConflict {
        primary: u8,
        secondary: u8,
        auxiliary: u8,
    },
    #[error("cannot open output device: {0}")]
    DeviceOpen(String),
    #[error("output send failed: {0}")]
    DeviceSend(String),
    #[error("cannot bind UDP port {port}: {reason}")]
    NetworkBind { port: u16, reason: String },
    #[error("malformed datagram field {index} ({text:?}): {reason}")]
    MalformedDatagram {
        index: usize,
        text: String,
        reason: String,
    },
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
