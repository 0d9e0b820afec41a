use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("no MIDI output port available")]
    NoPorts,
    #[error("MIDI output port not found: {0}")]
    PortNotFound(String),
    #[error("open output port: {0}")]
    Open(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("output port closed")]
    Closed,
    #[error("discovery: {0}")]
    Discovery(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
