/// Synthetic drone telemetry generation library.
///
/// The [`MessageGenerator`] fabricates one message per call in one of three wire formats (see
/// [`MessageKind`]). *Protocols* model each format and render it at the boundary by implementing
/// [`protocol::TelemMsg`]. Randomness comes from an injectable [`random::RandomSource`], so tests
/// can force every branch.
use std::{fmt, sync::Once};

use thiserror::Error;

pub mod coord;
pub mod generator;
pub mod protocol;
pub mod random;

pub use generator::{GeneratorConfig, MessageGenerator};

/// Result type for this library
pub type TGResult<T> = std::result::Result<T, Error>;

/// Error type for this library
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid coordinate: {0}")]
    InvalidCoord(String),
    #[error("Invalid generator config: {0}")]
    InvalidConfig(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(format!("json: {err}"))
    }
}

/// The three message formats the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Cursor-on-Target style XML `event`.
    Original,
    /// Remote-ID receiver JSON report.
    Esp32,
    /// Ground-station heartbeat.
    Status,
}

impl MessageKind {
    pub const ALL: [MessageKind; 3] = [
        MessageKind::Original,
        MessageKind::Esp32,
        MessageKind::Status,
    ];
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Original => "Original",
            MessageKind::Esp32 => "ESP32",
            MessageKind::Status => "Status",
        };
        f.write_str(name)
    }
}

/// One rendered message. Not retained by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMessage {
    pub kind: MessageKind,
    pub payload: String,
}

impl GeneratedMessage {
    pub fn into_bytes(self) -> Vec<u8> {
        self.payload.into_bytes()
    }
}

/// Test binary helper to init tracing. This is usually the responsibility of the consumer of the
/// library crate.
pub fn lazy_init_tracing() {
    {
        static INIT: Once = Once::new();
        &INIT
    }
    .call_once(|| {
        tracing_subscriber::fmt::init();
    });
}
