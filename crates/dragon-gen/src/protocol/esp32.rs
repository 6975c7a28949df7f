use serde::{Deserialize, Serialize};

use super::TelemMsg;
use crate::{MessageKind, TGResult};

/// Remote-ID "ID type" strings reported by the receiver.
pub const ID_TYPES: [&str; 4] = [
    "Serial Number (ANSI/CTA-2063-A)",
    "CAA Registration ID",
    "UTM (USS) Assigned ID",
    "Operator ID",
];

/// Structured report from an ESP32 remote-ID receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Esp32Report {
    pub index: u64,
    /// Whole seconds since the receiver started.
    pub runtime: u64,
    #[serde(rename = "Basic ID")]
    pub basic_id: BasicId,
    #[serde(rename = "Location/Vector Message")]
    pub location: LocationVector,
    #[serde(rename = "Self-ID Message")]
    pub self_id: SelfId,
    #[serde(rename = "System Message")]
    pub system: SystemMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicId {
    pub id: String,
    pub id_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationVector {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub vert_speed: f64,
    pub geodetic_altitude: f64,
    pub height_agl: f64,
}

impl LocationVector {
    /// Receiver output when the drone reports no GPS fix.
    pub fn no_fix() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            speed: 0.0,
            vert_speed: 0.0,
            geodetic_altitude: 0.0,
            height_agl: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfId {
    pub text: String,
}

/// Operator (pilot) location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub latitude: f64,
    pub longitude: f64,
}

impl TelemMsg for Esp32Report {
    const KIND: MessageKind = MessageKind::Esp32;

    fn to_payload(&self) -> TGResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
