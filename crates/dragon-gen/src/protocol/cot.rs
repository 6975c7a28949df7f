use serde::{Deserialize, Serialize};

use super::TelemMsg;
use crate::{Error, MessageKind, TGResult};

pub const COT_VERSION: &str = "2.0";
/// Machine generated.
pub const HOW_MACHINE_GPS: &str = "m-g";
pub const HAE_DEFAULT: &str = "100";
/// Unknown circular / linear error.
pub const ERROR_UNKNOWN: &str = "9999999";

/// Drone sighting as a Cursor-on-Target style `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "event")]
pub struct DroneEvent {
    #[serde(rename = "@version")]
    pub version: String,
    #[serde(rename = "@uid")]
    pub uid: String,
    #[serde(rename = "@type")]
    pub cot_type: String,
    #[serde(rename = "@time")]
    pub time: String,
    #[serde(rename = "@start")]
    pub start: String,
    #[serde(rename = "@stale")]
    pub stale: String,
    #[serde(rename = "@how")]
    pub how: String,
    pub point: Point,
    pub detail: DroneDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "@lat")]
    pub lat: f64,
    #[serde(rename = "@lon")]
    pub lon: f64,
    #[serde(rename = "@hae")]
    pub hae: String,
    #[serde(rename = "@ce")]
    pub ce: String,
    #[serde(rename = "@le")]
    pub le: String,
}

impl Point {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            hae: HAE_DEFAULT.to_string(),
            ce: ERROR_UNKNOWN.to_string(),
            le: ERROR_UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneDetail {
    #[serde(rename = "BasicID")]
    pub basic_id: BasicId,
    #[serde(rename = "LocationVector")]
    pub location_vector: LocationVector,
    #[serde(rename = "SelfID")]
    pub self_id: SelfId,
    #[serde(rename = "System")]
    pub system: System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicId {
    #[serde(rename = "DeviceID")]
    pub device_id: String,
    #[serde(rename = "Type")]
    pub id_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationVector {
    #[serde(rename = "Speed")]
    pub speed: f64,
    #[serde(rename = "VerticalSpeed")]
    pub vertical_speed: f64,
    #[serde(rename = "Altitude")]
    pub altitude: f64,
    #[serde(rename = "Height")]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfId {
    #[serde(rename = "Description")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    #[serde(rename = "PilotLocation")]
    pub pilot_location: PilotLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotLocation {
    pub lat: f64,
    pub lon: f64,
}

impl TelemMsg for DroneEvent {
    const KIND: MessageKind = MessageKind::Original;

    fn to_payload(&self) -> TGResult<String> {
        quick_xml::se::to_string(self).map_err(|e| Error::Serialize(format!("xml: {e}")))
    }
}

impl DroneEvent {
    pub fn from_payload(payload: &str) -> TGResult<Self> {
        quick_xml::de::from_str(payload).map_err(|e| Error::Serialize(format!("xml: {e}")))
    }
}
