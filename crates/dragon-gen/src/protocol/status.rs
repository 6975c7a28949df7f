/// Ground-station heartbeat. Memory and disk figures are in bytes.
use serde::{Deserialize, Serialize};

use super::TelemMsg;
use crate::{MessageKind, TGResult};

pub const SERIAL_PREFIX: &str = "wardragon-";
/// 8 GiB
pub const MEMORY_TOTAL_BYTES: u64 = 8 * 1024 * 1024 * 1024;
/// Nominal 256 GB drive.
pub const DISK_TOTAL_BYTES: u64 = 256_060_514_304;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Unix epoch seconds.
    pub timestamp: f64,
    pub gps_data: GpsData,
    pub serial_number: String,
    pub system_stats: SystemStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsData {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres HAE.
    pub altitude: f64,
    /// m/s
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    /// Percent.
    pub cpu_usage: f64,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Seconds.
    pub uptime: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: u64,
    pub available: u64,
    pub percent: f64,
    pub used: u64,
    pub free: u64,
    pub active: u64,
    pub inactive: u64,
    pub buffers: u64,
    pub cached: u64,
    pub shared: u64,
    pub slab: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

/// `part` as a percentage of `whole`, one decimal.
pub(crate) fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    crate::random::round_to(part as f64 * 100.0 / whole as f64, 1)
}

impl MemoryStats {
    pub fn is_consistent(&self) -> bool {
        self.available <= self.total
            && self.used + self.available == self.total
            && self.free + self.buffers + self.cached == self.available
            && self.active + self.inactive == self.used
            && self.shared <= self.used
            && self.slab <= self.used
    }
}

impl DiskStats {
    pub fn is_consistent(&self) -> bool {
        self.used + self.free == self.total
    }
}

impl TelemMsg for StatusReport {
    const KIND: MessageKind = MessageKind::Status;

    fn to_payload(&self) -> TGResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
