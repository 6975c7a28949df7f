/// The message generator: fabricates randomized but internally consistent drone telemetry and
/// ground-station status messages, one per call.
///
/// All coordinate-derived fields in one message come from a single sampled position. The only
/// state carried between calls is the ESP32 message index and the construction instant.
use std::{ops::RangeInclusive, time::Instant};

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use rand::rngs::StdRng;
use tracing::debug;

use crate::{
    coord::{BBoxWGS, Point2d},
    protocol::{
        cot::{self, DroneEvent},
        esp32::{self, Esp32Report},
        status::{self, StatusReport},
        TelemMsg,
    },
    random::{round_to, RandomSource, RngSource},
    Error, GeneratedMessage, MessageKind, TGResult,
};

/// CoT type for a friendly ground unit; one of [`TYPE_SUFFIXES`] is appended.
pub const BASE_TYPE: &str = "a-f-G";
pub const TYPE_SUFFIXES: [&str; 5] = ["-U", "-U-C", "-U-S", "-U-R", "-U-F"];
pub const OPERATOR_SUFFIX: &str = "-O";
pub const STALE_AFTER_MINUTES: i64 = 5;
/// Second precision, UTC.
pub const COT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Max pilot offset from the drone in each axis, degrees.
pub const PILOT_JITTER_DEG: f64 = 0.001;

pub const SPEED_MPS: (f64, f64) = (0.0, 30.0);
pub const VERT_SPEED_MPS: (f64, f64) = (-5.0, 5.0);
pub const ALTITUDE_M: (f64, f64) = (50.0, 400.0);
pub const HEIGHT_AGL_M: (f64, f64) = (20.0, 200.0);

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub bounds: BBoxWGS,
    /// Numeric part of `DRONE<n>` identifiers.
    pub drone_ids: RangeInclusive<u32>,
    /// Chance an ESP32 report carries no GPS fix.
    pub no_fix_probability: f64,
    /// Chance the CoT type gets the operator modifier.
    pub operator_probability: f64,
}

impl GeneratorConfig {
    /// A handful of recurring drones, so consumers see tracks update.
    pub const FIXED_IDS: RangeInclusive<u32> = 100..=103;
    pub const WIDE_IDS: RangeInclusive<u32> = 100..=999;

    pub fn validate(&self) -> TGResult<()> {
        if self.drone_ids.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "empty drone id range {:?}",
                self.drone_ids
            )));
        }
        for (name, p) in [
            ("no_fix_probability", self.no_fix_probability),
            ("operator_probability", self.operator_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::InvalidConfig(format!("{name} {p} not in [0, 1]")));
            }
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bounds: BBoxWGS::continental_us(),
            drone_ids: Self::FIXED_IDS,
            no_fix_probability: 0.1,
            operator_probability: 0.5,
        }
    }
}

pub struct MessageGenerator<S = RngSource<StdRng>> {
    config: GeneratorConfig,
    source: S,
    message_index: u64,
    start_time: Instant,
}

impl MessageGenerator {
    pub fn new(config: GeneratorConfig) -> TGResult<Self> {
        Self::with_source(config, RngSource::from_entropy())
    }
}

impl<S: RandomSource> MessageGenerator<S> {
    pub fn with_source(config: GeneratorConfig, source: S) -> TGResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            message_index: 0,
            start_time: Instant::now(),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Index the next ESP32 report will carry.
    pub fn message_index(&self) -> u64 {
        self.message_index
    }

    /// Whole seconds since construction.
    pub fn runtime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn generate(&mut self, kind: MessageKind) -> TGResult<GeneratedMessage> {
        match kind {
            MessageKind::Original => self.generate_original(),
            MessageKind::Esp32 => self.generate_esp32(),
            MessageKind::Status => self.generate_status(),
        }
    }

    pub fn generate_original(&mut self) -> TGResult<GeneratedMessage> {
        let event = self.original_event();
        render(&event)
    }

    pub fn generate_esp32(&mut self) -> TGResult<GeneratedMessage> {
        let report = self.esp32_report();
        render(&report)
    }

    pub fn generate_status(&mut self) -> TGResult<GeneratedMessage> {
        let report = self.status_report();
        render(&report)
    }

    /// Build an Original format event without rendering it.
    pub fn original_event(&mut self) -> DroneEvent {
        let (time, stale) = cot_timestamps(Utc::now());
        let drone_id = self.drone_id();
        let cot_type = self.cot_type();
        let Point2d(lat, lon) = self.sample_position(4);
        let location_vector = cot::LocationVector {
            speed: self.sample(SPEED_MPS),
            vertical_speed: self.sample(VERT_SPEED_MPS),
            altitude: self.sample(ALTITUDE_M),
            height: self.sample(HEIGHT_AGL_M),
        };
        let pilot_location = cot::PilotLocation {
            lat: lat + self.jitter(),
            lon: lon + self.jitter(),
        };
        debug!("original: {drone_id} {cot_type} at ({lat}, {lon})");

        DroneEvent {
            version: cot::COT_VERSION.to_string(),
            uid: format!("drone-{drone_id}"),
            cot_type,
            start: time.clone(),
            time,
            stale,
            how: cot::HOW_MACHINE_GPS.to_string(),
            point: cot::Point::at(lat, lon),
            detail: cot::DroneDetail {
                basic_id: cot::BasicId {
                    device_id: drone_id.clone(),
                    id_type: "Serial Number".to_string(),
                },
                location_vector,
                self_id: cot::SelfId {
                    description: format!("Test Drone {drone_id}"),
                },
                system: cot::System { pilot_location },
            },
        }
    }

    /// Build an ESP32 report without rendering it. Consumes one message index.
    pub fn esp32_report(&mut self) -> Esp32Report {
        let runtime = self.runtime_secs();
        let drone_id = self.drone_id();
        let id_type = self.source.pick(&esp32::ID_TYPES).to_string();

        let (location, system) = if self.source.chance(self.config.no_fix_probability) {
            // no fix: every position-derived field reads zero
            (
                esp32::LocationVector::no_fix(),
                esp32::SystemMessage {
                    latitude: 0.0,
                    longitude: 0.0,
                },
            )
        } else {
            let Point2d(lat, lon) = self.sample_position(6);
            let location = esp32::LocationVector {
                latitude: lat,
                longitude: lon,
                speed: self.sample(SPEED_MPS),
                vert_speed: self.sample(VERT_SPEED_MPS),
                geodetic_altitude: self.sample(ALTITUDE_M),
                height_agl: self.sample(HEIGHT_AGL_M),
            };
            let system = esp32::SystemMessage {
                latitude: round_to(lat + self.jitter(), 6),
                longitude: round_to(lon + self.jitter(), 6),
            };
            (location, system)
        };

        let index = self.message_index;
        self.message_index += 1;
        debug!(
            "esp32 #{index}: {drone_id} at ({}, {})",
            location.latitude, location.longitude
        );

        Esp32Report {
            index,
            runtime,
            basic_id: esp32::BasicId {
                id: drone_id.clone(),
                id_type,
            },
            location,
            self_id: esp32::SelfId {
                text: format!("UAV {drone_id} operational"),
            },
            system,
        }
    }

    /// Build a ground-station heartbeat without rendering it.
    pub fn status_report(&mut self) -> StatusReport {
        let now = Utc::now();
        let Point2d(latitude, longitude) = self.sample_position(6);
        let gps_data = status::GpsData {
            latitude,
            longitude,
            altitude: self.sample((0.0, 500.0)),
            speed: self.sample((0.0, 2.0)),
        };
        let serial_number = self.serial_number();
        let system_stats = status::SystemStats {
            cpu_usage: self.sample((1.0, 15.0)),
            memory: self.memory_stats(),
            disk: self.disk_stats(),
            temperature: self.sample((35.0, 55.0)),
            uptime: self.runtime_secs() as f64,
        };
        debug!("status: {serial_number} at ({latitude}, {longitude})");

        StatusReport {
            timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
            gps_data,
            serial_number,
            system_stats,
        }
    }

    fn drone_id(&mut self) -> String {
        let n = self
            .source
            .int_inclusive(*self.config.drone_ids.start(), *self.config.drone_ids.end());
        format!("DRONE{n}")
    }

    fn cot_type(&mut self) -> String {
        let mut cot_type = format!("{BASE_TYPE}{}", self.source.pick(&TYPE_SUFFIXES));
        if self.source.chance(self.config.operator_probability) {
            cot_type.push_str(OPERATOR_SUFFIX);
        }
        cot_type
    }

    fn sample_position(&mut self, places: i32) -> Point2d {
        let lat = self.config.bounds.lat_range();
        let lon = self.config.bounds.lon_range();
        Point2d(
            round_to(self.source.uniform(*lat.start(), *lat.end()), places),
            round_to(self.source.uniform(*lon.start(), *lon.end()), places),
        )
    }

    /// Uniform in `range`, one decimal.
    fn sample(&mut self, range: (f64, f64)) -> f64 {
        round_to(self.source.uniform(range.0, range.1), 1)
    }

    fn jitter(&mut self) -> f64 {
        self.source.uniform(-PILOT_JITTER_DEG, PILOT_JITTER_DEG)
    }

    fn serial_number(&mut self) -> String {
        let mut serial = status::SERIAL_PREFIX.to_string();
        for _ in 0..3 {
            serial.push_str(&format!("{:04x}", self.source.int_inclusive(0, 0xffff)));
        }
        serial
    }

    fn memory_stats(&mut self) -> status::MemoryStats {
        let total = status::MEMORY_TOTAL_BYTES;
        let available = self.fraction_of(total, (0.3, 0.8));
        let used = total - available;
        let free = self.fraction_of(available, (0.1, 0.5));
        let buffers = self.fraction_of(available - free, (0.02, 0.1));
        let active = self.fraction_of(used, (0.5, 0.8));
        status::MemoryStats {
            total,
            available,
            percent: status::percent_of(used, total),
            used,
            free,
            active,
            inactive: used - active,
            buffers,
            cached: available - free - buffers,
            shared: self.fraction_of(used, (0.01, 0.05)),
            slab: self.fraction_of(used, (0.02, 0.06)),
        }
    }

    fn disk_stats(&mut self) -> status::DiskStats {
        let total = status::DISK_TOTAL_BYTES;
        let used = self.fraction_of(total, (0.1, 0.9));
        status::DiskStats {
            total,
            used,
            free: total - used,
            percent: status::percent_of(used, total),
        }
    }

    /// Random share of `whole`, never more than `whole`.
    fn fraction_of(&mut self, whole: u64, share: (f64, f64)) -> u64 {
        let part = (whole as f64 * self.source.uniform(share.0, share.1)) as u64;
        part.min(whole)
    }
}

fn render<M: TelemMsg>(msg: &M) -> TGResult<GeneratedMessage> {
    Ok(GeneratedMessage {
        kind: M::KIND,
        payload: msg.to_payload()?,
    })
}

/// (time, stale) strings for a CoT event observed at `now`.
fn cot_timestamps(now: DateTime<Utc>) -> (String, String) {
    let now = now.trunc_subsecs(0);
    let stale = now + TimeDelta::minutes(STALE_AFTER_MINUTES);
    (
        now.format(COT_TIME_FORMAT).to_string(),
        stale.format(COT_TIME_FORMAT).to_string(),
    )
}
