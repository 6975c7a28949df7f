//! Periodic send loop.

use std::{
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use chrono::Utc;
use clap::ValueEnum;
use dragon_gen::{random::RandomSource, MessageGenerator, MessageKind};
use tracing::{debug, warn};

use crate::{error::CliError, transport::Broadcaster};

/// Longest stretch the loop sleeps without checking for a stop request.
const STOP_POLL: Duration = Duration::from_millis(50);

pub const MIN_INTERVAL_SECS: f64 = 0.1;
pub const MAX_INTERVAL_SECS: f64 = 60.0;

/// Which message kinds each tick produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Selection {
    Original,
    Esp32,
    Status,
    All,
}

impl Selection {
    pub fn kinds(self) -> &'static [MessageKind] {
        match self {
            Selection::Original => &[MessageKind::Original],
            Selection::Esp32 => &[MessageKind::Esp32],
            Selection::Status => &[MessageKind::Status],
            Selection::All => &MessageKind::ALL,
        }
    }
}

/// Counters for one send session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u64,
    pub sent: u64,
    pub failed: u64,
}

pub struct Session<'a, S> {
    pub generator: &'a mut MessageGenerator<S>,
    pub transport: &'a Broadcaster,
    pub selection: Selection,
    pub interval: Duration,
    /// Stop after this many ticks. Runs until stopped when `None`.
    pub max_ticks: Option<u64>,
}

impl<S: RandomSource> Session<'_, S> {
    /// Generate and send every `interval` until `stop` is raised or `max_ticks` is reached.
    /// Send failures are reported and the loop keeps going.
    pub fn run<W: Write>(&mut self, stop: &AtomicBool, out: &mut W) -> Result<SessionStats, CliError> {
        let mut stats = SessionStats::default();
        while !stop.load(Ordering::SeqCst) {
            for &kind in self.selection.kinds() {
                let msg = self.generator.generate(kind)?;
                match self.transport.send(&msg) {
                    Ok(dest) => {
                        stats.sent += 1;
                        writeln!(
                            out,
                            "Sent {} format message to {} at {}",
                            kind,
                            dest,
                            Utc::now().format("%H:%M:%S")
                        )?;
                        if kind != MessageKind::Original {
                            writeln!(out, "{}\n", msg.payload)?;
                        }
                    }
                    Err(e) => {
                        stats.failed += 1;
                        warn!("send of {kind} message failed: {e}");
                        writeln!(out, "Failed to send {kind} message: {e}")?;
                    }
                }
            }
            stats.ticks += 1;
            if self.max_ticks.is_some_and(|max| stats.ticks >= max) {
                break;
            }
            if !sleep_unless_stopped(self.interval, stop) {
                break;
            }
        }
        debug!("session finished: {stats:?}");
        Ok(stats)
    }
}

/// Sleep for `interval` in short slices. False if `stop` was raised meanwhile.
fn sleep_unless_stopped(interval: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(STOP_POLL));
    }
}

#[cfg(test)]
mod test {
    use std::net::{Ipv4Addr, UdpSocket};

    use dragon_gen::{lazy_init_tracing, GeneratorConfig};
    use serde_json::Value;

    use super::*;
    use crate::transport::{TransportConfig, TransportMode};

    fn loopback() -> (UdpSocket, Broadcaster) {
        let rx = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let port = rx.local_addr().unwrap().port();
        let tx = Broadcaster::open(TransportConfig {
            mode: TransportMode::Unicast,
            host: Ipv4Addr::LOCALHOST,
            telemetry_port: port,
            status_port: port,
            ttl: 1,
        })
        .unwrap();
        (rx, tx)
    }

    fn recv_string(rx: &UdpSocket) -> String {
        let mut buf = [0u8; 8192];
        let (n, _) = rx.recv_from(&mut buf).unwrap();
        String::from_utf8(buf[..n].to_vec()).unwrap()
    }

    #[test]
    fn test_selection_kinds() {
        assert_eq!(Selection::Esp32.kinds(), [MessageKind::Esp32]);
        assert_eq!(
            Selection::All.kinds(),
            [MessageKind::Original, MessageKind::Esp32, MessageKind::Status]
        );
    }

    #[test]
    fn test_session_sends_all_kinds() {
        lazy_init_tracing();
        let (rx, tx) = loopback();
        let mut generator = MessageGenerator::new(GeneratorConfig::default()).unwrap();
        let stop = AtomicBool::new(false);
        let mut out = Vec::new();
        let stats = Session {
            generator: &mut generator,
            transport: &tx,
            selection: Selection::All,
            interval: Duration::from_millis(100),
            max_ticks: Some(2),
        }
        .run(&stop, &mut out)
        .unwrap();
        assert_eq!(
            stats,
            SessionStats {
                ticks: 2,
                sent: 6,
                failed: 0
            }
        );

        for tick in 0..2u64 {
            let original = recv_string(&rx);
            assert!(original.starts_with("<event "), "{original}");
            let esp32: Value = serde_json::from_str(&recv_string(&rx)).unwrap();
            assert_eq!(esp32["index"], tick);
            let status: Value = serde_json::from_str(&recv_string(&rx)).unwrap();
            assert!(status["serial_number"].is_string());
        }

        let console = String::from_utf8(out).unwrap();
        assert_eq!(console.matches("Sent Original format message").count(), 2);
        assert_eq!(console.matches("Sent ESP32 format message").count(), 2);
        assert_eq!(console.matches("Sent Status format message").count(), 2);
    }

    #[test]
    fn test_session_stops_when_raised() {
        lazy_init_tracing();
        let (_rx, tx) = loopback();
        let mut generator = MessageGenerator::new(GeneratorConfig::default()).unwrap();
        let stop = AtomicBool::new(true);
        let stats = Session {
            generator: &mut generator,
            transport: &tx,
            selection: Selection::Esp32,
            interval: Duration::from_secs(60),
            max_ticks: None,
        }
        .run(&stop, &mut std::io::sink())
        .unwrap();
        assert_eq!(stats, SessionStats::default());
        assert_eq!(generator.message_index(), 0);
    }

    #[test]
    fn test_sleep_interrupted() {
        let stop = AtomicBool::new(false);
        assert!(sleep_unless_stopped(Duration::from_millis(10), &stop));
        stop.store(true, Ordering::SeqCst);
        let started = Instant::now();
        assert!(!sleep_unless_stopped(Duration::from_secs(60), &stop));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
