//! Datagram transport for generated messages.
//!
//! One socket per send session, bound to an ephemeral port. Drone telemetry (Original and ESP32)
//! goes to the telemetry port, heartbeats to the status port.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket},
};

use clap::ValueEnum;
use dragon_gen::{GeneratedMessage, MessageKind};
use tracing::{debug, trace};

use crate::error::CliError;

pub const DEFAULT_MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 1);
pub const DEFAULT_TELEMETRY_PORT: u16 = 6969;
pub const DEFAULT_STATUS_PORT: u16 = 4225;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportMode {
    /// Send to a multicast group
    Multicast,
    /// Send to a subnet broadcast address
    Broadcast,
    /// Send to a single host
    Unicast,
}

impl TransportMode {
    pub fn default_host(self) -> Ipv4Addr {
        match self {
            TransportMode::Multicast => DEFAULT_MULTICAST_GROUP,
            TransportMode::Broadcast => Ipv4Addr::BROADCAST,
            TransportMode::Unicast => Ipv4Addr::LOCALHOST,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    pub mode: TransportMode,
    pub host: Ipv4Addr,
    pub telemetry_port: u16,
    pub status_port: u16,
    /// Multicast hop limit.
    pub ttl: u32,
}

impl TransportConfig {
    pub fn validate(&self) -> Result<(), CliError> {
        if self.mode == TransportMode::Multicast && !self.host.is_multicast() {
            return Err(CliError::InvalidArgument(format!(
                "{} is not a multicast group",
                self.host
            )));
        }
        if self.mode == TransportMode::Multicast && self.ttl == 0 {
            return Err(CliError::InvalidArgument("ttl must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn destination(&self, kind: MessageKind) -> SocketAddr {
        let port = match kind {
            MessageKind::Original | MessageKind::Esp32 => self.telemetry_port,
            MessageKind::Status => self.status_port,
        };
        SocketAddr::V4(SocketAddrV4::new(self.host, port))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Multicast,
            host: DEFAULT_MULTICAST_GROUP,
            telemetry_port: DEFAULT_TELEMETRY_PORT,
            status_port: DEFAULT_STATUS_PORT,
            ttl: 1,
        }
    }
}

pub struct Broadcaster {
    socket: UdpSocket,
    config: TransportConfig,
}

impl Broadcaster {
    pub fn open(config: TransportConfig) -> Result<Self, CliError> {
        config.validate()?;
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        match config.mode {
            TransportMode::Multicast => socket.set_multicast_ttl_v4(config.ttl)?,
            TransportMode::Broadcast => socket.set_broadcast(true)?,
            TransportMode::Unicast => {}
        }
        debug!(
            "opened {:?} socket {} -> {}",
            config.mode,
            socket.local_addr()?,
            config.host
        );
        Ok(Self { socket, config })
    }

    /// Send one message as a single datagram. Returns the destination.
    pub fn send(&self, msg: &GeneratedMessage) -> io::Result<SocketAddr> {
        let dest = self.config.destination(msg.kind);
        let sent = self.socket.send_to(msg.payload.as_bytes(), dest)?;
        trace!("{} bytes of {} to {}", sent, msg.kind, dest);
        Ok(dest)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use dragon_gen::lazy_init_tracing;

    use super::*;

    #[test]
    fn test_destination_ports() {
        let config = TransportConfig::default();
        assert_eq!(
            config.destination(MessageKind::Original),
            "224.0.0.1:6969".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            config.destination(MessageKind::Esp32),
            "224.0.0.1:6969".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            config.destination(MessageKind::Status),
            "224.0.0.1:4225".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_validate() {
        let unicast_group = TransportConfig {
            host: Ipv4Addr::new(192, 168, 1, 20),
            ..Default::default()
        };
        assert!(matches!(
            unicast_group.validate(),
            Err(CliError::InvalidArgument(_))
        ));
        let no_ttl = TransportConfig {
            ttl: 0,
            ..Default::default()
        };
        assert!(no_ttl.validate().is_err());
        let broadcast = TransportConfig {
            mode: TransportMode::Broadcast,
            host: TransportMode::Broadcast.default_host(),
            ..Default::default()
        };
        assert!(broadcast.validate().is_ok());
    }

    #[test]
    fn test_unicast_loopback() {
        lazy_init_tracing();
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
        let msg = GeneratedMessage {
            kind: MessageKind::Status,
            payload: "{\"hello\":1}".to_string(),
        };
        let dest = tx.send(&msg).unwrap();
        assert_eq!(dest.port(), port);

        let mut buf = [0u8; 1500];
        let (n, _) = rx.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], msg.payload.as_bytes());
    }
}
