//! dragon-broadcast - send synthetic drone telemetry over UDP
//!
//! Feeds a telemetry consumer with generated Original (CoT XML), ESP32 (JSON) and Status
//! messages without any real hardware. Runs an interactive menu by default, or a single send
//! session when `--kind` is given.

use std::{
    io::{self, Write},
    net::Ipv4Addr,
    process,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use clap::{Parser, ValueEnum};
use dragon_gen::{
    random::{RandomSource, RngSource},
    GeneratorConfig, MessageGenerator,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod error;
mod menu;
mod sender;
mod transport;

use error::CliError;
use menu::MenuChoice;
use sender::{Selection, Session};
use transport::{
    Broadcaster, TransportConfig, TransportMode, DEFAULT_STATUS_PORT, DEFAULT_TELEMETRY_PORT,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DroneIds {
    /// Four recurring drones, DRONE100-DRONE103
    Fixed,
    /// Any of DRONE100-DRONE999
    Wide,
}

#[derive(Parser, Debug)]
#[command(name = "dragon-broadcast")]
#[command(about = "Broadcast synthetic drone telemetry test data", long_about = None)]
struct Args {
    /// Delivery mode
    #[arg(long, value_enum, default_value = "multicast")]
    mode: TransportMode,

    /// Destination address (defaults: 224.0.0.1 multicast, 255.255.255.255 broadcast,
    /// 127.0.0.1 unicast)
    #[arg(long)]
    host: Option<Ipv4Addr>,

    /// Port for Original and ESP32 telemetry
    #[arg(long, default_value_t = DEFAULT_TELEMETRY_PORT)]
    port: u16,

    /// Port for status heartbeats
    #[arg(long, default_value_t = DEFAULT_STATUS_PORT)]
    status_port: u16,

    /// Multicast time-to-live (hops)
    #[arg(long, default_value_t = 1)]
    ttl: u32,

    /// Drone identifier policy
    #[arg(long, value_enum, default_value = "fixed")]
    drone_ids: DroneIds,

    /// Seed the random source for a reproducible message sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Send this kind of message without the interactive menu
    #[arg(long, value_enum)]
    kind: Option<Selection>,

    /// Seconds between sends when using --kind
    #[arg(long, default_value_t = 1.0)]
    interval: f64,

    /// Stop after this many ticks when using --kind
    #[arg(long)]
    count: Option<u64>,
}

impl Args {
    fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            mode: self.mode,
            host: self.host.unwrap_or_else(|| self.mode.default_host()),
            telemetry_port: self.port,
            status_port: self.status_port,
            ttl: self.ttl,
        }
    }

    fn generator_config(&self) -> GeneratorConfig {
        let drone_ids = match self.drone_ids {
            DroneIds::Fixed => GeneratorConfig::FIXED_IDS,
            DroneIds::Wide => GeneratorConfig::WIDE_IDS,
        };
        GeneratorConfig {
            drone_ids,
            ..Default::default()
        }
    }
}

/// Ctrl+C routing: stops a running session, or exits when idle at the menu.
#[derive(Default)]
struct Interrupt {
    sending: AtomicBool,
    stop: AtomicBool,
}

impl Interrupt {
    fn install() -> Result<Arc<Self>, CliError> {
        let interrupt = Arc::new(Self::default());
        let handler = Arc::clone(&interrupt);
        ctrlc::set_handler(move || {
            if handler.sending.load(Ordering::SeqCst) {
                handler.stop.store(true, Ordering::SeqCst);
            } else {
                println!("\nProgram terminated by user");
                process::exit(130);
            }
        })?;
        Ok(interrupt)
    }

    fn begin_session(&self) {
        self.stop.store(false, Ordering::SeqCst);
        self.sending.store(true, Ordering::SeqCst);
    }

    fn end_session(&self) {
        self.sending.store(false, Ordering::SeqCst);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();
    debug!("args: {args:?}");

    let source = match args.seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_entropy(),
    };
    if let Err(e) = run(&args, source) {
        e.exit();
    }
}

fn run<S: RandomSource>(args: &Args, source: S) -> Result<(), CliError> {
    let transport = args.transport_config();
    transport.validate()?;
    let mut generator = MessageGenerator::with_source(args.generator_config(), source)?;
    let interrupt = Interrupt::install()?;

    match args.kind {
        Some(selection) => {
            let interval = menu::parse_interval(&args.interval.to_string())
                .map_err(|msg| CliError::InvalidArgument(format!("--interval: {msg}")))?;
            send_session(&mut generator, &transport, selection, interval, args.count, &interrupt)
        }
        None => interactive(&mut generator, &transport, &interrupt),
    }
}

fn interactive<S: RandomSource>(
    generator: &mut MessageGenerator<S>,
    transport: &TransportConfig,
    interrupt: &Interrupt,
) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let summary = format!(
        "{:?} to {} (telemetry port {}, status port {})",
        transport.mode, transport.host, transport.telemetry_port, transport.status_port
    );

    loop {
        menu::print_menu(&mut out, &summary)?;
        let Some(choice) = menu::prompt_choice(&mut input, &mut out)? else {
            break;
        };
        let selection = match choice {
            MenuChoice::Exit => break,
            MenuChoice::Send(selection) => selection,
        };
        let Some(interval) = menu::prompt_interval(&mut input, &mut out)? else {
            break;
        };
        // socket errors end the session, not the menu
        if let Err(e) = send_session(generator, transport, selection, interval, None, interrupt) {
            writeln!(out, "Broadcast failed: {e}")?;
        }
    }
    writeln!(out, "\nGoodbye!")?;
    Ok(())
}

fn send_session<S: RandomSource>(
    generator: &mut MessageGenerator<S>,
    transport: &TransportConfig,
    selection: Selection,
    interval: Duration,
    max_ticks: Option<u64>,
    interrupt: &Interrupt,
) -> Result<(), CliError> {
    let broadcaster = Broadcaster::open(transport.clone())?;
    let mut out = io::stdout();
    writeln!(
        out,
        "\nBroadcasting {:?} messages every {:.1} seconds",
        selection,
        interval.as_secs_f64()
    )?;
    writeln!(out, "Press Ctrl+C to stop\n")?;

    interrupt.begin_session();
    let result = Session {
        generator,
        transport: &broadcaster,
        selection,
        interval,
        max_ticks,
    }
    .run(&interrupt.stop, &mut out);
    interrupt.end_session();

    let stats = result?;
    info!(
        "sent {} messages over {} ticks ({} failed)",
        stats.sent, stats.ticks, stats.failed
    );
    writeln!(out, "\nBroadcast stopped")?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["dragon-broadcast"]);
        let transport = args.transport_config();
        assert_eq!(transport, TransportConfig::default());
        assert_eq!(args.generator_config(), GeneratorConfig::default());
        assert!(args.kind.is_none());
    }

    #[test]
    fn test_args_broadcast_mode() {
        let args = Args::parse_from([
            "dragon-broadcast",
            "--mode",
            "broadcast",
            "--port",
            "4224",
            "--drone-ids",
            "wide",
            "--kind",
            "all",
            "--count",
            "3",
        ]);
        let transport = args.transport_config();
        assert_eq!(transport.mode, TransportMode::Broadcast);
        assert_eq!(transport.host, Ipv4Addr::BROADCAST);
        assert_eq!(transport.telemetry_port, 4224);
        assert_eq!(args.generator_config().drone_ids, GeneratorConfig::WIDE_IDS);
        assert_eq!(args.kind, Some(Selection::All));
        assert_eq!(args.count, Some(3));
    }

    #[test]
    fn test_interval_bounds_match_prompt() {
        assert!(menu::parse_interval(&sender::MIN_INTERVAL_SECS.to_string()).is_ok());
        assert!(menu::parse_interval(&sender::MAX_INTERVAL_SECS.to_string()).is_ok());
    }
}
