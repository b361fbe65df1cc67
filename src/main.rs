//! x11wire - replay a captured X11 client stream
//!
//! Feeds a file holding the raw bytes a client sent (setup prolog first)
//! through the engine in fixed-size chunks and logs every decoded record.
//! Setup requests are answered with a failure so the outbound path runs
//! too.

use std::env;
use std::fs;
use std::io;
use std::net::IpAddr;
use std::process;

use x11wire::connection::ConnectionId;
use x11wire::protocol::{
    HostFamily, Record, RequestHeader, SetupFailed, SetupRequest, SetupResponse,
};
use x11wire::server::split_frame;
use x11wire::{CodecError, Engine, EngineConfig, Host, Transport, VERSION};

fn print_usage() {
    println!("x11wire v{}", VERSION);
    println!("Replay a captured X11 client byte stream through the decoder");
    println!();
    println!("Usage: x11wire [OPTIONS] <capture-file>");
    println!();
    println!("Options:");
    println!("  -chunk <n>            Bytes per data frame (default: 4096)");
    println!("  -max-records <n>      Records allowed per frame (default: 65536)");
    println!("  -family <4|6>         Address family of the synthetic peer (default: 4)");
    println!("  -h, --help            Show this help message");
    println!();
    println!("Examples:");
    println!("  RUST_LOG=debug x11wire -chunk 7 xterm.bin");
}

#[derive(Debug)]
struct Config {
    chunk: usize,
    engine: EngineConfig,
    family: HostFamily,
    capture: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chunk: 4096,
            engine: EngineConfig::default(),
            family: HostFamily::Internet,
            capture: None,
        }
    }
}

fn parse_args() -> Result<Config, String> {
    let mut config = Config::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-chunk" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -chunk".to_string());
                }
                config.chunk = match args[i].parse() {
                    Ok(0) | Err(_) => return Err("Invalid chunk size".to_string()),
                    Ok(n) => n,
                };
            }
            "-max-records" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -max-records".to_string());
                }
                config.engine.max_records_per_chunk = args[i]
                    .parse()
                    .map_err(|_| "Invalid record count".to_string())?;
            }
            "-family" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for -family".to_string());
                }
                config.family = match args[i].as_str() {
                    "4" => HostFamily::Internet,
                    "6" => HostFamily::InternetV6,
                    _ => return Err(format!("Invalid family: {}", args[i])),
                };
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => {
                if config.capture.is_some() {
                    return Err("Only one capture file may be given".to_string());
                }
                config.capture = Some(path.to_string());
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Host that logs what it is told and remembers who needs a setup answer
#[derive(Default)]
struct ReplayHost {
    pending_setup: Vec<ConnectionId>,
    records: usize,
    generic: usize,
    decode_errors: usize,
}

impl Host for ReplayHost {
    fn on_new_connection(&mut self, id: &ConnectionId, address: IpAddr, port: u16, family: HostFamily) {
        log::info!("New connection {:?} from {}:{} ({:?})", id.to_hex(), address, port, family);
    }

    fn on_setup(&mut self, id: &ConnectionId, setup: &SetupRequest) {
        log::info!(
            "{}: setup {}.{}, auth {:?} ({} bytes)",
            id,
            setup.protocol_major_version,
            setup.protocol_minor_version,
            setup.authorization_protocol_name,
            setup.authorization_protocol_data.len()
        );
        self.pending_setup.push(*id);
    }

    fn on_request(&mut self, id: &ConnectionId, record: Record) {
        self.records += 1;
        if record.request.is_generic() {
            self.generic += 1;
        }
        let name = record
            .header
            .known_opcode()
            .map(|opcode| opcode.name())
            .unwrap_or("Unknown");
        log::info!("{}: #{} {} ({} bytes)", id, record.sequence(), name, record.header.byte_len());
        log::debug!("{:?}", record.request);
    }

    fn on_decode_error(&mut self, id: &ConnectionId, header: &RequestHeader, error: &CodecError) {
        self.decode_errors += 1;
        log::warn!("{}: #{} opcode {}: {}", id, header.sequence, header.opcode, error);
    }

    fn on_connection_closed(&mut self, id: &ConnectionId) {
        log::info!("{}: closed", id);
    }
}

/// Transport that only logs outbound traffic
struct LogTransport;

impl Transport for LogTransport {
    fn send_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        match split_frame(frame) {
            Some((id, payload)) => log::info!("-> {}: {} bytes", id, payload.len()),
            None => log::warn!("-> malformed frame of {} bytes", frame.len()),
        }
        Ok(())
    }

    fn send_text(&mut self, text: &str) -> io::Result<()> {
        log::info!("-> control {:?}", text);
        Ok(())
    }
}

fn replay(config: &Config, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stream = fs::read(path)?;
    let peer: IpAddr = match config.family {
        HostFamily::InternetV6 => "::1".parse()?,
        _ => "127.0.0.1".parse()?,
    };
    let id = ConnectionId::from_peer(peer, 6000);

    let mut engine = Engine::new(ReplayHost::default(), LogTransport, config.engine);
    engine.handle_control(&format!("NEW {}", id.to_hex()))?;

    for chunk in stream.chunks(config.chunk) {
        let mut frame = id.as_bytes().to_vec();
        frame.extend_from_slice(chunk);
        engine.handle_data(&frame)?;

        for pending in std::mem::take(&mut engine.host_mut().pending_setup) {
            let response = SetupResponse::Failed(SetupFailed {
                protocol_major_version: 11,
                protocol_minor_version: 0,
                reason: "replay only".to_string(),
            });
            engine.submit_setup(&pending, &response)?;
        }
    }

    if let Some(connection) = engine.connection(&id) {
        if connection.buffered() > 0 {
            log::warn!("{} trailing bytes do not form a complete record", connection.buffered());
        }
    }
    engine.handle_control(&format!("END {}", id.to_hex()))?;

    let host = engine.host();
    log::info!(
        "{} records, {} generic, {} decode errors",
        host.records,
        host.generic,
        host.decode_errors
    );
    Ok(())
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    let Some(path) = config.capture.clone() else {
        eprintln!("Error: no capture file given");
        eprintln!();
        print_usage();
        process::exit(1);
    };

    log::info!("x11wire v{}", VERSION);
    log::info!("Chunk size: {}", config.chunk);

    if let Err(e) = replay(&config, &path) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
