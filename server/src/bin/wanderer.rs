//! Headless load-testing client: connects, then wanders the world by picking
//! a random direction every so often, exercising the full input/snapshot
//! path without a window.

use bincode::{deserialize, serialize};
use clap::Parser;
use rand::Rng;
use shared::{Controls, Packet, PROTOCOL_VERSION};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::UdpSocket;
use tokio::time::interval;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// User id to present at connect
    #[arg(short, long, default_value = "wanderer")]
    user_id: String,

    /// Shared secret for the connect handshake
    #[arg(long, default_value = "let-me-in")]
    secret: String,
}

fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

fn random_controls() -> Controls {
    let mut controls = Controls::default();
    match rand::thread_rng().gen_range(0..4) {
        0 => controls.left = true,
        1 => controls.right = true,
        2 => controls.forward = true,
        _ => controls.backward = true,
    }
    controls
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(&args.server).await?;
    println!("Connecting to {} as {}", args.server, args.user_id);

    let connect = Packet::Connect {
        client_version: PROTOCOL_VERSION,
        user_id: args.user_id.clone(),
        token: args.secret.clone(),
    };
    socket.send(&serialize(&connect)?).await?;

    let mut buffer = [0u8; 65_536];
    let mut controls = random_controls();
    let mut send_interval = interval(Duration::from_millis(16));
    let mut turn_interval = interval(Duration::from_millis(800));

    loop {
        tokio::select! {
            result = socket.recv(&mut buffer) => {
                let len = result?;
                match deserialize::<Packet>(&buffer[0..len]) {
                    Ok(Packet::Connected { session_id }) => {
                        println!("Connected with session {}", session_id);
                    }
                    Ok(Packet::World { config }) => {
                        println!(
                            "World received: {} collidable objects",
                            config.collidable_objects.len()
                        );
                    }
                    Ok(Packet::Snapshot { players }) => {
                        if let Some(me) = players.get(&args.user_id) {
                            log::debug!(
                                "at ({:.1}, {:.1}) among {} players",
                                me.position.x,
                                me.position.z,
                                players.len()
                            );
                        }
                    }
                    Ok(Packet::Disconnected { reason }) => {
                        println!("Disconnected: {}", reason);
                        return Ok(());
                    }
                    Ok(_) => {}
                    Err(e) => println!("Failed to decode packet: {}", e),
                }
            },

            _ = send_interval.tick() => {
                let input = Packet::Input {
                    id: args.user_id.clone(),
                    controls,
                    ts: get_timestamp(),
                };
                socket.send(&serialize(&input)?).await?;
            },

            _ = turn_interval.tick() => {
                controls = random_controls();
            },
        }
    }
}
