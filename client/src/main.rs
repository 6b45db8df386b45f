use clap::Parser;
use client::game::ClientWorld;
use client::input::InputManager;
use client::network::NetworkClient;
use client::rendering::Renderer;
use log::{error, info};
use macroquad::prelude::*;
use shared::Packet;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// User id to present at connect
    #[arg(short, long, default_value = "player1")]
    user_id: String,

    /// Shared secret for the connect handshake
    #[arg(long, default_value = "let-me-in")]
    secret: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "meadow".to_owned(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client, connecting to {}", args.server);
    info!("Controls: WASD / arrows to move, Esc to quit");

    let mut network = match NetworkClient::connect(&args.server, &args.user_id, &args.secret) {
        Ok(network) => network,
        Err(e) => {
            error!("Failed to open socket: {}", e);
            return;
        }
    };

    let mut input_manager = InputManager::new();
    let renderer = Renderer::new();
    // populated once the server has sent the world config
    let mut world: Option<ClientWorld> = None;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            network.send_disconnect();
            break;
        }

        let dt = get_frame_time();

        for packet in network.poll() {
            match packet {
                Packet::World { config } => {
                    info!(
                        "World received: {} collidable, {} decorative objects",
                        config.collidable_objects.len(),
                        config.noncollidable_objects.len()
                    );
                    world = Some(ClientWorld::new(config, args.user_id.clone()));
                }
                Packet::Snapshot { players } => {
                    if let Some(world) = &mut world {
                        world.apply_snapshot(players);
                    }
                }
                // Connected/Disconnected bookkeeping happens inside poll()
                _ => {}
            }
        }

        match &mut world {
            Some(world) => {
                let controls = InputManager::sample();

                // immediate local movement, before any server confirmation
                if controls.any() {
                    world.predict_local(&controls, dt);
                }

                // transmitted at the network cadence, not the frame rate
                if let Some(command) = input_manager.update(controls) {
                    world.record_input(command);
                    network.send_input(&command);
                }

                world.reconcile(dt);
                world.update_remotes();

                renderer.render(world, network.is_connected());
            }
            None => renderer.render_connecting(),
        }

        next_frame().await;
    }
}
