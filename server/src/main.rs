use clap::Parser;
use log::info;
use server::auth::SharedSecretVerifier;
use server::network::Server;
use server::worldgen;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the UDP socket to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Tick rate (simulation updates per second)
    #[arg(short, long, default_value = "64")]
    tick_rate: u32,

    /// Maximum concurrent players
    #[arg(short, long, default_value = "32")]
    max_players: usize,

    /// World generation seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Shared secret clients must present at connect
    #[arg(long, default_value = "let-me-in")]
    secret: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let world = worldgen::generate(args.seed);
    info!(
        "Generated world: {} collidable, {} decorative objects",
        world.collidable_objects.len(),
        world.noncollidable_objects.len()
    );

    let addr = format!("{}:{}", args.host, args.port);
    let tick_duration = Duration::from_secs_f64(1.0 / args.tick_rate as f64);
    let verifier = Box::new(SharedSecretVerifier::new(args.secret));

    let mut server = Server::new(&addr, tick_duration, args.max_players, world, verifier).await?;
    server.run().await
}
