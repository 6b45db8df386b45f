//! # World Server Library
//!
//! The authoritative half of the multiplayer world: it owns the canonical
//! player table, replays every client's buffered inputs through the shared
//! movement resolver on a fixed tick, and broadcasts full world snapshots so
//! clients can reconcile their predictions against reality.
//!
//! ## Architecture
//!
//! A single-threaded event loop (`tokio::select!`) alternates between two
//! arms that never run concurrently:
//!
//! - **receive**: decode an incoming datagram, update the session registry,
//!   append inputs to the sender's FIFO queue
//! - **tick**: drain every queue completely through the movement resolver,
//!   then broadcast the `{player id -> state}` snapshot map
//!
//! The per-player input queue is the only structure shared between the two
//! arms, and both mutations happen on the same logical thread, so there is
//! no locking discipline beyond "append on receive, drain on tick".
//! Auxiliary tasks (socket reader, socket writer, timeout sweeper) talk to
//! the main loop exclusively through mpsc channels.
//!
//! ## Modules
//!
//! - [`session`]: connection lifecycle and input buffering, owned by the
//!   server rather than living in a global table
//! - [`simulation`]: the canonical player states and the per-tick drain
//! - [`worldgen`]: seeded scenery placement producing the immutable
//!   [`shared::WorldConfig`]
//! - [`auth`]: the identity-verification boundary; the core consumes a
//!   boolean decision and an opaque user id
//! - [`network`]: UDP transport, packet dispatch, and the tick loop
//!
//! ## Usage
//!
//! ```rust,no_run
//! use server::auth::SharedSecretVerifier;
//! use server::network::Server;
//! use server::worldgen;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let world = worldgen::generate(None);
//!     let verifier = Box::new(SharedSecretVerifier::new("let-me-in"));
//!
//!     let mut server = Server::new(
//!         "127.0.0.1:8080",
//!         Duration::from_micros(15_625), // 64 Hz
//!         32,
//!         world,
//!         verifier,
//!     )
//!     .await?;
//!
//!     server.run().await
//! }
//! ```

pub mod auth;
pub mod network;
pub mod session;
pub mod simulation;
pub mod worldgen;
