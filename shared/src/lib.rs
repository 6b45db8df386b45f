//! Data model, geometry kernel, movement resolver, and wire protocol shared
//! between the authoritative server and the predicting client.
//!
//! Both sides step players through the exact same [`movement::resolve`]
//! function. This is what keeps server simulation and client replay
//! bit-for-bit consistent: the client can re-run its unacknowledged inputs
//! against the last authoritative state and land exactly where the server
//! will.

pub mod geometry;
pub mod movement;
pub mod protocol;
pub mod world;

pub use movement::{resolve, Controls, InputCommand};
pub use protocol::{Packet, PlayerSnapshot, PROTOCOL_VERSION};
pub use world::{BoundingBox, ObjectKind, Vec2, WorldConfig, WorldObject};

/// World half-extent along the x-axis; positions wrap at +/- this value.
pub const WORLD_WIDTH: f32 = 100.0;
/// World extent along the (unsimulated) y-axis, sent to clients for scenery scale.
pub const WORLD_HEIGHT: f32 = 100.0;
/// World half-extent along the z-axis; positions wrap at +/- this value.
pub const WORLD_DEPTH: f32 = 100.0;

/// Avatar movement speed in world units per second.
pub const PLAYER_SPEED: f32 = 12.0;
