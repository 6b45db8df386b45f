//! The movement resolver: one pure function stepping a player pose forward
//! from a set of control flags.
//!
//! The server calls this when draining input queues each tick; the client
//! calls the very same function for local prediction and for replaying
//! in-flight inputs during reconciliation. Keeping a single implementation is
//! what makes the replay land exactly on the state the server will confirm.

use crate::geometry::{polygons_intersect, rotated_rectangle};
use crate::world::{Vec2, WorldConfig};
use serde::{Deserialize, Serialize};

/// Directional control flags as sampled from the input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl Controls {
    /// True when at least one directional flag is held.
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// A timestamped control sample. Timestamp order is the authoritative
/// processing order on the server and the replay order on the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputCommand {
    pub controls: Controls,
    /// Client send time in milliseconds.
    pub ts: u64,
}

/// Advances a player pose by one input.
///
/// Returns the new `(position, rotation)`. Position and rotation are accepted
/// or rejected together: if the candidate pose collides with any collidable
/// object, the original pose comes back unchanged. With no flag held the
/// input pose is returned as-is: rotation is retained, never reset to
/// `atan2(0, 0)`.
pub fn resolve(
    position: Vec2,
    rotation: f32,
    controls: &Controls,
    speed: f32,
    dt: f32,
    world: &WorldConfig,
) -> (Vec2, f32) {
    if !controls.any() {
        return (position, rotation);
    }

    let flag = |held: bool| -> f32 {
        if held {
            1.0
        } else {
            0.0
        }
    };

    // heading from the held flags; diagonals are not normalized
    let front_z = flag(controls.backward) - flag(controls.forward);
    let side_x = flag(controls.left) - flag(controls.right);
    let direction = Vec2::new(-side_x, front_z);
    let candidate_rotation = direction.z.atan2(direction.x);

    let step = speed * dt;
    let mut candidate = position;
    if controls.left {
        candidate.x -= step;
    }
    if controls.right {
        candidate.x += step;
    }
    if controls.forward {
        candidate.z -= step;
    }
    if controls.backward {
        candidate.z += step;
    }

    // leaving the world places the player on the opposite edge, which makes
    // the flat plane feel like a sphere
    candidate.x = wrap(candidate.x, world.width);
    candidate.z = wrap(candidate.z, world.depth);

    if collides(candidate, candidate_rotation, world) {
        (position, rotation)
    } else {
        (candidate, candidate_rotation)
    }
}

/// Single-step world wrap: a coordinate past either edge is teleported to the
/// opposite edge. Not a clamp and not a modulo. An overshoot of more than
/// one world-width still wraps only once.
fn wrap(coordinate: f32, dimension: f32) -> f32 {
    if coordinate < -dimension {
        dimension
    } else if coordinate > dimension {
        -dimension
    } else {
        coordinate
    }
}

/// Tests the player bounding polygon at the given pose against every
/// collidable object. Non-collidable scenery is never checked.
pub fn collides(position: Vec2, rotation: f32, world: &WorldConfig) -> bool {
    let player_polygon = rotated_rectangle(rotation, position, &world.player_bounding_box);

    for object in &world.collidable_objects {
        let object_polygon =
            rotated_rectangle(object.rotation, Vec2::new(object.x, object.z), &object.bbox);
        if polygons_intersect(&player_polygon, &object_polygon) {
            return true;
        }
    }

    false
}
