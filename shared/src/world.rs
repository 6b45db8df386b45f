use serde::{Deserialize, Serialize};

///A position on the ground plane. The vertical axis is not simulated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub fn new(x: f32, z: f32) -> Self {
        Vec2 { x, z }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            z: self.z + other.z,
        }
    }

    ///Linearly interpolates toward `target` by factor `t`.
    pub fn lerp(&self, target: &Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: self.x + (target.x - self.x) * t,
            z: self.z + (target.z - self.z) * t,
        }
    }
}

/// Four corner offsets of a collision rectangle in local (unrotated) object
/// space. `b`/`f` are the -x/+x edges, `l`/`r` the -z/+z edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub bl: Vec2,
    pub br: Vec2,
    pub fl: Vec2,
    pub fr: Vec2,
}

impl BoundingBox {
    /// A rectangle of the given half-extents centered on the object origin.
    pub fn centered(half_x: f32, half_z: f32) -> Self {
        BoundingBox {
            bl: Vec2::new(-half_x, -half_z),
            br: Vec2::new(-half_x, half_z),
            fl: Vec2::new(half_x, -half_z),
            fr: Vec2::new(half_x, half_z),
        }
    }

    /// The avatar collision box. Skewed forward so the model's nose, not its
    /// pivot, is what bumps into scenery.
    pub fn player() -> Self {
        BoundingBox {
            bl: Vec2::new(-0.5, -0.5),
            br: Vec2::new(-0.5, 0.5),
            fl: Vec2::new(2.0, -0.5),
            fr: Vec2::new(2.0, 0.5),
        }
    }
}

/// Scenery variant. Trees and houses block movement; the rest is decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Tree,
    House,
    Grass,
    Plant,
    Mushroom,
}

impl ObjectKind {
    pub fn is_collidable(&self) -> bool {
        matches!(self, ObjectKind::Tree | ObjectKind::House)
    }
}

/// A static scenery instance. Immutable after world generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorldObject {
    pub kind: ObjectKind,
    pub x: f32,
    pub z: f32,
    pub rotation: f32,
    pub bbox: BoundingBox,
}

/// The immutable world description, built once at server start and sent
/// verbatim to every client on connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub collidable_objects: Vec<WorldObject>,
    pub noncollidable_objects: Vec<WorldObject>,
    pub player_bounding_box: BoundingBox,
    pub player_speed: f32,
}

impl WorldConfig {
    /// An empty world with the default dimensions, speed, and player box.
    /// Scenery is added by the server's world generator.
    pub fn empty() -> Self {
        WorldConfig {
            width: crate::WORLD_WIDTH,
            height: crate::WORLD_HEIGHT,
            depth: crate::WORLD_DEPTH,
            collidable_objects: Vec::new(),
            noncollidable_objects: Vec::new(),
            player_bounding_box: BoundingBox::player(),
            player_speed: crate::PLAYER_SPEED,
        }
    }
}
