//! Top-down visualization of the ground plane.
//!
//! The 3D scene (models, animation, lighting) lives outside this crate; what
//! the client draws is an overhead projection of the simulated plane:
//! scenery, remote avatars, and the local player, with the camera pinned to
//! the local player's on-screen position.

use crate::game::ClientWorld;
use macroquad::prelude::*;
use shared::{ObjectKind, Vec2, WorldObject};

/// Screen pixels per world unit.
const PIXELS_PER_UNIT: f32 = 6.0;
/// Drawn size of an avatar marker.
const AVATAR_RADIUS: f32 = 1.2;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Renderer
    }

    pub fn render(&self, world: &ClientWorld, connected: bool) {
        clear_background(Color::from_rgba(92, 142, 74, 255));

        // camera follows the local player every frame
        let camera = world.displayed_position;

        self.draw_world_bounds(world, camera);

        for object in &world.world().noncollidable_objects {
            self.draw_object(object, camera);
        }
        for object in &world.world().collidable_objects {
            self.draw_object(object, camera);
        }

        for remote in world.remotes.values() {
            self.draw_avatar(
                remote.displayed,
                remote.rotation,
                camera,
                Color::from_rgba(255, 68, 68, 255),
            );
        }

        self.draw_avatar(world.displayed_position, world.displayed_rotation, camera, GREEN);

        self.draw_ui(world, connected);
    }

    /// Shown while waiting for the connect ack and the world config.
    pub fn render_connecting(&self) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        draw_text(
            "Connecting...",
            screen_width() / 2.0 - 60.0,
            screen_height() / 2.0,
            24.0,
            WHITE,
        );
    }

    fn to_screen(&self, point: Vec2, camera: Vec2) -> (f32, f32) {
        (
            screen_width() / 2.0 + (point.x - camera.x) * PIXELS_PER_UNIT,
            screen_height() / 2.0 + (point.z - camera.z) * PIXELS_PER_UNIT,
        )
    }

    fn draw_world_bounds(&self, world: &ClientWorld, camera: Vec2) {
        let config = world.world();
        let (left, top) = self.to_screen(Vec2::new(-config.width, -config.depth), camera);
        let (right, bottom) = self.to_screen(Vec2::new(config.width, config.depth), camera);

        draw_rectangle_lines(
            left,
            top,
            right - left,
            bottom - top,
            3.0,
            Color::from_rgba(255, 255, 255, 90),
        );
    }

    fn draw_object(&self, object: &WorldObject, camera: Vec2) {
        let (x, y) = self.to_screen(Vec2::new(object.x, object.z), camera);

        // cheap off-screen cull
        if x < -100.0 || x > screen_width() + 100.0 || y < -100.0 || y > screen_height() + 100.0 {
            return;
        }

        match object.kind {
            ObjectKind::Tree => {
                draw_circle(x, y, 1.2 * PIXELS_PER_UNIT, Color::from_rgba(34, 85, 34, 255));
                draw_circle(x, y, 0.3 * PIXELS_PER_UNIT, Color::from_rgba(92, 58, 32, 255));
            }
            ObjectKind::House => {
                draw_rectangle_ex(
                    x,
                    y,
                    10.0 * PIXELS_PER_UNIT,
                    8.0 * PIXELS_PER_UNIT,
                    DrawRectangleParams {
                        offset: vec2(0.5, 0.5),
                        rotation: object.rotation,
                        color: Color::from_rgba(140, 90, 60, 255),
                    },
                );
            }
            ObjectKind::Grass => {
                draw_circle(x, y, 0.4 * PIXELS_PER_UNIT, Color::from_rgba(120, 170, 90, 255));
            }
            ObjectKind::Plant => {
                draw_circle(x, y, 0.5 * PIXELS_PER_UNIT, Color::from_rgba(60, 120, 60, 255));
            }
            ObjectKind::Mushroom => {
                draw_circle(x, y, 0.35 * PIXELS_PER_UNIT, Color::from_rgba(200, 60, 50, 255));
            }
        }
    }

    fn draw_avatar(&self, position: Vec2, rotation: f32, camera: Vec2, color: Color) {
        let (x, y) = self.to_screen(position, camera);

        // triangle pointing along the heading
        draw_poly(
            x,
            y,
            3,
            AVATAR_RADIUS * PIXELS_PER_UNIT,
            rotation.to_degrees(),
            color,
        );
        draw_poly_lines(
            x,
            y,
            3,
            AVATAR_RADIUS * PIXELS_PER_UNIT,
            rotation.to_degrees(),
            1.5,
            WHITE,
        );
    }

    fn draw_ui(&self, world: &ClientWorld, connected: bool) {
        let connection_color = if connected { GREEN } else { RED };
        draw_rectangle(10.0, 10.0, 8.0, 8.0, connection_color);
        draw_text("CON", 22.0, 18.0, 12.0, WHITE);

        let player_text = format!("{} players", world.remotes.len() + 1);
        draw_text(&player_text, 10.0, 34.0, 12.0, WHITE);

        let pending_text = format!("{} in flight", world.pending_input_count());
        draw_text(&pending_text, 10.0, 48.0, 12.0, WHITE);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
