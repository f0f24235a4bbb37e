//! Physics body updates: friction, per-axis speed clamp, world-bounds clamp.
//!
//! CRITICAL: the speed clamp is per velocity axis, not vector magnitude, and
//! the world boundary is a hard positional stop with no bounce.

use crate::game::constants::{physics, world};
use crate::game::geom::normalize_heading;
use crate::game::state::{Role, Ship};
use crate::util::vec2::Vec2;

/// Advance a ship one tick: friction, clamp, move, bound
pub fn integrate(ship: &mut Ship) {
    let max_speed = match ship.role {
        Role::Player => physics::PLAYER_MAX_SPEED,
        Role::Enemy => physics::ENEMY_MAX_SPEED,
    };

    ship.velocity *= physics::FRICTION;
    ship.velocity.x = ship.velocity.x.clamp(-max_speed, max_speed);
    ship.velocity.y = ship.velocity.y.clamp(-max_speed, max_speed);

    ship.position += ship.velocity;
    ship.position.x = ship.position.x.clamp(0.0, world::WIDTH);
    ship.position.y = ship.position.y.clamp(0.0, world::HEIGHT);
}

/// Apply thrust along the ship's heading; negative amounts reverse
pub fn thrust(ship: &mut Ship, amount: f32) {
    ship.velocity += Vec2::from_heading(ship.angle) * amount;
}

/// Rotate the ship, keeping the heading in [0, 360)
pub fn rotate(ship: &mut Ship, degrees: f32) {
    ship.angle = normalize_heading(ship.angle + degrees);
}
