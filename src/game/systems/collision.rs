//! Collision resolution: ship vs walls/ships, bullet vs walls/ships.
//!
//! Ship resolution runs two independent per-axis chains, so a single call
//! can correct both x and y. Near a corner this pins the ship against both
//! faces at once. That is the intended behavior, not a bug; keep the chains
//! non-exclusive.

use crate::game::constants::{bullet, ship};
use crate::game::geom::Rect;
use crate::game::state::{Bullet, Ship, ShipId};

/// Build the blocker set for one ship: every wall plus the collision boxes
/// of all other live ships. An explicit snapshot, so resolution never reads
/// the live list it is mutating.
pub fn blocker_snapshot(walls: &[Rect], ships: &[Ship], self_id: ShipId) -> Vec<Rect> {
    let mut blockers = Vec::with_capacity(walls.len() + ships.len());
    blockers.extend_from_slice(walls);
    blockers.extend(
        ships
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self_id)
            .map(|(_, s)| s.collision_box()),
    );
    blockers
}

/// Push a ship out of any blocking rectangle, zeroing the corrected axis's
/// velocity. Both axes may resolve against the same blocker.
pub fn resolve_ship(ship: &mut Ship, blockers: &[Rect]) {
    let half = ship::HALF_BOX;

    for blocker in blockers {
        if !ship.collision_box().overlaps(blocker) {
            continue;
        }

        if ship.position.x < blocker.x {
            ship.position.x = blocker.x - half;
            ship.velocity.x = 0.0;
        } else if ship.position.x > blocker.right() {
            ship.position.x = blocker.right() + half;
            ship.velocity.x = 0.0;
        }

        if ship.position.y < blocker.y {
            ship.position.y = blocker.y - half;
            ship.velocity.y = 0.0;
        } else if ship.position.y > blocker.bottom() {
            ship.position.y = blocker.bottom() + half;
            ship.velocity.y = 0.0;
        }
    }
}

/// Whether a bullet's box overlaps any wall
pub fn bullet_hits_wall(b: &Bullet, walls: &[Rect]) -> bool {
    let probe = b.collision_box();
    walls.iter().any(|w| probe.overlaps(w))
}

/// Whether a bullet is within hit radius of a ship's center
pub fn bullet_hits_ship(b: &Bullet, target: &Ship) -> bool {
    b.position.distance_to(target.position) < bullet::HIT_RADIUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Role, PLAYER};
    use crate::util::vec2::Vec2;

    fn ship_at(x: f32, y: f32) -> Ship {
        Ship::new(Vec2::new(x, y), 0.0, Role::Player)
    }

    #[test]
    fn test_resolve_snaps_left_of_wall() {
        let wall = Rect::new(100.0, 0.0, 20.0, 200.0);
        let mut s = ship_at(95.0, 100.0);
        s.velocity = Vec2::new(5.0, 0.0);
        resolve_ship(&mut s, &[wall]);
        assert_eq!(s.position.x, 90.0);
        assert_eq!(s.velocity.x, 0.0);
        // y untouched
        assert_eq!(s.position.y, 100.0);
    }

    #[test]
    fn test_resolve_snaps_right_of_wall() {
        let wall = Rect::new(100.0, 0.0, 20.0, 200.0);
        let mut s = ship_at(125.0, 100.0);
        s.velocity = Vec2::new(-5.0, 0.0);
        resolve_ship(&mut s, &[wall]);
        assert_eq!(s.position.x, 130.0);
        assert_eq!(s.velocity.x, 0.0);
    }

    #[test]
    fn test_resolve_snaps_above_and_below() {
        let wall = Rect::new(0.0, 100.0, 200.0, 20.0);

        let mut above = ship_at(50.0, 95.0);
        above.velocity = Vec2::new(0.0, 3.0);
        resolve_ship(&mut above, &[wall]);
        assert_eq!(above.position.y, 90.0);
        assert_eq!(above.velocity.y, 0.0);

        let mut below = ship_at(50.0, 125.0);
        below.velocity = Vec2::new(0.0, -3.0);
        resolve_ship(&mut below, &[wall]);
        assert_eq!(below.position.y, 130.0);
        assert_eq!(below.velocity.y, 0.0);
    }

    #[test]
    fn test_resolve_corner_pins_both_axes() {
        // Ship overlapping a corner from the upper-left: both chains fire in
        // the same call and both velocity components zero.
        let wall = Rect::new(100.0, 100.0, 50.0, 50.0);
        let mut s = ship_at(95.0, 95.0);
        s.velocity = Vec2::new(4.0, 4.0);
        resolve_ship(&mut s, &[wall]);
        assert_eq!(s.position, Vec2::new(90.0, 90.0));
        assert_eq!(s.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_resolve_no_overlap_no_change() {
        let wall = Rect::new(100.0, 100.0, 20.0, 20.0);
        let mut s = ship_at(300.0, 300.0);
        s.velocity = Vec2::new(2.0, 2.0);
        resolve_ship(&mut s, &[wall]);
        assert_eq!(s.position, Vec2::new(300.0, 300.0));
        assert_eq!(s.velocity, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_blocker_snapshot_excludes_self() {
        let walls = vec![Rect::new(0.0, 0.0, 10.0, 10.0)];
        let ships = vec![ship_at(100.0, 100.0), ship_at(200.0, 200.0)];
        let blockers = blocker_snapshot(&walls, &ships, PLAYER);
        assert_eq!(blockers.len(), 2);
        // Second entry is the other ship's box, not our own
        assert_eq!(blockers[1], ships[1].collision_box());
    }

    #[test]
    fn test_ships_block_each_other() {
        let ships = vec![ship_at(100.0, 100.0), ship_at(112.0, 100.0)];
        let blockers = blocker_snapshot(&[], &ships, 0);
        let mut mover = ships[0].clone();
        mover.velocity = Vec2::new(3.0, 0.0);
        resolve_ship(&mut mover, &blockers);
        // Snapped to the left face of the other ship's box
        assert_eq!(mover.position.x, 112.0 - 10.0 - 10.0);
        assert_eq!(mover.velocity.x, 0.0);
    }

    #[test]
    fn test_bullet_wall_hit() {
        let walls = vec![Rect::new(100.0, 100.0, 20.0, 20.0)];
        let hit = Bullet::new(Vec2::new(101.0, 101.0), 0.0, PLAYER);
        let miss = Bullet::new(Vec2::new(50.0, 50.0), 0.0, PLAYER);
        assert!(bullet_hits_wall(&hit, &walls));
        assert!(!bullet_hits_wall(&miss, &walls));
    }

    #[test]
    fn test_bullet_ship_hit_radius() {
        let target = ship_at(100.0, 100.0);
        let close = Bullet::new(Vec2::new(110.0, 100.0), 0.0, PLAYER);
        let far = Bullet::new(Vec2::new(116.0, 100.0), 0.0, PLAYER);
        assert!(bullet_hits_ship(&close, &target));
        assert!(!bullet_hits_ship(&far, &target));
    }
}
