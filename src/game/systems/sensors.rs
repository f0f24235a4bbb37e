//! Laser and radar sensing against the wall set.
//!
//! Both sensors run on read-only snapshots, so the same code serves the
//! in-process controllers and the `/sense` endpoint working off the
//! published-state cache. Only static walls occlude; ships and bullets never
//! block the radar's line of sight.

use serde::{Deserialize, Serialize};

use crate::game::constants::sensor;
use crate::game::geom::{normalize_bearing, segment_rect_intersection, segments_intersect, Rect};
use crate::game::state::ShipId;
use crate::util::vec2::Vec2;

/// What a radar contact is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Enemy,
    Coin,
}

/// One visible radar contact: kind, distance, and relative bearing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarContact {
    pub kind: ContactKind,
    pub distance: f32,
    /// Bearing relative to the sensing ship's heading, in (-180, 180]
    pub angle: f32,
}

/// Forward laser: distance to the nearest wall within range, `None` on miss.
///
/// Each wall reports its first-edge intersection; the nearest across walls
/// wins, which is what makes the laser distance-correct even though the rect
/// primitive is not.
pub fn laser(position: Vec2, heading: f32, walls: &[Rect]) -> Option<f32> {
    let tip = position + Vec2::from_heading(heading) * sensor::LASER_RANGE;

    let mut nearest: Option<f32> = None;
    for wall in walls {
        if let Some(hit) = segment_rect_intersection(position, tip, wall) {
            let d = position.distance_to(hit);
            if nearest.map_or(true, |best| d < best) {
                nearest = Some(d);
            }
        }
    }
    nearest
}

/// Geometry-only visibility between two points: true when no wall segment
/// crosses the sight line. A per-wall bounding-box pre-filter skips walls
/// whose center lies well outside the sight line's extent on both axes.
pub fn is_visible(from: Vec2, to: Vec2, walls: &[Rect]) -> bool {
    let slack = sensor::PREFILTER_SLACK;
    let (min_x, max_x) = (from.x.min(to.x) - slack, from.x.max(to.x) + slack);
    let (min_y, max_y) = (from.y.min(to.y) - slack, from.y.max(to.y) + slack);

    for wall in walls {
        let c = wall.center();
        if (c.x < min_x || c.x > max_x) && (c.y < min_y || c.y > max_y) {
            continue;
        }
        if sight_line_blocked(from, to, wall) {
            return false;
        }
    }
    true
}

fn sight_line_blocked(from: Vec2, to: Vec2, wall: &Rect) -> bool {
    let tl = Vec2::new(wall.x, wall.y);
    let tr = Vec2::new(wall.right(), wall.y);
    let br = Vec2::new(wall.right(), wall.bottom());
    let bl = Vec2::new(wall.x, wall.bottom());

    segments_intersect(from, to, tl, tr)
        || segments_intersect(from, to, tr, br)
        || segments_intersect(from, to, br, bl)
        || segments_intersect(from, to, bl, tl)
}

/// Radar sweep for one ship: every other ship and every coin within range
/// that passes the visibility test, as (kind, distance, relative bearing).
///
/// Takes plain positions so it runs equally against live engine state and
/// the published-state cache. The sensing ship is excluded by index from
/// `ship_positions`. Contacts closer than the close-visibility threshold
/// skip the wall check entirely.
pub fn radar(
    self_id: ShipId,
    position: Vec2,
    heading: f32,
    ship_positions: &[Vec2],
    coin_positions: &[Vec2],
    walls: &[Rect],
) -> Vec<RadarContact> {
    let mut contacts = Vec::new();

    for (i, &target) in ship_positions.iter().enumerate() {
        if i == self_id {
            continue;
        }
        if let Some(c) = contact(position, heading, target, ContactKind::Enemy, walls) {
            contacts.push(c);
        }
    }

    for &target in coin_positions {
        if let Some(c) = contact(position, heading, target, ContactKind::Coin, walls) {
            contacts.push(c);
        }
    }

    contacts
}

fn contact(
    position: Vec2,
    heading: f32,
    target: Vec2,
    kind: ContactKind,
    walls: &[Rect],
) -> Option<RadarContact> {
    let distance = position.distance_to(target);
    if distance > sensor::RADAR_RANGE {
        return None;
    }
    if distance >= sensor::CLOSE_VISIBILITY && !is_visible(position, target, walls) {
        return None;
    }

    let delta = target - position;
    let absolute = delta.y.atan2(delta.x).to_degrees();
    Some(RadarContact {
        kind,
        distance,
        angle: normalize_bearing(absolute - heading),
    })
}
