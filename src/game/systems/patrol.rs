//! Enemy controller: direct chase on line of sight, otherwise a
//! forward / turning / wall-avoid patrol state machine.
//!
//! All three patrol phases share one look-ahead probe: a point projected 80
//! units along the heading, tested as a ship-sized box against the wall set.

use rand::Rng;

use crate::game::geom::{normalize_bearing, Rect};
use crate::game::state::Ship;
use crate::game::systems::{physics, sensors};
use crate::util::vec2::Vec2;

/// Distance of the forward wall probe
const LOOKAHEAD: f32 = 80.0;

/// Patrol phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Forward,
    Turning,
    WallAvoid,
}

/// Per-enemy patrol controller state, carried on the ship between ticks
#[derive(Debug, Clone)]
pub struct PatrolState {
    pub phase: Phase,
    /// Ticks since entering the current phase
    pub timer: u32,
    /// Remaining degrees of a turn in progress (signed)
    pub turn_target: f32,
    /// Preferred turn direction, +1 or -1
    pub direction: f32,
}

impl Default for PatrolState {
    fn default() -> Self {
        Self {
            phase: Phase::Forward,
            timer: 0,
            turn_target: 0.0,
            direction: 1.0,
        }
    }
}

impl PatrolState {
    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.timer = 0;
    }
}

/// Random-transition tuning. Tests zero the probabilities to pin the state
/// machine in place.
#[derive(Debug, Clone, Copy)]
pub struct EnemyTuning {
    /// Per-tick chance of a FORWARD -> TURNING transition once eligible
    pub turn_chance: f64,
    /// Per-tick fire chance while chasing
    pub fire_chance: f64,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            turn_chance: 0.01,
            fire_chance: 0.02,
        }
    }
}

/// Drive one enemy for one tick. Returns true when the enemy fires.
pub fn drive<R: Rng>(
    ship: &mut Ship,
    player_position: Option<Vec2>,
    walls: &[Rect],
    tuning: &EnemyTuning,
    rng: &mut R,
) -> bool {
    if let Some(target) = player_position {
        if sensors::is_visible(ship.position, target, walls) {
            return chase(ship, target, tuning, rng);
        }
    }
    patrol(ship, walls, tuning, rng);
    false
}

/// Proportional pursuit: close 10% of the bearing error per tick
fn chase<R: Rng>(ship: &mut Ship, target: Vec2, tuning: &EnemyTuning, rng: &mut R) -> bool {
    let delta = target - ship.position;
    let bearing = normalize_bearing(delta.y.atan2(delta.x).to_degrees() - ship.angle);

    physics::rotate(ship, bearing * 0.1);
    physics::thrust(ship, 0.3);
    rng.gen_bool(tuning.fire_chance)
}

fn patrol<R: Rng>(ship: &mut Ship, walls: &[Rect], tuning: &EnemyTuning, rng: &mut R) {
    ship.patrol.timer += 1;
    let blocked = wall_ahead(ship, walls);

    // Borrow dance: the phase logic mutates both the patrol state and the
    // ship body, so work on a local copy of the state and store it back.
    let mut st = ship.patrol.clone();

    match st.phase {
        Phase::Forward => {
            physics::thrust(ship, 0.2);

            if st.timer % 60 == 0 {
                physics::rotate(ship, rng.gen_range(-2.0..=2.0));
            }

            if blocked {
                st.enter(Phase::WallAvoid);
            } else if st.timer > 180 && rng.gen_bool(tuning.turn_chance) {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                st.turn_target = sign * rng.gen_range(70.0..=110.0);
                st.direction = sign;
                st.enter(Phase::Turning);
            }
        }
        Phase::Turning => {
            if blocked {
                st.enter(Phase::WallAvoid);
            } else {
                // At most 2 degrees per tick, easing as the target shrinks
                let turn = st.turn_target.signum() * 2.0_f32.min(st.turn_target.abs() * 0.1);
                physics::rotate(ship, turn);
                st.turn_target -= turn;
                physics::thrust(ship, 0.1);

                if st.turn_target.abs() < 5.0 || st.timer > 120 {
                    st.enter(Phase::Forward);
                }
            }
        }
        Phase::WallAvoid => {
            physics::rotate(ship, 4.0 * st.direction);
            if st.timer <= 15 {
                physics::thrust(ship, -0.2);
            }

            if st.timer > 90 {
                st.turn_target = 180.0 * st.direction;
                st.enter(Phase::Turning);
            } else if st.timer > 30 && !blocked {
                st.direction = -st.direction;
                st.enter(Phase::Forward);
            }
        }
    }

    ship.patrol = st;
}

/// Whether a ship-sized box 80 units ahead of the ship overlaps any wall
fn wall_ahead(ship: &Ship, walls: &[Rect]) -> bool {
    let probe_center = ship.position + Vec2::from_heading(ship.angle) * LOOKAHEAD;
    let probe = Rect::centered(
        probe_center,
        crate::game::constants::ship::BOX_SIZE,
        crate::game::constants::ship::BOX_SIZE,
    );
    walls.iter().any(|w| probe.overlaps(w))
}
