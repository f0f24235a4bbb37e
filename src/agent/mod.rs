//! Sensor-driven decision policy for the player ship.
//!
//! A priority-ordered rule chain: missing data, stuck escape, wall
//! avoidance, enemy engagement, coin collection, memory follow, explore.
//! Each rule short-circuits the rest. `decide` never fails; a panic inside
//! the chain is caught and replaced with the neutral command.

pub mod stuck;

use std::cmp::Ordering;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rand::Rng;
use tracing::{debug, warn};

use crate::game::constants::agent as params;
use crate::game::systems::sensors::ContactKind;
use crate::net::protocol::{Command, RadarObject, SensorResponse};
use crate::util::vec2::Vec2;
use stuck::StuckDetector;

/// Last seen target, kept briefly so the ship keeps steering toward a
/// contact that slipped behind a wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetMemory {
    pub kind: ContactKind,
    pub distance: f32,
    pub angle: f32,
    pub last_seen: f64,
}

pub struct Agent {
    last_command: Command,
    memory: Option<TargetMemory>,
    stuck: StuckDetector,
    explore_rotation: f32,
    last_explore_change: f64,
}

impl Agent {
    pub fn new(now: f64) -> Self {
        Self {
            last_command: Command::default(),
            memory: None,
            stuck: StuckDetector::new(now),
            explore_rotation: 0.0,
            last_explore_change: now,
        }
    }

    /// Map sensor data to a control command. Timestamps are explicit
    /// seconds so the memory and stuck windows are testable.
    pub fn decide<R: Rng>(
        &mut self,
        sensors: Option<&SensorResponse>,
        position: Option<Vec2>,
        now: f64,
        rng: &mut R,
    ) -> Command {
        let cmd = catch_unwind(AssertUnwindSafe(|| {
            self.decide_inner(sensors, position, now, rng)
        }))
        .unwrap_or_else(|_| {
            warn!("decision policy panicked, issuing neutral command");
            Command::default()
        });
        self.last_command = cmd;
        cmd
    }

    fn decide_inner<R: Rng>(
        &mut self,
        sensors: Option<&SensorResponse>,
        position: Option<Vec2>,
        now: f64,
        rng: &mut R,
    ) -> Command {
        let Some(sensors) = sensors else {
            return random_command(rng);
        };

        self.stuck.sample(position, now);

        if self.stuck.is_stuck() {
            let sign = self.stuck.next_escape_direction();
            let thrust = if self.stuck.count() % 2 == 0 { -0.8 } else { 0.2 };
            debug!(attempt = self.stuck.count(), "stuck, escape maneuver");
            return Command {
                rotate: 45.0 * sign,
                thrust,
                shoot: false,
            };
        }

        if let Some(distance) = laser_reading(sensors) {
            if distance < params::AVOID_DISTANCE {
                // Turn the same way as last time so avoidance does not
                // oscillate against the wall.
                let sign = if self.last_command.rotate >= 0.0 { 1.0 } else { -1.0 };
                let (amount, thrust) = if distance < params::AVOID_HARD_DISTANCE {
                    (15.0, 0.0)
                } else {
                    (8.0, 0.1)
                };
                return Command {
                    rotate: amount * sign,
                    thrust,
                    shoot: false,
                };
            }

            // Unreachable at the current thresholds; an independent override
            // in case the avoidance distances ever diverge.
            if distance < params::WALL_AHEAD_DISTANCE {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                return Command {
                    rotate: 5.0 * sign,
                    thrust: 0.0,
                    shoot: false,
                };
            }
        }

        let enemies = nearest_of(&sensors.radar_objects, ContactKind::Enemy);
        let coins = nearest_of(&sensors.radar_objects, ContactKind::Coin);

        if let Some(enemy) = enemies {
            self.remember(enemy, now);
            return engage(enemy);
        }

        if let Some(coin) = coins {
            self.remember(coin, now);
            return Command {
                rotate: turn_rate(coin.angle, false),
                thrust: if coin.angle.abs() < 30.0 { 1.0 } else { 0.5 },
                shoot: false,
            };
        }

        if let Some(memory) = self.memory {
            if now - memory.last_seen < params::MEMORY_WINDOW {
                return Command {
                    rotate: turn_rate(memory.angle, false),
                    thrust: 0.7,
                    shoot: false,
                };
            }
        }

        if now - self.last_explore_change > params::EXPLORE_INTERVAL {
            self.explore_rotation = rng.gen_range(-2.0..=2.0);
            self.last_explore_change = now;
        }
        Command {
            rotate: self.explore_rotation,
            thrust: 0.5,
            shoot: false,
        }
    }

    fn remember(&mut self, contact: &RadarObject, now: f64) {
        self.memory = Some(TargetMemory {
            kind: contact.kind,
            distance: contact.distance,
            angle: contact.angle,
            last_seen: now,
        });
    }
}

/// Combat behavior by range: retreat, circle-strafe, approach
fn engage(enemy: &RadarObject) -> Command {
    let facing = enemy.angle.abs();

    if enemy.distance < params::RETREAT_RANGE {
        Command {
            rotate: turn_rate(enemy.angle, true),
            thrust: -0.5,
            shoot: facing < 15.0,
        }
    } else if enemy.distance < params::STRAFE_RANGE {
        let sign = if enemy.angle > 0.0 { 1.0 } else { -1.0 };
        Command {
            rotate: 3.0 * sign,
            thrust: 0.3,
            shoot: facing < 10.0,
        }
    } else {
        Command {
            rotate: turn_rate(enemy.angle, true),
            thrust: if facing < 30.0 { 0.5 } else { 0.2 },
            shoot: facing < 5.0 && enemy.distance < params::SHOOT_RANGE,
        }
    }
}

/// Proportional steering below 20 degrees, fixed rates above; combat uses
/// the hotter gains
fn turn_rate(angle: f32, aggressive: bool) -> f32 {
    let magnitude = angle.abs();
    let sign = if angle > 0.0 { 1.0 } else { -1.0 };

    if aggressive {
        if magnitude < 20.0 {
            angle * 0.2
        } else if magnitude < 90.0 {
            5.0 * sign
        } else {
            8.0 * sign
        }
    } else if magnitude < 20.0 {
        angle * 0.15
    } else if magnitude < 90.0 {
        3.0 * sign
    } else {
        4.0 * sign
    }
}

fn laser_reading(sensors: &SensorResponse) -> Option<f32> {
    if sensors.laser_hit {
        sensors.laser_distance
    } else {
        None
    }
}

fn nearest_of(objects: &[RadarObject], kind: ContactKind) -> Option<&RadarObject> {
    objects
        .iter()
        .filter(|o| o.kind == kind)
        .min_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        })
}

fn random_command<R: Rng>(rng: &mut R) -> Command {
    Command {
        rotate: rng.gen_range(-3.0..=3.0),
        thrust: rng.gen_range(0.1..=0.5),
        shoot: rng.gen_bool(0.05),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn clear_sensors() -> SensorResponse {
        SensorResponse::default()
    }

    fn radar(objects: Vec<RadarObject>) -> SensorResponse {
        SensorResponse {
            laser_hit: false,
            laser_distance: None,
            radar_objects: objects,
        }
    }

    fn enemy(distance: f32, angle: f32) -> RadarObject {
        RadarObject {
            kind: ContactKind::Enemy,
            distance,
            angle,
        }
    }

    fn coin(distance: f32, angle: f32) -> RadarObject {
        RadarObject {
            kind: ContactKind::Coin,
            distance,
            angle,
        }
    }

    #[test]
    fn test_no_sensor_data_random_command() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let cmd = agent.decide(None, None, 0.0, &mut rng);
        assert!((-3.0..=3.0).contains(&cmd.rotate));
        assert!((0.1..=0.5).contains(&cmd.thrust));
    }

    #[test]
    fn test_enemy_preempts_coin() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(2);
        let sensors = radar(vec![coin(30.0, 10.0), enemy(40.0, 0.0)]);
        let cmd = agent.decide(Some(&sensors), None, 0.0, &mut rng);
        // Retreat branch, never the coin branch
        assert_eq!(cmd.thrust, -0.5);
        assert!(cmd.shoot);
    }

    #[test]
    fn test_retreat_requires_facing_to_shoot() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let sensors = radar(vec![enemy(40.0, 90.0)]);
        let cmd = agent.decide(Some(&sensors), None, 0.0, &mut rng);
        assert_eq!(cmd.thrust, -0.5);
        assert!(!cmd.shoot);
    }

    #[test]
    fn test_circle_strafe_band() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(4);
        let sensors = radar(vec![enemy(75.0, -40.0)]);
        let cmd = agent.decide(Some(&sensors), None, 0.0, &mut rng);
        assert_eq!(cmd.rotate, -3.0);
        assert_eq!(cmd.thrust, 0.3);
        assert!(!cmd.shoot);
    }

    #[test]
    fn test_approach_shoots_only_close_and_aligned() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(5);

        let aligned_near = radar(vec![enemy(200.0, 2.0)]);
        assert!(agent.decide(Some(&aligned_near), None, 0.0, &mut rng).shoot);

        let aligned_far = radar(vec![enemy(400.0, 2.0)]);
        assert!(!agent.decide(Some(&aligned_far), None, 1.0, &mut rng).shoot);

        let misaligned = radar(vec![enemy(200.0, 30.0)]);
        assert!(!agent.decide(Some(&misaligned), None, 2.0, &mut rng).shoot);
    }

    #[test]
    fn test_coin_collection_never_shoots() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(6);
        let sensors = radar(vec![coin(120.0, 10.0)]);
        let cmd = agent.decide(Some(&sensors), None, 0.0, &mut rng);
        assert!(!cmd.shoot);
        assert_eq!(cmd.thrust, 1.0);
        // Gentle proportional steering below 20 degrees
        assert!((cmd.rotate - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_wall_avoidance_close_stops_thrust() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(7);
        let sensors = SensorResponse {
            laser_hit: true,
            laser_distance: Some(15.0),
            radar_objects: vec![enemy(40.0, 0.0)],
        };
        let cmd = agent.decide(Some(&sensors), None, 0.0, &mut rng);
        // Wall avoidance preempts engagement
        assert_eq!(cmd.rotate.abs(), 15.0);
        assert_eq!(cmd.thrust, 0.0);
        assert!(!cmd.shoot);
    }

    #[test]
    fn test_wall_avoidance_keeps_turn_direction() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(8);
        // Seed a negative rotation via the strafe branch
        let strafe = radar(vec![enemy(75.0, -40.0)]);
        agent.decide(Some(&strafe), None, 0.0, &mut rng);

        let sensors = SensorResponse {
            laser_hit: true,
            laser_distance: Some(35.0),
            radar_objects: vec![],
        };
        let cmd = agent.decide(Some(&sensors), None, 1.0, &mut rng);
        assert_eq!(cmd.rotate, -8.0);
        assert_eq!(cmd.thrust, 0.1);
    }

    #[test]
    fn test_memory_follow_within_window() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(9);

        let sensors = radar(vec![coin(100.0, 40.0)]);
        agent.decide(Some(&sensors), None, 0.0, &mut rng);

        // Target gone, memory still fresh
        let cmd = agent.decide(Some(&clear_sensors()), None, 1.0, &mut rng);
        assert_eq!(cmd.thrust, 0.7);
        assert_eq!(cmd.rotate, 3.0);
    }

    #[test]
    fn test_memory_expires_into_explore() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(10);

        let sensors = radar(vec![coin(100.0, 40.0)]);
        agent.decide(Some(&sensors), None, 0.0, &mut rng);

        let cmd = agent.decide(Some(&clear_sensors()), None, 5.0, &mut rng);
        assert_eq!(cmd.thrust, 0.5);
        assert!((-2.0..=2.0).contains(&cmd.rotate));
    }

    #[test]
    fn test_stuck_escape_alternates_direction() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(11);
        let pos = Vec2::new(100.0, 100.0);

        // Four slow samples set the stuck flag
        for t in 1..=4 {
            agent.decide(Some(&clear_sensors()), Some(pos), f64::from(t) * 1.1, &mut rng);
        }

        let first = agent.decide(Some(&clear_sensors()), Some(pos), 4.5, &mut rng);
        let second = agent.decide(Some(&clear_sensors()), Some(pos), 4.6, &mut rng);
        assert_eq!(first.rotate.abs(), 45.0);
        assert_eq!(first.rotate, -second.rotate);
        assert!(!first.shoot);
    }

    #[test]
    fn test_nearest_enemy_selected() {
        let mut agent = Agent::new(0.0);
        let mut rng = StdRng::seed_from_u64(12);
        let sensors = radar(vec![enemy(250.0, 60.0), enemy(70.0, 10.0), enemy(500.0, 0.0)]);
        let cmd = agent.decide(Some(&sensors), None, 0.0, &mut rng);
        // The 70-unit contact drives the strafe branch
        assert_eq!(cmd.rotate, 3.0);
        assert_eq!(cmd.thrust, 0.3);
    }
}
