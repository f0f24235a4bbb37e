//! Low-displacement stuck detection.
//!
//! Positions are sampled at most once per second. Three consecutive samples
//! under the movement threshold set the stuck flag; a clearing sample drops
//! the flag and decrements the counter instead of zeroing it, so brief
//! wiggles against a wall do not mask a genuine pin.

use crate::game::constants::agent;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone)]
pub struct StuckDetector {
    last_position: Option<Vec2>,
    last_sample: f64,
    count: u32,
    stuck: bool,
    escape_direction: f32,
}

impl StuckDetector {
    pub fn new(now: f64) -> Self {
        Self {
            last_position: None,
            last_sample: now,
            count: 0,
            stuck: false,
            escape_direction: 1.0,
        }
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Flip and return the escape turn direction, alternating per call
    pub fn next_escape_direction(&mut self) -> f32 {
        self.escape_direction = -self.escape_direction;
        self.escape_direction
    }

    /// Feed a position observation. Ignored until the sampling interval has
    /// elapsed; a missing position is a no-op. The sample timestamp rolls
    /// forward regardless of the movement outcome.
    pub fn sample(&mut self, position: Option<Vec2>, now: f64) {
        if now - self.last_sample < agent::STUCK_SAMPLE_INTERVAL {
            return;
        }
        let Some(current) = position else {
            return;
        };

        match self.last_position {
            None => {
                self.last_position = Some(current);
            }
            Some(previous) => {
                if previous.distance_to(current) < agent::STUCK_THRESHOLD {
                    self.count += 1;
                    if self.count >= agent::STUCK_SAMPLES {
                        self.stuck = true;
                    }
                } else {
                    self.stuck = false;
                    self.count = self.count.saturating_sub(1);
                }
                self.last_position = Some(current);
            }
        }
        self.last_sample = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_static_samples_set_flag() {
        let mut d = StuckDetector::new(0.0);
        d.sample(Some(Vec2::new(100.0, 100.0)), 1.1);
        d.sample(Some(Vec2::new(101.0, 100.0)), 2.2);
        assert!(!d.is_stuck());
        d.sample(Some(Vec2::new(102.0, 100.0)), 3.3);
        d.sample(Some(Vec2::new(103.0, 100.0)), 4.4);
        assert!(d.is_stuck());
    }

    #[test]
    fn test_movement_clears_flag_and_decrements() {
        let mut d = StuckDetector::new(0.0);
        d.sample(Some(Vec2::new(100.0, 100.0)), 1.1);
        d.sample(Some(Vec2::new(101.0, 100.0)), 2.2);
        d.sample(Some(Vec2::new(102.0, 100.0)), 3.3);
        d.sample(Some(Vec2::new(103.0, 100.0)), 4.4);
        assert!(d.is_stuck());

        d.sample(Some(Vec2::new(200.0, 100.0)), 5.5);
        assert!(!d.is_stuck());
        // Decremented, not reset
        assert_eq!(d.count(), 2);
    }

    #[test]
    fn test_samples_within_interval_ignored() {
        let mut d = StuckDetector::new(0.0);
        d.sample(Some(Vec2::new(100.0, 100.0)), 1.1);
        // Rapid-fire calls inside the interval never advance the counter
        for i in 0..20 {
            d.sample(Some(Vec2::new(100.0, 100.0)), 1.1 + f64::from(i) * 0.01);
        }
        assert_eq!(d.count(), 0);
        assert!(!d.is_stuck());
    }

    #[test]
    fn test_missing_position_is_noop() {
        let mut d = StuckDetector::new(0.0);
        d.sample(Some(Vec2::new(100.0, 100.0)), 1.1);
        d.sample(None, 2.2);
        d.sample(None, 3.3);
        assert_eq!(d.count(), 0);
    }

    #[test]
    fn test_counter_floors_at_zero() {
        let mut d = StuckDetector::new(0.0);
        d.sample(Some(Vec2::new(0.0, 0.0)), 1.1);
        d.sample(Some(Vec2::new(100.0, 0.0)), 2.2);
        d.sample(Some(Vec2::new(200.0, 0.0)), 3.3);
        assert_eq!(d.count(), 0);
    }

    #[test]
    fn test_escape_direction_alternates() {
        let mut d = StuckDetector::new(0.0);
        let a = d.next_escape_direction();
        let b = d.next_escape_direction();
        let c = d.next_escape_direction();
        assert_eq!(a, -b);
        assert_eq!(a, c);
    }
}
