//! Prometheus-compatible metrics registry
//!
//! Served as text by the HTTP service at /metrics.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

const TICK_HISTORY: usize = 1000;

/// Metrics registry for the game server
#[derive(Debug)]
pub struct Metrics {
    // Entity counts
    pub ship_count: AtomicU64,
    pub bullet_count: AtomicU64,
    pub coin_count: AtomicU64,

    // Scores
    pub player_score: AtomicU64,

    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub tick_count: AtomicU64,

    // Networking
    pub states_published: AtomicU64,
    pub publish_drops: AtomicU64,
    pub decision_fallbacks: AtomicU64,
    pub requests_served: AtomicU64,

    pub sessions_started: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            ship_count: AtomicU64::new(0),
            bullet_count: AtomicU64::new(0),
            coin_count: AtomicU64::new(0),
            player_score: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            states_published: AtomicU64::new(0),
            publish_drops: AtomicU64::new(0),
            decision_fallbacks: AtomicU64::new(0),
            requests_served: AtomicU64::new(0),
            sessions_started: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us
                .store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us
                .store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us
                .store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Refresh the entity gauges from a tick's counts
    pub fn record_entities(&self, ships: usize, bullets: usize, coins: usize, score: u32) {
        self.ship_count.store(ships as u64, Ordering::Relaxed);
        self.bullet_count.store(bullets as u64, Ordering::Relaxed);
        self.coin_count.store(coins as u64, Ordering::Relaxed);
        self.player_score.store(u64::from(score), Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("botfighter_ships", "Number of live ships", "gauge",
            self.ship_count.load(Ordering::Relaxed));
        metric!("botfighter_bullets", "Number of bullets in flight", "gauge",
            self.bullet_count.load(Ordering::Relaxed));
        metric!("botfighter_coins", "Number of coins on the field", "gauge",
            self.coin_count.load(Ordering::Relaxed));
        metric!("botfighter_player_score", "Current player score", "gauge",
            self.player_score.load(Ordering::Relaxed));

        metric!("botfighter_tick_time_microseconds", "Current tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("botfighter_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("botfighter_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("botfighter_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("botfighter_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));

        metric!("botfighter_states_published_total", "World states published", "counter",
            self.states_published.load(Ordering::Relaxed));
        metric!("botfighter_publish_drops_total", "Publishes dropped on backpressure", "counter",
            self.publish_drops.load(Ordering::Relaxed));
        metric!("botfighter_decision_fallbacks_total", "Remote decisions replaced by local policy", "counter",
            self.decision_fallbacks.load(Ordering::Relaxed));
        metric!("botfighter_requests_served_total", "HTTP requests served", "counter",
            self.requests_served.load(Ordering::Relaxed));
        metric!("botfighter_sessions_started_total", "Game sessions started", "counter",
            self.sessions_started.load(Ordering::Relaxed));
        metric!("botfighter_uptime_seconds", "Server uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
