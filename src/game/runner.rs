//! The 60 Hz simulation loop.
//!
//! Each iteration: decide from the previous tick's published snapshot,
//! advance the engine, publish the new snapshot, restart the session on
//! game over. Remote decisions are awaited with a bounded timeout; any
//! failure falls back to the local policy in the same iteration, so a dead
//! remote never stalls the loop.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::agent::Agent;
use crate::config::ServerConfig;
use crate::game::constants::world;
use crate::game::engine::Engine;
use crate::game::geom::Rect;
use crate::game::state::{labyrinth, PLAYER};
use crate::metrics::Metrics;
use crate::net::cache::StateCache;
use crate::net::client::{RemoteClient, StatePublisher};
use crate::net::protocol::{Command, Position, SensorRequest};
use crate::net::service::sense_against;
use crate::util::vec2::Vec2;

pub struct Runner {
    engine: Engine,
    agent: Agent,
    walls: Vec<Rect>,
    remote: Option<Arc<RemoteClient>>,
    publisher: Option<StatePublisher>,
    cache: Arc<StateCache>,
    metrics: Arc<Metrics>,
    started: Instant,
}

impl Runner {
    /// Build a runner: wall layout from the remote when available, built-in
    /// labyrinth otherwise
    pub async fn new(
        config: &ServerConfig,
        cache: Arc<StateCache>,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        let remote = match &config.remote_url {
            Some(url) => Some(Arc::new(RemoteClient::new(url.clone())?)),
            None => None,
        };

        let walls = match &remote {
            Some(client) => client.fetch_walls().await.unwrap_or_else(labyrinth),
            None => labyrinth(),
        };

        let publisher = match &config.remote_url {
            Some(url) => Some(StatePublisher::spawn(RemoteClient::new(url.clone())?)),
            None => None,
        };

        let engine = Engine::new(walls.clone(), &mut rand::thread_rng());
        metrics.sessions_started.fetch_add(1, Ordering::Relaxed);

        Ok(Self {
            engine,
            agent: Agent::new(0.0),
            walls,
            remote,
            publisher,
            cache,
            metrics,
            started: Instant::now(),
        })
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Player command for this tick, computed against the previous tick's
    /// published snapshot
    async fn decide(&mut self) -> Command {
        let Some(player) = self.engine.state().player().filter(|p| p.is_alive()) else {
            return Command::default();
        };
        let position = player.position;
        let angle = player.angle;

        let request = SensorRequest {
            ship_id: PLAYER,
            position: Position {
                x: position.x,
                y: position.y,
            },
            angle,
        };

        if let Some(remote) = &self.remote {
            if let Some(cmd) = remote.request_decision(&request).await {
                return cmd;
            }
            self.metrics.decision_fallbacks.fetch_add(1, Ordering::Relaxed);
        }

        self.local_decision(&request, position)
    }

    fn local_decision(&mut self, request: &SensorRequest, position: Vec2) -> Command {
        let sensors = sense_against(&self.cache.get(), &self.walls, request);
        self.agent
            .decide(Some(&sensors), Some(position), self.now(), &mut rand::thread_rng())
    }

    fn restart(&mut self) {
        let state = self.engine.state();
        info!(
            score = state.score[0],
            ticks = state.tick,
            enemies = state.enemy_count(),
            "game over, starting a new session"
        );
        self.engine = Engine::new(self.walls.clone(), &mut rand::thread_rng());
        self.agent = Agent::new(self.now());
        self.metrics.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Drive the simulation until the task is cancelled
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(Duration::from_millis(world::TICK_DURATION_MS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(tick_rate = world::TICK_RATE, "simulation loop started");

        loop {
            interval.tick().await;

            let command = self.decide().await;

            let tick_start = Instant::now();
            self.engine.tick(&command, &mut rand::thread_rng());
            self.metrics.record_tick_time(tick_start.elapsed());

            let snapshot = self.engine.snapshot();
            let state = self.engine.state();
            self.metrics.record_entities(
                state.ships.len(),
                state.bullets.len(),
                state.coins.len(),
                state.score[0],
            );

            // Publish locally first so the next decision senses this tick
            self.cache.set(snapshot.clone());
            if let Some(publisher) = &self.publisher {
                if publisher.publish(snapshot) {
                    self.metrics.states_published.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.metrics.publish_drops.fetch_add(1, Ordering::Relaxed);
                }
            }

            if self.engine.is_game_over() {
                self.restart();
            }
        }
    }
}

/// Spawn the runner as a background task when simulation is enabled
pub async fn spawn(
    config: &ServerConfig,
    cache: Arc<StateCache>,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    if !config.simulation_enabled {
        info!("simulation disabled, serving remote state only");
        return Ok(());
    }

    match Runner::new(config, cache, metrics).await {
        Ok(runner) => {
            tokio::spawn(runner.run());
            Ok(())
        }
        Err(err) => {
            warn!(%err, "failed to start simulation runner");
            Err(err)
        }
    }
}
