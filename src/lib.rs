//! BotFighter server: a labyrinth arena shooter with a sensor-driven agent.
//!
//! The crate hosts both halves of the system: the tick-driven simulation
//! (physics, collisions, sensors, enemy patrol, decision policy) and the
//! JSON-over-HTTP contracts that shuttle state and decisions between
//! processes.

pub mod agent;
pub mod config;
pub mod game;
pub mod metrics;
pub mod net;
pub mod util;
