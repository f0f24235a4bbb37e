//! Core simulation: constants, geometry, entities, systems, engine, runner.

pub mod constants;
pub mod engine;
pub mod geom;
pub mod runner;
pub mod state;
pub mod systems;
