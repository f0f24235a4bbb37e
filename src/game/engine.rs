//! The simulation engine: owns all entities and advances one tick at a time.
//!
//! Tick ordering is fixed: player command, enemy controllers, ship
//! integration, ship collision resolution, bullet integration, bullet
//! collisions and damage, death handling, bullet pruning, coin pickup and
//! replenishment, tick counter. Sensing never reads in-progress mutation;
//! it works off the previous tick's published snapshot.

use rand::Rng;
use tracing::{debug, info};

use crate::game::constants::{bullet, coin, score};
use crate::game::geom::{normalize_heading, Rect};
use crate::game::state::{
    generate_coins, generate_valid_position, Bullet, GameState, Role, Ship, ShipId, PLAYER,
};
use crate::game::systems::patrol::{self, EnemyTuning};
use crate::game::systems::{collision, physics};
use crate::net::protocol::{Command, WorldState};
use crate::util::vec2::Vec2;

pub struct Engine {
    state: GameState,
    walls: Vec<Rect>,
    pub tuning: EnemyTuning,
}

impl Engine {
    /// Start a fresh session: one player, one enemy, a full coin field
    pub fn new<R: Rng>(walls: Vec<Rect>, rng: &mut R) -> Self {
        let player_pos = generate_valid_position(&walls, rng);
        let enemy_pos = generate_valid_position(&walls, rng);

        let state = GameState {
            ships: vec![
                Ship::new(player_pos, 0.0, Role::Player),
                Ship::new(enemy_pos, rng.gen_range(0.0..360.0), Role::Enemy),
            ],
            bullets: Vec::new(),
            coins: generate_coins(coin::INITIAL_COUNT, &walls, rng),
            score: [0, 0],
            tick: 0,
        };

        info!(
            coins = state.coins.len(),
            walls = walls.len(),
            "session started"
        );

        Self {
            state,
            walls,
            tuning: EnemyTuning::default(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    /// Add an extra ship to the live list, for load tests and benchmarks
    pub fn push_enemy(&mut self, ship: Ship) {
        self.state.ships.push(ship);
    }

    /// The session ends when the player ship is destroyed
    pub fn is_game_over(&self) -> bool {
        !self.state.player().map_or(false, Ship::is_alive)
    }

    /// Wire snapshot of the current state
    pub fn snapshot(&self) -> WorldState {
        WorldState::from(&self.state)
    }

    /// Advance the simulation one tick, applying the player's command
    pub fn tick<R: Rng>(&mut self, cmd: &Command, rng: &mut R) {
        self.apply_player_command(cmd);
        self.run_enemies(rng);
        self.move_ships();
        self.move_bullets();
        self.resolve_bullet_hits(rng);
        self.collect_coins(rng);
        self.state.tick += 1;
    }

    fn apply_player_command(&mut self, cmd: &Command) {
        let Some(player) = self.state.ships.get_mut(PLAYER) else {
            return;
        };
        if !player.is_alive() {
            return;
        }

        physics::rotate(player, cmd.rotate);
        physics::thrust(player, cmd.thrust);
        if cmd.shoot {
            let shot = spawn_bullet(player, PLAYER);
            self.state.bullets.push(shot);
        }
    }

    fn run_enemies<R: Rng>(&mut self, rng: &mut R) {
        let player_position = self
            .state
            .player()
            .filter(|p| p.is_alive())
            .map(|p| p.position);

        let mut shooters: Vec<ShipId> = Vec::new();
        for (i, ship) in self.state.ships.iter_mut().enumerate() {
            if ship.role != Role::Enemy {
                continue;
            }
            if patrol::drive(ship, player_position, &self.walls, &self.tuning, rng) {
                shooters.push(i);
            }
        }

        for i in shooters {
            let shot = spawn_bullet(&self.state.ships[i], i);
            self.state.bullets.push(shot);
        }
    }

    fn move_ships(&mut self) {
        for ship in &mut self.state.ships {
            physics::integrate(ship);
        }

        // Resolve against a post-integration snapshot so two overlapping
        // ships each push off the other's pre-resolution box.
        let snapshot = self.state.ships.clone();
        for (i, ship) in self.state.ships.iter_mut().enumerate() {
            let blockers = collision::blocker_snapshot(&self.walls, &snapshot, i);
            collision::resolve_ship(ship, &blockers);
        }
    }

    fn move_bullets(&mut self) {
        for b in &mut self.state.bullets {
            b.position += b.velocity;
            b.lifespan = b.lifespan.saturating_sub(1);
        }
    }

    fn resolve_bullet_hits<R: Rng>(&mut self, rng: &mut R) {
        let walls = &self.walls;
        let ships = &mut self.state.ships;

        self.state.bullets.retain(|b| {
            if collision::bullet_hits_wall(b, walls) {
                return false;
            }
            for (i, ship) in ships.iter_mut().enumerate() {
                if i == b.owner || !ship.is_alive() {
                    continue;
                }
                if collision::bullet_hits_ship(b, ship) {
                    ship.hp -= bullet::DAMAGE;
                    debug!(target_ship = i, hp = ship.hp, "bullet hit");
                    return false;
                }
            }
            !b.is_spent()
        });

        self.reap_dead_enemies(rng);
    }

    /// Remove destroyed enemies; each death scores for the player and spawns
    /// two replacements, so the enemy population doubles per kill.
    fn reap_dead_enemies<R: Rng>(&mut self, rng: &mut R) {
        let dead = self
            .state
            .ships
            .iter()
            .filter(|s| s.role == Role::Enemy && !s.is_alive())
            .count();
        if dead == 0 {
            return;
        }

        self.state
            .ships
            .retain(|s| s.role != Role::Enemy || s.is_alive());
        self.state.score[0] += score::ENEMY_KILL * dead as u32;

        for _ in 0..dead * 2 {
            let pos = generate_valid_position(&self.walls, rng);
            let angle = rng.gen_range(0.0..360.0);
            self.state.ships.push(Ship::new(pos, angle, Role::Enemy));
        }
        info!(
            killed = dead,
            enemies = self.state.enemy_count(),
            "enemy destroyed, reinforcements spawned"
        );
    }

    fn collect_coins<R: Rng>(&mut self, rng: &mut R) {
        let Some(player) = self.state.player().filter(|p| p.is_alive()) else {
            return;
        };
        let pickup = player.pickup_box();

        let before = self.state.coins.len();
        self.state
            .coins
            .retain(|c| !pickup.overlaps(&c.collision_box()));
        let collected = before - self.state.coins.len();
        self.state.score[0] += score::COIN * collected as u32;

        while self.state.coins.len() < coin::MIN_COUNT {
            let fresh = generate_coins(1, &self.walls, rng);
            if fresh.is_empty() {
                break;
            }
            self.state.coins.extend(fresh);
        }
    }
}

/// Spawn a bullet just ahead of the muzzle so it clears the shooter's box
fn spawn_bullet(ship: &Ship, owner: ShipId) -> Bullet {
    let muzzle = ship.position + Vec2::from_heading(ship.angle) * bullet::MUZZLE_OFFSET;
    Bullet::new(muzzle, normalize_heading(ship.angle), owner)
}
