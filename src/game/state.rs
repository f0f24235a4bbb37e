//! Game state definitions: ships, bullets, coins, and the labyrinth.
//!
//! Entities are index-addressed; the player ship is always index 0 and the
//! bullet `owner` field carries the shooter's index. The wall set is built
//! once per session and shared read-only afterwards.

use rand::Rng;

use crate::game::constants::{bullet, coin, ship, world};
use crate::game::geom::Rect;
use crate::game::systems::patrol::PatrolState;
use crate::util::vec2::Vec2;

/// Index of a ship in the live list
pub type ShipId = usize;

/// The player ship is always the first entry
pub const PLAYER: ShipId = 0;

/// Ship role, deciding speed limits and which controller drives it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player,
    Enemy,
}

/// A ship: position, heading, velocity, hit points, and patrol state
#[derive(Debug, Clone)]
pub struct Ship {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading in degrees, normalized to [0, 360)
    pub angle: f32,
    pub hp: i32,
    pub role: Role,
    /// Patrol controller state; only meaningful for enemies
    pub patrol: PatrolState,
}

impl Ship {
    pub fn new(position: Vec2, angle: f32, role: Role) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            angle,
            hp: ship::STARTING_HP,
            role,
            patrol: PatrolState::default(),
        }
    }

    /// Fixed-size collision box centered on the ship
    pub fn collision_box(&self) -> Rect {
        Rect::centered(self.position, ship::BOX_SIZE, ship::BOX_SIZE)
    }

    /// Oversized box used for coin pickup (player only)
    pub fn pickup_box(&self) -> Rect {
        Rect::centered(self.position, ship::PICKUP_BOX, ship::PICKUP_BOX)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// A bullet in flight
#[derive(Debug, Clone)]
pub struct Bullet {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading in degrees at fire time (carried for viewers)
    pub angle: f32,
    /// Index of the ship that fired it
    pub owner: ShipId,
    /// Remaining lifespan in ticks
    pub lifespan: u32,
}

impl Bullet {
    pub fn new(position: Vec2, angle: f32, owner: ShipId) -> Self {
        Self {
            position,
            velocity: Vec2::from_heading(angle) * bullet::SPEED,
            angle,
            owner,
            lifespan: bullet::LIFESPAN,
        }
    }

    pub fn collision_box(&self) -> Rect {
        Rect::centered(self.position, bullet::BOX_SIZE, bullet::BOX_SIZE)
    }

    /// Expired or left the world
    pub fn is_spent(&self) -> bool {
        self.lifespan == 0
            || self.position.x < 0.0
            || self.position.x > world::WIDTH
            || self.position.y < 0.0
            || self.position.y > world::HEIGHT
    }
}

/// A collectible coin
#[derive(Debug, Clone)]
pub struct Coin {
    pub position: Vec2,
}

impl Coin {
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }

    /// Slightly oversized box for easier collection
    pub fn collision_box(&self) -> Rect {
        Rect::centered(self.position, coin::BOX_WIDTH, coin::BOX_HEIGHT)
    }
}

/// All mutable simulation state, owned exclusively by the engine
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub ships: Vec<Ship>,
    pub bullets: Vec<Bullet>,
    pub coins: Vec<Coin>,
    /// [player, enemies]
    pub score: [u32; 2],
    pub tick: u64,
}

impl GameState {
    pub fn player(&self) -> Option<&Ship> {
        self.ships.get(PLAYER).filter(|s| s.role == Role::Player)
    }

    pub fn enemy_count(&self) -> usize {
        self.ships.iter().filter(|s| s.role == Role::Enemy).count()
    }
}

/// The fixed labyrinth layout: outer walls, inner structures, and dead ends
pub fn labyrinth() -> Vec<Rect> {
    vec![
        // Outer walls
        Rect::new(50.0, 50.0, 1900.0, 20.0),
        Rect::new(50.0, 50.0, 20.0, 1900.0),
        Rect::new(50.0, 1930.0, 1900.0, 20.0),
        Rect::new(1930.0, 50.0, 20.0, 1900.0),
        // Inner structures
        Rect::new(200.0, 200.0, 20.0, 400.0),
        Rect::new(200.0, 600.0, 400.0, 20.0),
        Rect::new(600.0, 200.0, 20.0, 400.0),
        Rect::new(600.0, 600.0, 400.0, 20.0),
        Rect::new(1000.0, 200.0, 20.0, 800.0),
        Rect::new(200.0, 1000.0, 800.0, 20.0),
        Rect::new(1200.0, 200.0, 20.0, 800.0),
        Rect::new(1200.0, 1000.0, 400.0, 20.0),
        Rect::new(1600.0, 200.0, 20.0, 800.0),
        Rect::new(200.0, 1400.0, 400.0, 20.0),
        Rect::new(600.0, 1400.0, 20.0, 400.0),
        Rect::new(600.0, 1800.0, 400.0, 20.0),
        Rect::new(1000.0, 1400.0, 20.0, 400.0),
        Rect::new(1200.0, 1400.0, 400.0, 20.0),
        Rect::new(1600.0, 1400.0, 20.0, 400.0),
        // Dead ends
        Rect::new(300.0, 300.0, 100.0, 20.0),
        Rect::new(1500.0, 1500.0, 100.0, 20.0),
        Rect::new(800.0, 800.0, 20.0, 100.0),
    ]
}

/// Random position whose ship-sized box clears every wall.
///
/// Falls back to one of four fixed corner positions when random placement
/// keeps landing inside walls.
pub fn generate_valid_position<R: Rng>(walls: &[Rect], rng: &mut R) -> Vec2 {
    let lo = world::SPAWN_MARGIN;
    let hi_x = world::WIDTH - world::SPAWN_MARGIN;
    let hi_y = world::HEIGHT - world::SPAWN_MARGIN;

    for _ in 0..world::MAX_SPAWN_ATTEMPTS {
        let pos = Vec2::new(rng.gen_range(lo..hi_x), rng.gen_range(lo..hi_y));
        let probe = Rect::centered(pos, ship::BOX_SIZE, ship::BOX_SIZE);
        if !walls.iter().any(|w| probe.overlaps(w)) {
            return pos;
        }
    }

    let fallbacks = [
        Vec2::new(400.0, 400.0),
        Vec2::new(1600.0, 1600.0),
        Vec2::new(400.0, 1600.0),
        Vec2::new(1600.0, 400.0),
    ];
    fallbacks[rng.gen_range(0..fallbacks.len())]
}

/// Generate up to `count` coins at valid positions; coins that cannot be
/// placed after repeated attempts are simply dropped.
pub fn generate_coins<R: Rng>(count: usize, walls: &[Rect], rng: &mut R) -> Vec<Coin> {
    let lo = world::SPAWN_MARGIN;
    let hi_x = world::WIDTH - world::SPAWN_MARGIN;
    let hi_y = world::HEIGHT - world::SPAWN_MARGIN;

    let mut coins = Vec::with_capacity(count);
    for _ in 0..count {
        for _ in 0..100 {
            let candidate = Coin::new(Vec2::new(
                rng.gen_range(lo..hi_x),
                rng.gen_range(lo..hi_y),
            ));
            if !walls.iter().any(|w| candidate.collision_box().overlaps(w)) {
                coins.push(candidate);
                break;
            }
        }
    }
    coins
}
