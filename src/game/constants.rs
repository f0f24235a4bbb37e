/// World and tick constants
pub mod world {
    /// World width in game units
    pub const WIDTH: f32 = 2000.0;
    /// World height in game units
    pub const HEIGHT: f32 = 2000.0;
    /// Local simulation tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Tick duration in milliseconds
    pub const TICK_DURATION_MS: u64 = 1000 / TICK_RATE as u64;
    /// Margin kept from the world edge when spawning entities
    pub const SPAWN_MARGIN: f32 = 100.0;
    /// Attempts to find a wall-free spawn position before falling back
    pub const MAX_SPAWN_ATTEMPTS: u32 = 100;
}

/// Physics constants - CRITICAL: friction is multiplicative per tick
/// (velocity *= FRICTION), and speed clamps are per-axis, not vector length.
pub mod physics {
    /// Friction factor applied to velocity each tick
    pub const FRICTION: f32 = 0.99;
    /// Per-axis speed limit for the player ship
    pub const PLAYER_MAX_SPEED: f32 = 8.0;
    /// Per-axis speed limit for enemy ships
    pub const ENEMY_MAX_SPEED: f32 = 3.0;
}

/// Ship constants
pub mod ship {
    /// Side length of the square collision box centered on the ship
    pub const BOX_SIZE: f32 = 20.0;
    /// Half extent of the collision box
    pub const HALF_BOX: f32 = BOX_SIZE / 2.0;
    /// Starting hit points
    pub const STARTING_HP: i32 = 100;
    /// Side length of the player's coin pickup box
    pub const PICKUP_BOX: f32 = 40.0;
}

/// Bullet constants
pub mod bullet {
    /// Muzzle speed in units per tick
    pub const SPEED: f32 = 15.0;
    /// Lifespan in ticks
    pub const LIFESPAN: u32 = 60;
    /// Distance ahead of the ship where a bullet spawns
    pub const MUZZLE_OFFSET: f32 = 15.0;
    /// Side length of the bullet collision box for wall checks
    pub const BOX_SIZE: f32 = 6.0;
    /// Hit radius against a ship center
    pub const HIT_RADIUS: f32 = 15.0;
    /// Damage dealt on a ship hit
    pub const DAMAGE: i32 = 10;
}

/// Coin constants
pub mod coin {
    /// Coins generated at session start
    pub const INITIAL_COUNT: usize = 20;
    /// Replenish while fewer than this many coins remain
    pub const MIN_COUNT: usize = 10;
    /// Coin box width (slightly oversized for easier collection)
    pub const BOX_WIDTH: f32 = 16.0;
    /// Coin box height
    pub const BOX_HEIGHT: f32 = 20.0;
}

/// Sensor constants
pub mod sensor {
    /// Laser ray length in game units
    pub const LASER_RANGE: f32 = 50.0;
    /// Radar detection range
    pub const RADAR_RANGE: f32 = 800.0;
    /// Below this distance a candidate is always visible (skips wall checks)
    pub const CLOSE_VISIBILITY: f32 = 30.0;
    /// Slack added around the sight line for the wall pre-filter
    pub const PREFILTER_SLACK: f32 = 20.0;
}

/// Scoring constants
pub mod score {
    /// Points for collecting a coin
    pub const COIN: u32 = 1;
    /// Points for destroying an enemy ship
    pub const ENEMY_KILL: u32 = 10;
}

/// Decision policy constants
pub mod agent {
    /// Laser distance below which wall avoidance engages
    pub const AVOID_DISTANCE: f32 = 50.0;
    /// Laser distance below which the ship stops thrusting and turns hard
    pub const AVOID_HARD_DISTANCE: f32 = 20.0;
    /// Laser distance for the redundant wall-ahead override
    pub const WALL_AHEAD_DISTANCE: f32 = 30.0;
    /// Seconds a target memory entry stays actionable
    pub const MEMORY_WINDOW: f64 = 2.0;
    /// Seconds between explore-heading changes
    pub const EXPLORE_INTERVAL: f64 = 3.0;
    /// Close-combat range: retreat while shooting
    pub const RETREAT_RANGE: f32 = 50.0;
    /// Circle-strafe range upper bound
    pub const STRAFE_RANGE: f32 = 100.0;
    /// Maximum distance at which approach-mode shooting is allowed
    pub const SHOOT_RANGE: f32 = 300.0;
    /// Seconds between stuck-detection samples
    pub const STUCK_SAMPLE_INTERVAL: f64 = 1.0;
    /// Displacement below which a sample counts as "not moving"
    pub const STUCK_THRESHOLD: f32 = 5.0;
    /// Consecutive low-displacement samples before the stuck flag sets
    pub const STUCK_SAMPLES: u32 = 3;
}

/// Networking constants
pub mod net {
    /// Minimum seconds between state publishes (10/s cap)
    pub const PUBLISH_MIN_PERIOD: f64 = 0.1;
    /// Capacity of the publish queue drained by the I/O worker
    pub const PUBLISH_QUEUE_CAPACITY: usize = 8;
    /// Timeout for decision requests in milliseconds
    pub const DECIDE_TIMEOUT_MS: u64 = 200;
    /// Timeout for wall-layout and publish requests in milliseconds
    pub const TRANSPORT_TIMEOUT_MS: u64 = 500;
}
