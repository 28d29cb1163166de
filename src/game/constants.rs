/// Arena geometry constants
pub mod arena {
    /// Side length of the square arena
    pub const SIZE: f32 = 600.0;
}

/// Player/agent constants
pub mod player {
    /// Players per team
    pub const PER_TEAM: usize = 4;
    /// Firing range. Also the margin kept from every arena wall.
    pub const RANGE: f32 = 50.0;
    /// Distance travelled per tick while exploring
    pub const SPEED: f32 = 5.0;
    /// Probability per tick that an exploring player changes heading
    pub const RANDOMNESS: f32 = 0.2;
    /// Largest heading change in one random turn (120 degrees)
    pub const MAX_CHANGE_DIRECTION: f32 = 120.0 / 180.0 * std::f32::consts::PI;
    /// Health every player spawns with
    pub const INITIAL_HEALTH: i32 = 100;
    /// Assist radius as a multiple of the firing range at full collaboration
    pub const ASSIST_RANGE_FACTOR: f32 = 5.0;
}

/// Combat resolution constants
pub mod combat {
    /// Chance that a shot hits
    pub const HIT_PROBABILITY: f32 = 0.5;
    /// Health removed by one hit
    pub const HIT_HEALTH_COST: i32 = 2;
}

/// Tournament/scheduling constants
pub mod tournament {
    /// Games played in a tournament
    pub const TOTAL_GAMES: u32 = 100;
    /// Simulation speed. Tick interval is `TICK_BASE_MS / GAME_SPEED`.
    pub const GAME_SPEED: u32 = 15;
    /// Base tick interval at speed 1, in milliseconds
    pub const TICK_BASE_MS: u64 = 300;
    /// Game time limit in milliseconds
    pub const GAME_LENGTH_MS: u64 = 20_000;
    /// Pause between games in milliseconds
    pub const INTER_GAME_DELAY_MS: u64 = 1_000;
    /// Default collaboration per team
    pub const COLLABORATION: [f32; 2] = [1.0, 0.0];
}

/// Team presentation defaults
pub mod teams {
    pub const NAMES: [&str; 2] = ["amused", "sportsbet"];
    pub const COLORS: [&str; 2] = ["rgb(10, 120, 76)", "rgb(255, 0, 0)"];
}

/// Result reasons shown in the result feed
pub mod reasons {
    pub const ELIMINATION: &str = "by killing everyone!";
    pub const TIMEOUT: &str = "on timeout";
}
