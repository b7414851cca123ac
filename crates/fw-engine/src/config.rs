//! Configuration for an adventure session.

use fw_core::{GameSettings, LocationId, World};

/// Score granted for a solved puzzle when the world does not say otherwise.
pub const DEFAULT_PUZZLE_REWARD: u32 = 10;

/// How a session is won. A session uses exactly one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinRule {
    /// Arriving at the given location.
    ReachLocation(LocationId),
    /// Completing at least this many NPC missions.
    MissionsCompleted(usize),
}

/// Configuration for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Where the player starts. `None` uses the world's start location.
    pub start_location: Option<LocationId>,
    /// The win rule. `None` means the game can only be lost or quit.
    pub win_rule: Option<WinRule>,
    /// Global ceiling on move events.
    pub max_moves: Option<u32>,
    /// Score granted per solved puzzle.
    pub puzzle_reward: u32,
    /// Coins in the purse at the start.
    pub starting_coins: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_location: None,
            win_rule: None,
            max_moves: None,
            puzzle_reward: DEFAULT_PUZZLE_REWARD,
            starting_coins: 0,
        }
    }
}

impl EngineConfig {
    /// Build a configuration from a world's document settings.
    pub fn from_settings(settings: &GameSettings) -> Self {
        let win_rule = match (settings.win_location, settings.required_missions) {
            (Some(id), _) => Some(WinRule::ReachLocation(id)),
            (None, Some(n)) => Some(WinRule::MissionsCompleted(n)),
            (None, None) => None,
        };
        Self {
            start_location: settings.start_location,
            win_rule,
            max_moves: settings.max_moves,
            puzzle_reward: settings.puzzle_reward.unwrap_or(DEFAULT_PUZZLE_REWARD),
            starting_coins: settings.starting_coins,
        }
    }

    /// Shorthand for `from_settings(world.settings())`.
    pub fn from_world(world: &World) -> Self {
        Self::from_settings(world.settings())
    }

    /// Set the start location.
    pub fn with_start(mut self, location: LocationId) -> Self {
        self.start_location = Some(location);
        self
    }

    /// Set the win rule, replacing any previous one.
    pub fn with_win_rule(mut self, rule: WinRule) -> Self {
        self.win_rule = Some(rule);
        self
    }

    /// Set the global move budget.
    pub fn with_max_moves(mut self, moves: u32) -> Self {
        self.max_moves = Some(moves);
        self
    }

    /// Set the puzzle reward.
    pub fn with_puzzle_reward(mut self, points: u32) -> Self {
        self.puzzle_reward = points;
        self
    }

    /// Set the starting coins.
    pub fn with_starting_coins(mut self, coins: u32) -> Self {
        self.starting_coins = coins;
        self
    }
}
