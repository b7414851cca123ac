pub mod check;
pub mod play;
pub mod simulate;

use std::path::Path;

use clap::Args;

use fw_core::World;
use fw_engine::{EngineConfig, GameStatus, WinRule};

/// Overrides for the settings stored in the world file.
#[derive(Args, Debug, Default)]
pub struct SessionArgs {
    /// Start at this location id
    #[arg(long)]
    pub start: Option<u32>,

    /// End the game after this many moves
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_moves: Option<u32>,

    /// Win by reaching this location id
    #[arg(long, conflicts_with = "win_missions")]
    pub win_location: Option<u32>,

    /// Win by completing this many NPC missions
    #[arg(long)]
    pub win_missions: Option<usize>,

    /// Coins in the purse at the start
    #[arg(long)]
    pub coins: Option<u32>,
}

impl SessionArgs {
    /// The world's own settings with these overrides applied.
    pub fn config(&self, world: &World) -> EngineConfig {
        let mut config = EngineConfig::from_world(world);
        if let Some(start) = self.start {
            config = config.with_start(start);
        }
        if let Some(moves) = self.max_moves {
            config = config.with_max_moves(moves);
        }
        if let Some(coins) = self.coins {
            config = config.with_starting_coins(coins);
        }
        if let Some(id) = self.win_location {
            config = config.with_win_rule(WinRule::ReachLocation(id));
        } else if let Some(n) = self.win_missions {
            config = config.with_win_rule(WinRule::MissionsCompleted(n));
        }
        config
    }
}

/// Load and validate a world file.
fn load_world(path: &Path) -> Result<World, String> {
    World::load(path).map_err(|e| e.to_string())
}

fn describe_rule(rule: Option<WinRule>) -> String {
    match rule {
        Some(WinRule::ReachLocation(id)) => format!("reach location {id}"),
        Some(WinRule::MissionsCompleted(n)) => format!("complete {n} missions"),
        None => "none".to_string(),
    }
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Ongoing => "ongoing",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
        GameStatus::Quit => "quit",
    }
}
