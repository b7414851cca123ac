//! Command parsing for player input.
//!
//! Parsing is independent of the world. Local commands such as `go east` or
//! `read sign` are matched against the current location by the session;
//! here they come out as [`Command::Go`] or [`Command::Other`].

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the full text of the current location.
    Look,
    /// List held items.
    Inventory,
    /// Show score, coins, and moves.
    Score,
    /// Undo the last turn.
    Undo,
    /// Show the event log.
    Log,
    /// End the session.
    Quit,
    /// Move using a local command.
    Go {
        /// Everything after the verb.
        direction: String,
    },
    /// Pick up an item at the current location.
    PickUp {
        /// The item name.
        item: String,
    },
    /// Drop a held item.
    Drop {
        /// The item name.
        item: String,
    },
    /// Talk to the NPC here.
    Talk,
    /// Buy an item from the NPC here.
    Buy {
        /// The item name.
        item: String,
    },
    /// Solve the puzzle here.
    SolvePuzzle,
    /// Use a held item's effect.
    Use {
        /// The item name.
        item: String,
    },
    /// Not a built-in command. May still be a local command.
    Other {
        /// The normalized input.
        input: String,
    },
}

impl Command {
    /// Whether this command is legal anywhere and never consults the
    /// location's command table.
    pub fn is_universal(&self) -> bool {
        matches!(
            self,
            Self::Look | Self::Inventory | Self::Score | Self::Undo | Self::Log | Self::Quit
        )
    }
}

/// Verb synonyms for command parsing.
const LOOK_VERBS: &[&str] = &["look", "l"];
const INVENTORY_VERBS: &[&str] = &["inventory", "inv", "i"];
const SCORE_VERBS: &[&str] = &["score"];
const UNDO_VERBS: &[&str] = &["undo"];
const LOG_VERBS: &[&str] = &["log", "history"];
const QUIT_VERBS: &[&str] = &["quit", "q", "exit"];
const MOVE_VERBS: &[&str] = &["go", "walk", "move"];
const TAKE_VERBS: &[&str] = &["pick", "take", "get", "grab"];
const DROP_VERBS: &[&str] = &["drop", "leave"];
const TALK_VERBS: &[&str] = &["talk", "speak", "chat"];
const BUY_VERBS: &[&str] = &["buy", "purchase"];
const USE_VERBS: &[&str] = &["use", "apply"];
const SOLVE_VERBS: &[&str] = &["solve"];

/// Normalize raw input: trimmed, lower-cased, single-spaced.
pub fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a player input string into a command.
pub fn parse_command(input: &str) -> Command {
    let input = normalize(input);
    let words: Vec<&str> = input.split(' ').filter(|w| !w.is_empty()).collect();
    let Some((&verb, rest)) = words.split_first() else {
        return Command::Other { input };
    };

    // Universal commands take no arguments, so "look at painting" stays
    // free for a local command.
    if rest.is_empty() {
        if let Some(command) = parse_universal(verb) {
            return command;
        }
    }

    if MOVE_VERBS.contains(&verb) && !rest.is_empty() {
        return Command::Go {
            direction: rest.join(" "),
        };
    }
    if TAKE_VERBS.contains(&verb) {
        if let Some(item) = object(rest, &["up"]) {
            return Command::PickUp { item };
        }
    }
    if DROP_VERBS.contains(&verb) {
        if let Some(item) = object(rest, &[]) {
            return Command::Drop { item };
        }
    }
    if TALK_VERBS.contains(&verb) && (rest.is_empty() || rest[0] == "to") {
        return Command::Talk;
    }
    if BUY_VERBS.contains(&verb) {
        if let Some(item) = object(rest, &[]) {
            return Command::Buy { item };
        }
    }
    if USE_VERBS.contains(&verb) {
        if let Some(item) = object(rest, &[]) {
            return Command::Use { item };
        }
    }
    if SOLVE_VERBS.contains(&verb) && matches!(rest, [] | ["puzzle"]) {
        return Command::SolvePuzzle;
    }

    Command::Other { input }
}

fn parse_universal(verb: &str) -> Option<Command> {
    let command = if LOOK_VERBS.contains(&verb) {
        Command::Look
    } else if INVENTORY_VERBS.contains(&verb) {
        Command::Inventory
    } else if SCORE_VERBS.contains(&verb) {
        Command::Score
    } else if UNDO_VERBS.contains(&verb) {
        Command::Undo
    } else if LOG_VERBS.contains(&verb) {
        Command::Log
    } else if QUIT_VERBS.contains(&verb) {
        Command::Quit
    } else {
        return None;
    };
    Some(command)
}

/// The object of a verb, skipping one leading particle and an article.
fn object(rest: &[&str], particles: &[&str]) -> Option<String> {
    let mut words = rest;
    if let Some((first, tail)) = words.split_first() {
        if particles.contains(first) {
            words = tail;
        }
    }
    if let Some((first, tail)) = words.split_first() {
        if matches!(*first, "the" | "a" | "an") {
            words = tail;
        }
    }
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
