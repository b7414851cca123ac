//! Adventure session management.
//!
//! A [`Session`] owns the world, the player, and the event history, and
//! turns each input line into exactly one [`Outcome`]. Accepted commands
//! that change state append one event; rejected commands change nothing.

use fw_core::{CommandTarget, Location, LocationId, World};
use log::{debug, error, info, warn};

use crate::command::{Command, normalize, parse_command};
use crate::config::{EngineConfig, WinRule};
use crate::effect::{ItemEffect, WorldEffect};
use crate::error::{EngineError, EngineResult};
use crate::history::{Event, EventHistory, EventKind};
use crate::outcome::{EventView, GameStatus, LocationView, Outcome, TalkOutcome};
use crate::player::Player;
use crate::suggest::{BUILTIN_COMMANDS, suggest};

/// A single-player adventure session.
pub struct Session {
    world: World,
    player: Player,
    history: EventHistory,
    config: EngineConfig,
    status: GameStatus,
    /// Set by the turn that entered the current location; the view then
    /// repeats that turn's arrival text.
    just_arrived: bool,
}

impl Session {
    /// Start a session on `world`.
    ///
    /// The start location is marked visited and recorded as the first
    /// event. Fails if the configuration names a location the world lacks.
    pub fn new(mut world: World, config: EngineConfig) -> EngineResult<Self> {
        let start = config
            .start_location
            .unwrap_or_else(|| world.start_location());
        if let Some(WinRule::ReachLocation(target)) = config.win_rule {
            if world.location(target).is_none() {
                return Err(EngineError::NotFound(format!("win location {target}")));
            }
        }
        let location = world
            .location_mut(start)
            .ok_or_else(|| EngineError::NotFound(format!("start location {start}")))?;
        let text = location.arrival_text(true).to_string();
        location.visited = true;

        let player = Player::new(start, config.starting_coins);
        let mut history = EventHistory::new();
        history.append(Event::new(start, text, EventKind::Start).with_snapshot(player.clone()));
        info!("session started at location {start}");

        let mut session = Self {
            world,
            player,
            history,
            config,
            status: GameStatus::Ongoing,
            just_arrived: true,
        };
        session.status = session.evaluate();
        Ok(session)
    }

    /// Start a session configured from the world's own settings.
    pub fn from_world(world: World) -> EngineResult<Self> {
        let config = EngineConfig::from_world(&world);
        Self::new(world, config)
    }

    /// The world as it stands now.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The player state.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The event history.
    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    /// The session configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Where the game stands.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Process one line of player input.
    pub fn dispatch(&mut self, input: &str) -> Outcome {
        self.just_arrived = false;
        let input = normalize(input);
        let command = parse_command(&input);
        debug!("dispatch {input:?} as {command:?}");
        let outcome = match self.execute(&input, command) {
            Ok(outcome) => outcome,
            Err(err) => self.reject(err),
        };
        outcome.with_status(self.status)
    }

    /// Undo the most recent turn.
    pub fn undo(&mut self) -> Outcome {
        self.just_arrived = false;
        let outcome = match self.undo_turn() {
            Ok(outcome) => outcome,
            Err(err) => self.reject(err),
        };
        outcome.with_status(self.status)
    }

    /// What the player sees where they stand.
    ///
    /// Right after arriving this is the arrival text; otherwise the brief
    /// text.
    pub fn current_location_view(&self) -> EngineResult<LocationView> {
        let location = self.current_location()?;
        let text = self
            .history
            .last()
            .filter(|event| self.just_arrived && event.location_id == location.id)
            .map(|event| event.location_text.clone())
            .unwrap_or_else(|| location.arrival_text(false).to_string());
        Ok(LocationView {
            id: location.id,
            name: location.name.clone(),
            text,
            available_commands: location.available_commands.keys().cloned().collect(),
            items: location.items_present.iter().cloned().collect(),
            npc: location.npc_present.clone(),
            puzzle: self.open_puzzle(location).map(str::to_string),
        })
    }

    /// Every event so far, oldest first.
    pub fn snapshot_log(&self) -> Vec<EventView> {
        self.history.iter().map(EventView::from).collect()
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    fn execute(&mut self, input: &str, command: Command) -> EngineResult<Outcome> {
        if self.status == GameStatus::Quit {
            return Err(EngineError::InvalidCommand("The game has ended.".into()));
        }
        if command.is_universal() {
            return self.do_universal(command);
        }
        if self.status.is_over() {
            return Err(EngineError::PreconditionUnmet(
                "The game is over. You can still look around or undo.".into(),
            ));
        }

        let local = self.current_location()?.command(input).cloned();
        let mut outcome = match local {
            Some(CommandTarget::Destination(destination)) => self.do_move(input, destination)?,
            Some(CommandTarget::Action(tag)) => self.do_alias(input, &tag)?,
            None => self.do_command(input, command)?,
        };

        if let Some(ending) = self.settle() {
            outcome.message = format!("{}\n{ending}", outcome.message);
        }
        Ok(outcome)
    }

    /// Run a local command mapped to another command. Aliases do not chain.
    fn do_alias(&mut self, input: &str, tag: &str) -> EngineResult<Outcome> {
        let command = parse_command(tag);
        debug!("{input:?} is an alias for {command:?}");
        if command.is_universal() {
            return self.do_universal(command);
        }
        self.do_command(input, command)
    }

    fn do_command(&mut self, input: &str, command: Command) -> EngineResult<Outcome> {
        match command {
            Command::Go { direction } => self.do_go(input, &direction),
            Command::PickUp { item } => self.do_pickup(input, &item),
            Command::Drop { item } => self.do_drop(input, &item),
            Command::Talk => self.do_talk(input),
            Command::Buy { item } => self.do_buy(input, &item),
            Command::SolvePuzzle => self.do_solve(input),
            Command::Use { item } => self.do_use(input, &item),
            Command::Other { input } => {
                let lead = format!("I don't understand \"{input}\".");
                Err(self.unknown_command(&input, lead))
            }
            universal => self.do_universal(universal),
        }
    }

    fn do_universal(&mut self, command: Command) -> EngineResult<Outcome> {
        match command {
            Command::Look => self.do_look(),
            Command::Inventory => Ok(Outcome::accepted(self.describe_inventory())),
            Command::Score => Ok(Outcome::accepted(self.describe_score())),
            Command::Undo => self.undo_turn(),
            Command::Log => Ok(Outcome::accepted(self.history.render())),
            Command::Quit => {
                self.status = GameStatus::Quit;
                info!(
                    "player quit with score {} after {} moves",
                    self.player.score, self.player.moves_made
                );
                Ok(Outcome::accepted(format!(
                    "Goodbye! Final score: {}.",
                    self.player.score
                )))
            }
            other => Err(EngineError::InvalidCommand(format!(
                "{other:?} is not a universal command."
            ))),
        }
    }

    fn do_look(&self) -> EngineResult<Outcome> {
        let location = self.current_location()?;
        Ok(Outcome::accepted(
            self.describe(location, location.arrival_text(true)),
        ))
    }

    fn do_go(&mut self, input: &str, direction: &str) -> EngineResult<Outcome> {
        let target = self
            .current_location()?
            .command(&format!("go {direction}"))
            .cloned();
        match target {
            Some(CommandTarget::Destination(destination)) => self.do_move(input, destination),
            _ => Err(self.unknown_command(input, format!("You can't go {direction} from here."))),
        }
    }

    fn do_move(&mut self, input: &str, destination: LocationId) -> EngineResult<Outcome> {
        let location = self
            .world
            .location(destination)
            .ok_or_else(|| EngineError::NotFound(format!("location {destination}")))?;
        if let Some(required) = &location.unlock_condition {
            if !self.player.has_item(required) {
                return Err(EngineError::PreconditionUnmet(format!(
                    "The way to {} is locked. You need the {required}.",
                    location.name
                )));
            }
        }
        let text = location.arrival_text(!location.visited).to_string();

        let from = self.player.location;
        self.player.record_move(from);
        self.player.location = destination;
        if let Some(location) = self.world.location_mut(destination) {
            location.visited = true;
        }
        self.record(
            Event::new(destination, text.clone(), EventKind::Move).with_command(input),
            Vec::new(),
        );

        let location = self.current_location()?;
        let mut message = self.describe(location, &text);
        if let Some(base) = location.move_budget {
            let left = self.player.moves_left_at(location.id, base);
            message.push_str(&format!("\nYou have {left} moves to spend here."));
        }
        self.just_arrived = true;
        Ok(Outcome::accepted(message).with_event(EventKind::Move))
    }

    fn do_pickup(&mut self, input: &str, wanted: &str) -> EngineResult<Outcome> {
        let here = self.current_location()?;
        let not_here = || EngineError::PreconditionUnmet(format!("There is no {wanted} here."));
        let item = self.world.item(wanted).ok_or_else(not_here)?;
        let name = item.name.clone();
        if self.player.has_item(&name) {
            return Err(EngineError::PreconditionUnmet(format!(
                "You already have the {name}."
            )));
        }
        if !here.has_item(&name) {
            return Err(not_here());
        }
        if let Some(required) = &item.unlock_condition {
            if !self.player.has_item(required) {
                return Err(EngineError::PreconditionUnmet(format!(
                    "You need the {required} before you can take the {name}."
                )));
            }
        }

        let effect = WorldEffect::ItemRemoved {
            item: name.clone(),
            location: here.id,
        };
        self.apply(&effect)?;
        self.player.add_item(name.clone());
        let event = self.event(EventKind::Pickup, input).with_item(&name);
        self.record(event, vec![effect]);
        Ok(Outcome::accepted(format!("You pick up the {name}.")).with_event(EventKind::Pickup))
    }

    fn do_drop(&mut self, input: &str, wanted: &str) -> EngineResult<Outcome> {
        let name = self
            .held(wanted)
            .ok_or_else(|| EngineError::PreconditionUnmet(format!("You don't have {wanted}.")))?;
        let here = self.player.location;
        let effect = WorldEffect::ItemPlaced {
            item: name.clone(),
            location: here,
        };
        self.apply(&effect)?;
        self.player.remove_item(&name);

        let mut message = format!("You drop the {name}.");
        let reward = self
            .world
            .item(&name)
            .filter(|item| item.target_position == Some(here))
            .map(|item| (item.target_points, item.coins));
        if let Some((points, coins)) = reward {
            if self.player.mark_delivered(name.clone()) {
                self.player.score += points;
                self.player.coins += coins;
                info!("delivered {name} to location {here}");
                message.push_str(&format!(
                    " Delivered! You gain {points} points and {coins} coins."
                ));
            }
        }

        let event = self.event(EventKind::Drop, input).with_item(&name);
        self.record(event, vec![effect]);
        Ok(Outcome::accepted(message).with_event(EventKind::Drop))
    }

    fn do_talk(&mut self, input: &str) -> EngineResult<Outcome> {
        let npc = self
            .world
            .npc_at(self.player.location)
            .cloned()
            .ok_or_else(|| {
                EngineError::PreconditionUnmet("There is no one here to talk to.".into())
            })?;

        let pending = npc.has_mission() && !self.history.has_completed_mission(&npc.name);
        let talk = if pending && self.player.has_all(npc.mission_items.iter()) {
            for item in &npc.mission_items {
                self.player.remove_item(item);
            }
            self.player.score += npc.reward_points;
            info!("mission of {} completed", npc.name);
            TalkOutcome::MissionComplete {
                npc: npc.name.clone(),
                reward: npc.reward_points,
            }
        } else if npc.is_merchant() {
            TalkOutcome::ShopListing {
                npc: npc.name.clone(),
                wares: npc
                    .selling_items
                    .iter()
                    .map(|(item, price)| (item.clone(), *price))
                    .collect(),
            }
        } else if pending {
            TalkOutcome::MissionOffer {
                npc: npc.name.clone(),
                dialogue: npc.dialogue.clone(),
                wanted: npc.mission_items.iter().cloned().collect(),
            }
        } else {
            TalkOutcome::PlainDialogue {
                npc: npc.name.clone(),
                dialogue: npc.dialogue.clone(),
            }
        };

        let (kind, event) = if matches!(talk, TalkOutcome::MissionComplete { .. }) {
            (
                EventKind::Mission,
                self.event(EventKind::Mission, input).with_mission(&npc.name),
            )
        } else {
            (EventKind::Talk, self.event(EventKind::Talk, input))
        };
        self.record(event, Vec::new());
        Ok(Outcome::accepted(talk.message())
            .with_event(kind)
            .with_talk(talk))
    }

    fn do_buy(&mut self, input: &str, wanted: &str) -> EngineResult<Outcome> {
        let npc = self.world.npc_at(self.player.location).ok_or_else(|| {
            EngineError::PreconditionUnmet("There is no one here to buy from.".into())
        })?;
        let (name, price) = npc
            .listing(wanted)
            .map(|(name, price)| (name.to_string(), price))
            .ok_or_else(|| {
                EngineError::PreconditionUnmet(format!("{} does not sell {wanted}.", npc.name))
            })?;
        if self.player.has_item(&name) {
            return Err(EngineError::PreconditionUnmet(format!(
                "You already have the {name}."
            )));
        }
        if self.player.coins < price {
            return Err(EngineError::PreconditionUnmet(format!(
                "The {name} costs {price} coins, but you only have {}.",
                self.player.coins
            )));
        }

        let effects: Vec<WorldEffect> = self
            .world
            .item_location(&name)
            .map(|location| WorldEffect::ItemRemoved {
                item: name.clone(),
                location,
            })
            .into_iter()
            .collect();
        for effect in &effects {
            self.apply(effect)?;
        }
        self.player.coins -= price;
        self.player.add_item(name.clone());

        let event = self.event(EventKind::Other, input).with_item(&name);
        self.record(event, effects);
        Ok(
            Outcome::accepted(format!("You buy the {name} for {price} coins."))
                .with_event(EventKind::Other),
        )
    }

    fn do_solve(&mut self, input: &str) -> EngineResult<Outcome> {
        let location = self.current_location()?;
        if !location.has_puzzle() {
            return Err(EngineError::PreconditionUnmet(
                "There is no puzzle here.".into(),
            ));
        }
        if self.history.has_completed_puzzle(&location.name) {
            return Err(EngineError::PreconditionUnmet(
                "You have already solved the puzzle here.".into(),
            ));
        }
        let required = location.puzzle_requires.clone();
        if let Some(required) = &required {
            if !self.player.has_item(required) {
                return Err(EngineError::PreconditionUnmet(format!(
                    "You need the {required} to solve this puzzle."
                )));
            }
        }
        let name = location.name.clone();

        let reward = self.config.puzzle_reward;
        if let Some(required) = &required {
            self.player.remove_item(required);
        }
        self.player.score += reward;
        info!("puzzle at {name} solved");

        let mut event = self.event(EventKind::Puzzle, input).with_puzzle(&name);
        if let Some(required) = required {
            event = event.with_item(required);
        }
        self.record(event, Vec::new());
        Ok(
            Outcome::accepted(format!("You solve the puzzle! You gain {reward} points."))
                .with_event(EventKind::Puzzle),
        )
    }

    fn do_use(&mut self, input: &str, wanted: &str) -> EngineResult<Outcome> {
        let name = self
            .held(wanted)
            .ok_or_else(|| EngineError::PreconditionUnmet(format!("You don't have {wanted}.")))?;
        let effect = self
            .world
            .item(&name)
            .and_then(|item| item.effect.as_deref())
            .and_then(ItemEffect::parse)
            .ok_or_else(|| {
                EngineError::PreconditionUnmet(format!("Nothing happens when you use the {name}."))
            })?;
        let location = self.current_location()?;
        let base = location.move_budget.ok_or_else(|| {
            EngineError::PreconditionUnmet(format!(
                "The {name} has no effect at {}.",
                location.name
            ))
        })?;
        let here = location.id;

        let left = self.player.moves_left_at(here, base);
        self.player.adjust_budget(here, effect.budget_delta(left));
        self.player.remove_item(&name);
        let left = self.player.moves_left_at(here, base);
        debug!("{name} used at {here}: {left} moves left");

        let event = self.event(EventKind::Other, input).with_item(&name);
        self.record(event, Vec::new());
        Ok(Outcome::accepted(format!(
            "You use the {name}. You have {left} moves to spend here."
        ))
        .with_event(EventKind::Other))
    }

    // -----------------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------------

    fn undo_turn(&mut self) -> EngineResult<Outcome> {
        if self.status == GameStatus::Quit {
            return Err(EngineError::InvalidCommand("The game has ended.".into()));
        }
        let restore = self
            .history
            .last()
            .and_then(|event| event.prev())
            .and_then(|prev| self.history.get(prev))
            .map(|event| event.snapshot().cloned());
        let player = match restore {
            None => {
                return Err(EngineError::AlreadyAtBoundary(
                    "You cannot undo further.".into(),
                ));
            }
            Some(None) => {
                return Err(EngineError::NotFound("player snapshot".into()));
            }
            Some(Some(player)) => player,
        };

        let undone = self.history.undo_last()?;
        for effect in undone.removed.effects().iter().rev() {
            if !effect.revert(&mut self.world) {
                warn!("could not revert {effect:?}");
            }
        }
        self.player = player;
        self.status = self.evaluate();

        let command = undone.removed.command.as_deref().unwrap_or("-");
        info!("undid {} ({command})", undone.removed.kind);
        let location = self.current_location()?;
        Ok(Outcome::accepted(format!(
            "Undid \"{command}\".\n{}",
            self.describe(location, location.arrival_text(false))
        )))
    }

    // -----------------------------------------------------------------------
    // Win and loss
    // -----------------------------------------------------------------------

    fn evaluate(&self) -> GameStatus {
        if self.status == GameStatus::Quit {
            GameStatus::Quit
        } else if self.is_won() {
            GameStatus::Won
        } else if self.loss_reason().is_some() {
            GameStatus::Lost
        } else {
            GameStatus::Ongoing
        }
    }

    /// Re-evaluate the status; returns the closing message if the game
    /// just ended.
    fn settle(&mut self) -> Option<String> {
        let before = self.status;
        self.status = self.evaluate();
        if before == self.status {
            return None;
        }
        match self.status {
            GameStatus::Won => {
                info!(
                    "game won with score {} after {} moves",
                    self.player.score, self.player.moves_made
                );
                Some(format!("You won! Final score: {}.", self.player.score))
            }
            GameStatus::Lost => {
                let reason = self.loss_reason().unwrap_or_default();
                info!("game lost: {reason}");
                Some(format!("{reason} Game over."))
            }
            GameStatus::Ongoing | GameStatus::Quit => None,
        }
    }

    fn is_won(&self) -> bool {
        match self.config.win_rule {
            Some(WinRule::ReachLocation(target)) => self.player.location == target,
            Some(WinRule::MissionsCompleted(required)) => {
                self.history.completed_missions().len() >= required
            }
            None => false,
        }
    }

    fn loss_reason(&self) -> Option<String> {
        for (&id, &spent) in &self.player.moves_from {
            let Some(location) = self.world.location(id) else {
                continue;
            };
            let Some(base) = location.move_budget else {
                continue;
            };
            let resolved =
                location.has_puzzle() && self.history.has_completed_puzzle(&location.name);
            if !resolved && spent > self.player.effective_budget(id, base) {
                return Some(format!("You spent too many moves at {}.", location.name));
            }
        }
        match self.config.max_moves {
            Some(max) if self.player.moves_made >= max => Some("You ran out of moves.".into()),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn current_location(&self) -> EngineResult<&Location> {
        self.world
            .location(self.player.location)
            .ok_or_else(|| EngineError::NotFound(format!("location {}", self.player.location)))
    }

    /// Canonical name of a held item.
    fn held(&self, wanted: &str) -> Option<String> {
        self.player
            .inventory
            .iter()
            .find(|item| item.eq_ignore_ascii_case(wanted.trim()))
            .cloned()
    }

    fn open_puzzle<'a>(&self, location: &'a Location) -> Option<&'a str> {
        location
            .puzzle_text
            .as_deref()
            .filter(|_| !self.history.has_completed_puzzle(&location.name))
    }

    fn apply(&mut self, effect: &WorldEffect) -> EngineResult<()> {
        if effect.apply(&mut self.world) {
            Ok(())
        } else {
            Err(EngineError::NotFound(format!("world state for {effect:?}")))
        }
    }

    /// An event at the current location showing its brief text.
    fn event(&self, kind: EventKind, input: &str) -> Event {
        let text = self
            .world
            .location(self.player.location)
            .map(|location| location.arrival_text(false).to_string())
            .unwrap_or_default();
        Event::new(self.player.location, text, kind).with_command(input)
    }

    fn record(&mut self, event: Event, effects: Vec<WorldEffect>) {
        let event = event
            .with_snapshot(self.player.clone())
            .with_effects(effects);
        self.history.append(event);
    }

    fn reject(&self, err: EngineError) -> Outcome {
        match &err {
            EngineError::NotFound(what) => error!("data integrity: {what} not found"),
            _ => debug!("rejected: {err}"),
        }
        Outcome::rejected(&err)
    }

    fn unknown_command(&self, input: &str, lead: String) -> EngineError {
        if input.is_empty() {
            return EngineError::InvalidCommand("Please enter a command.".into());
        }
        let local: Vec<&str> = self
            .world
            .location(self.player.location)
            .map(|location| {
                location
                    .available_commands
                    .keys()
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default();
        let hints = suggest(
            input,
            local.into_iter().chain(BUILTIN_COMMANDS.iter().copied()),
            3,
        );
        let mut message = lead;
        if !hints.is_empty() {
            message.push_str(&format!(" Did you mean: {}?", hints.join(", ")));
        }
        EngineError::InvalidCommand(message)
    }

    fn describe(&self, location: &Location, text: &str) -> String {
        let mut output = format!("{}\n{text}", location.name);
        if !location.items_present.is_empty() {
            let items: Vec<&str> = location.items_present.iter().map(String::as_str).collect();
            output.push_str(&format!("\nYou see: {}.", items.join(", ")));
        }
        if let Some(npc) = &location.npc_present {
            output.push_str(&format!("\n{npc} is here."));
        }
        if let Some(puzzle) = self.open_puzzle(location) {
            output.push_str(&format!("\nPuzzle: {puzzle}"));
        }
        output
    }

    fn describe_inventory(&self) -> String {
        if self.player.inventory.is_empty() {
            "You are not carrying anything.".to_string()
        } else {
            format!("You are carrying: {}.", self.player.inventory.join(", "))
        }
    }

    fn describe_score(&self) -> String {
        let moves = match self.config.max_moves {
            Some(max) => format!("{}/{max}", self.player.moves_made),
            None => self.player.moves_made.to_string(),
        };
        format!(
            "Score: {}, Coins: {}, Moves: {moves}",
            self.player.score, self.player.coins
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const WORLD: &str = r#"{
        "locations": [
            {
                "id": 1,
                "name": "Quad",
                "brief_text": "The quad.",
                "long_text": "A wide grassy quad.",
                "available_commands": { "go east": 2, "go north": 3, "read sign": "look" }
            },
            {
                "id": 2,
                "name": "Library",
                "brief_text": "The library.",
                "long_text": "Rows of dusty shelves.",
                "available_commands": { "go west": 1 },
                "puzzle_text": "A locked cabinet.",
                "puzzle_requires": "Key"
            },
            {
                "id": 3,
                "name": "Lab",
                "brief_text": "The lab.",
                "long_text": "Humming machines.",
                "available_commands": { "go south": 1, "go up": 4 },
                "unlock_condition": "TCard",
                "move_budget": 1
            },
            {
                "id": 4,
                "name": "Roof",
                "brief_text": "The roof.",
                "available_commands": { "go down": 3 }
            }
        ],
        "items": [
            { "name": "TCard", "start_position": 1 },
            { "name": "Key", "start_position": 2 },
            { "name": "Notebook", "start_position": 2, "target_position": 1, "target_points": 5, "coins": 3 },
            { "name": "Energy Drink", "start_position": 4, "effect": "step-modifier:2" },
            { "name": "Badge", "start_position": 1, "unlock_condition": "TCard" }
        ],
        "npcs": [
            {
                "name": "Librarian",
                "location": 2,
                "dialogue": "Shh.",
                "mission_items": ["Notebook"],
                "reward_points": 10
            },
            {
                "name": "Vendor",
                "location": 4,
                "selling_items": { "Energy Drink": 2 }
            }
        ]
    }"#;

    fn session() -> Session {
        Session::new(World::from_json(WORLD).unwrap(), EngineConfig::default()).unwrap()
    }

    fn run(session: &mut Session, commands: &[&str]) {
        for command in commands {
            let outcome = session.dispatch(command);
            assert!(outcome.success, "{command}: {}", outcome.message);
        }
    }

    #[test]
    fn new_session_records_start() {
        let session = session();
        assert_eq!(session.player().location, 1);
        assert_eq!(session.history().len(), 1);
        let first = session.history().first().unwrap();
        assert_eq!(first.kind, EventKind::Start);
        assert!(first.command.is_none());
        assert_eq!(first.location_text, "A wide grassy quad.");
        assert!(session.world().location(1).unwrap().visited);
    }

    #[test]
    fn bad_start_location_is_rejected() {
        let world = World::from_json(WORLD).unwrap();
        let result = Session::new(world, EngineConfig::default().with_start(99));
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn go_east_and_back() {
        let mut session = session();
        run(&mut session, &["go east", "go west"]);
        assert_eq!(session.player().location, 1);
        assert_eq!(session.history().steps_taken(), 2);
        assert_eq!(session.history().id_log(), vec![1, 2, 1]);
        assert_eq!(session.history().last().unwrap().arrived_from(), Some(2));
    }

    #[test]
    fn long_text_only_on_first_visit() {
        let mut session = session();
        let first = session.dispatch("go east");
        assert!(first.message.contains("Rows of dusty shelves."));
        session.dispatch("go west");
        let second = session.dispatch("go east");
        assert!(second.message.contains("The library."));
        assert!(!second.message.contains("Rows of dusty shelves."));
        let view = session.current_location_view().unwrap();
        assert_eq!(view.text, "The library.");
    }

    #[test]
    fn unknown_command_changes_nothing() {
        let mut session = session();
        let outcome = session.dispatch("go eats");
        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(ErrorKind::InvalidCommand));
        assert!(outcome.message.contains("go east"));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn locked_location_needs_item() {
        let mut session = session();
        let outcome = session.dispatch("go north");
        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(ErrorKind::PreconditionUnmet));
        assert_eq!(session.player().location, 1);
        assert_eq!(session.player().moves_made, 0);

        run(&mut session, &["pick up tcard", "go north"]);
        assert_eq!(session.player().location, 3);
    }

    #[test]
    fn pickup_moves_item_once() {
        let mut session = session();
        let outcome = session.dispatch("pick up TCard");
        assert!(outcome.success);
        assert_eq!(outcome.event, Some(EventKind::Pickup));
        assert!(!session.world().location(1).unwrap().has_item("TCard"));
        assert_eq!(session.player().inventory, vec!["TCard".to_string()]);

        let again = session.dispatch("pick up tcard");
        assert!(!again.success);
        assert_eq!(session.player().inventory.len(), 1);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn pickup_respects_item_unlock() {
        let mut session = session();
        assert!(!session.dispatch("pick up badge").success);
        run(&mut session, &["pick up tcard", "pick up badge"]);
        assert!(session.player().has_item("Badge"));
    }

    #[test]
    fn missing_item_is_a_precondition() {
        let mut session = session();
        let outcome = session.dispatch("pick up sword");
        assert_eq!(outcome.error, Some(ErrorKind::PreconditionUnmet));
        let outcome = session.dispatch("drop sword");
        assert_eq!(outcome.error, Some(ErrorKind::PreconditionUnmet));
    }

    #[test]
    fn delivery_pays_once() {
        let mut session = session();
        run(
            &mut session,
            &["go east", "pick up notebook", "go west", "drop notebook"],
        );
        assert_eq!(session.player().score, 5);
        assert_eq!(session.player().coins, 3);
        run(&mut session, &["pick up notebook", "drop notebook"]);
        assert_eq!(session.player().score, 5);
        assert_eq!(session.player().coins, 3);
    }

    #[test]
    fn mission_reward_granted_once() {
        let mut session = session();
        run(&mut session, &["go east", "talk"]);
        let offer = session.dispatch("talk");
        assert!(matches!(offer.talk, Some(TalkOutcome::MissionOffer { .. })));
        assert_eq!(offer.event, Some(EventKind::Talk));

        let done = session.dispatch("pick up notebook");
        assert!(done.success);
        let complete = session.dispatch("talk");
        assert!(matches!(
            complete.talk,
            Some(TalkOutcome::MissionComplete { reward: 10, .. })
        ));
        assert_eq!(complete.event, Some(EventKind::Mission));
        assert_eq!(session.player().score, 10);
        assert!(!session.player().has_item("Notebook"));

        let after = session.dispatch("talk");
        assert!(matches!(after.talk, Some(TalkOutcome::PlainDialogue { .. })));
        assert_eq!(session.player().score, 10);
        assert_eq!(session.history().completed_missions().len(), 1);
    }

    #[test]
    fn talk_without_npc_is_rejected() {
        let mut session = session();
        let outcome = session.dispatch("talk");
        assert!(!outcome.success);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn buy_debits_coins() {
        let world = World::from_json(WORLD).unwrap();
        let config = EngineConfig::default().with_starting_coins(3);
        let mut session = Session::new(world, config).unwrap();
        run(&mut session, &["pick up tcard", "go north", "go up", "talk"]);

        let bought = session.dispatch("buy energy drink");
        assert!(bought.success, "{}", bought.message);
        assert_eq!(session.player().coins, 1);
        assert!(session.player().has_item("Energy Drink"));

        let again = session.dispatch("buy energy drink");
        assert!(!again.success);
    }

    #[test]
    fn buy_without_coins_is_rejected() {
        let mut session = session();
        run(&mut session, &["pick up tcard", "go north", "go up"]);
        let outcome = session.dispatch("buy energy drink");
        assert_eq!(outcome.error, Some(ErrorKind::PreconditionUnmet));
        assert!(!session.player().has_item("Energy Drink"));
    }

    #[test]
    fn puzzle_solved_once() {
        let mut session = session();
        run(&mut session, &["go east"]);
        assert!(!session.dispatch("solve puzzle").success);
        run(&mut session, &["pick up key", "solve puzzle"]);
        assert_eq!(session.player().score, 10);
        assert!(!session.player().has_item("Key"));
        assert_eq!(session.history().completed_puzzles(), ["Library".to_string()]);
        assert!(!session.dispatch("solve puzzle").success);
    }

    #[test]
    fn action_alias_runs_target_command() {
        let mut session = session();
        let outcome = session.dispatch("read sign");
        assert!(outcome.success);
        assert!(outcome.message.contains("A wide grassy quad."));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn exceeding_location_budget_loses() {
        let mut session = session();
        run(&mut session, &["pick up tcard", "go north", "go up"]);
        assert!(!session.is_over());
        let outcome = session.dispatch("go down");
        assert!(outcome.success);
        assert!(!outcome.game_over);
        let outcome = session.dispatch("go south");
        assert!(outcome.game_over);
        assert!(!outcome.won);
        assert_eq!(session.status(), GameStatus::Lost);

        let blocked = session.dispatch("go east");
        assert!(!blocked.success);
        assert!(blocked.game_over);
    }

    #[test]
    fn step_modifier_extends_budget() {
        let world = World::from_json(WORLD).unwrap();
        let config = EngineConfig::default().with_starting_coins(2);
        let mut session = Session::new(world, config).unwrap();
        run(
            &mut session,
            &["pick up tcard", "go north", "go up", "buy energy drink", "go down"],
        );
        // One move spent at the lab; the drink adds two more.
        run(&mut session, &["use energy drink", "go up", "go down", "go south"]);
        assert_eq!(session.status(), GameStatus::Ongoing);
    }

    #[test]
    fn use_without_effect_is_rejected() {
        let mut session = session();
        run(&mut session, &["pick up tcard"]);
        let outcome = session.dispatch("use tcard");
        assert_eq!(outcome.error, Some(ErrorKind::PreconditionUnmet));
        assert!(session.player().has_item("TCard"));
    }

    #[test]
    fn reaching_win_location_wins() {
        let world = World::from_json(WORLD).unwrap();
        let config = EngineConfig::default().with_win_rule(WinRule::ReachLocation(2));
        let mut session = Session::new(world, config).unwrap();
        let outcome = session.dispatch("go east");
        assert!(outcome.game_over);
        assert!(outcome.won);
        assert!(outcome.message.contains("You won!"));
    }

    #[test]
    fn mission_rule_wins() {
        let world = World::from_json(WORLD).unwrap();
        let config = EngineConfig::default().with_win_rule(WinRule::MissionsCompleted(1));
        let mut session = Session::new(world, config).unwrap();
        run(&mut session, &["go east", "pick up notebook"]);
        let outcome = session.dispatch("talk");
        assert!(outcome.won);
    }

    #[test]
    fn global_budget_exhausted_loses() {
        let world = World::from_json(WORLD).unwrap();
        let config = EngineConfig::default().with_max_moves(2);
        let mut session = Session::new(world, config).unwrap();
        run(&mut session, &["go east"]);
        let outcome = session.dispatch("go west");
        assert!(outcome.game_over);
        assert!(!outcome.won);
        assert!(outcome.message.contains("You ran out of moves."));
    }

    #[test]
    fn undo_restores_previous_turn() {
        let mut session = session();
        run(&mut session, &["go east", "pick up notebook"]);
        assert!(!session.world().location(2).unwrap().has_item("Notebook"));

        let outcome = session.undo();
        assert!(outcome.success);
        assert!(session.world().location(2).unwrap().has_item("Notebook"));
        assert!(session.player().inventory.is_empty());
        assert_eq!(session.player().location, 2);

        let outcome = session.dispatch("undo");
        assert!(outcome.success);
        assert_eq!(session.player().location, 1);
        assert_eq!(session.player().moves_made, 0);
        assert_eq!(session.history().steps_taken(), 0);
        assert!(session.world().location(2).unwrap().visited);
    }

    #[test]
    fn view_after_undo_shows_brief_text() {
        let mut session = session();
        assert_eq!(
            session.current_location_view().unwrap().text,
            "A wide grassy quad."
        );
        run(&mut session, &["go east"]);
        assert_eq!(
            session.current_location_view().unwrap().text,
            "Rows of dusty shelves."
        );
        session.undo();
        assert_eq!(session.current_location_view().unwrap().text, "The quad.");
        run(&mut session, &["go east", "undo"]);
        assert_eq!(session.current_location_view().unwrap().text, "The quad.");
    }

    #[test]
    fn undo_reverses_purchase() {
        let world = World::from_json(WORLD).unwrap();
        let config = EngineConfig::default().with_starting_coins(3);
        let mut session = Session::new(world, config).unwrap();
        run(&mut session, &["pick up tcard", "go north", "go up", "buy energy drink"]);
        assert_eq!(session.player().coins, 1);
        assert!(!session.world().location(4).unwrap().has_item("Energy Drink"));

        assert!(session.undo().success);
        assert_eq!(session.player().coins, 3);
        assert!(!session.player().has_item("Energy Drink"));
        assert!(session.world().location(4).unwrap().has_item("Energy Drink"));
        assert_eq!(session.history().last().unwrap().kind, EventKind::Move);
    }

    #[test]
    fn undo_reverses_delivery() {
        let mut session = session();
        run(
            &mut session,
            &["go east", "pick up notebook", "go west", "drop notebook"],
        );
        assert_eq!(session.player().score, 5);
        assert!(session.player().delivered.contains("Notebook"));

        assert!(session.undo().success);
        assert_eq!(session.player().score, 0);
        assert_eq!(session.player().coins, 0);
        assert!(session.player().delivered.is_empty());
        assert!(session.player().has_item("Notebook"));
        assert!(!session.world().location(1).unwrap().has_item("Notebook"));

        run(&mut session, &["drop notebook"]);
        assert_eq!(session.player().score, 5);
        assert_eq!(session.player().coins, 3);
    }

    #[test]
    fn undo_reverses_puzzle() {
        let mut session = session();
        run(&mut session, &["go east", "pick up key", "solve puzzle"]);
        assert_eq!(session.player().score, 10);

        assert!(session.undo().success);
        assert_eq!(session.player().score, 0);
        assert!(session.player().has_item("Key"));
        assert!(session.history().completed_puzzles().is_empty());
        assert_eq!(
            session.current_location_view().unwrap().puzzle.as_deref(),
            Some("A locked cabinet.")
        );

        run(&mut session, &["solve puzzle"]);
        assert_eq!(session.history().completed_puzzles(), ["Library".to_string()]);
    }

    #[test]
    fn undo_reverses_item_use() {
        let world = World::from_json(WORLD).unwrap();
        let config = EngineConfig::default().with_starting_coins(2);
        let mut session = Session::new(world, config).unwrap();
        run(
            &mut session,
            &["pick up tcard", "go north", "go up", "buy energy drink", "go down", "use energy drink"],
        );
        assert_eq!(session.player().budget_adjustments.get(&3), Some(&2));

        assert!(session.undo().success);
        assert!(session.player().budget_adjustments.is_empty());
        assert!(session.player().has_item("Energy Drink"));
        // Back to the bare budget of one move, already spent.
        let outcome = session.dispatch("go up");
        assert!(outcome.game_over);
        assert!(!outcome.won);
    }

    #[test]
    fn undo_at_start_is_a_boundary() {
        let mut session = session();
        let outcome = session.undo();
        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(ErrorKind::AlreadyAtBoundary));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn undo_reopens_lost_game() {
        let world = World::from_json(WORLD).unwrap();
        let config = EngineConfig::default().with_max_moves(1);
        let mut session = Session::new(world, config).unwrap();
        assert!(session.dispatch("go east").game_over);
        let outcome = session.undo();
        assert!(!outcome.game_over);
        assert_eq!(session.status(), GameStatus::Ongoing);
    }

    #[test]
    fn undo_reverses_mission() {
        let mut session = session();
        run(&mut session, &["go east", "pick up notebook", "talk"]);
        assert_eq!(session.player().score, 10);
        session.undo();
        assert_eq!(session.player().score, 0);
        assert!(session.player().has_item("Notebook"));
        assert!(session.history().completed_missions().is_empty());
    }

    #[test]
    fn quit_ends_session() {
        let mut session = session();
        let outcome = session.dispatch("quit");
        assert!(outcome.success);
        assert!(outcome.game_over);
        assert!(!outcome.won);
        assert!(!session.dispatch("look").success);
        assert!(!session.undo().success);
    }

    #[test]
    fn universal_commands_append_nothing() {
        let mut session = session();
        run(&mut session, &["look", "inventory", "score", "log"]);
        assert_eq!(session.history().len(), 1);
        let score = session.dispatch("score");
        assert_eq!(score.message, "Score: 0, Coins: 0, Moves: 0");
    }

    #[test]
    fn snapshot_log_matches_history() {
        let mut session = session();
        run(&mut session, &["go east", "pick up key"]);
        let log = session.snapshot_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log[1].command.as_deref(), Some("go east"));
        assert_eq!(log[2].affected_item.as_deref(), Some("Key"));
        assert_eq!(log[2].kind, EventKind::Pickup);
    }
}
