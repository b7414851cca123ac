//! Scripted replay of a command sequence.
//!
//! A script is plain text with one command per line. Blank lines and lines
//! starting with `#` are skipped. An optional `expect:` line lists the
//! location ids the replay should visit, start event included:
//!
//! ```text
//! # walk to the library and back
//! expect: 1, 2, 1
//! go east
//! go west
//! ```

use fw_core::{LocationId, World};
use log::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::outcome::Outcome;
use crate::session::Session;

const EXPECT_PREFIX: &str = "expect:";

/// Commands to replay and the location log they should produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    /// Commands in order.
    pub commands: Vec<String>,
    /// Expected id log, if the script states one.
    pub expected_log: Option<Vec<LocationId>>,
}

impl Script {
    /// Parse a script from text.
    pub fn parse(text: &str) -> EngineResult<Self> {
        let mut script = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(ids) = strip_prefix_ignore_case(line, EXPECT_PREFIX) else {
                script.commands.push(line.to_string());
                continue;
            };
            if script.expected_log.is_some() {
                return Err(EngineError::InvalidScript {
                    line: index + 1,
                    reason: "more than one expect line".into(),
                });
            }
            script.expected_log = Some(parse_ids(ids, index + 1)?);
        }
        Ok(script)
    }

    /// Build a script from a list of commands.
    pub fn from_commands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            expected_log: None,
        }
    }

    /// Set the expected id log.
    pub fn with_expected_log(mut self, log: Vec<LocationId>) -> Self {
        self.expected_log = Some(log);
        self
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

fn parse_ids(list: &str, line: usize) -> EngineResult<Vec<LocationId>> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse().map_err(|_| EngineError::InvalidScript {
                line,
                reason: format!("\"{id}\" is not a location id"),
            })
        })
        .collect()
}

/// One replayed command and what it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The command as written in the script.
    pub command: String,
    /// The session's answer.
    pub outcome: Outcome,
}

/// A finished replay.
pub struct Simulation {
    session: Session,
    steps: Vec<Step>,
    skipped: usize,
    expected_log: Option<Vec<LocationId>>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("steps", &self.steps.len())
            .field("skipped", &self.skipped)
            .field("status", &self.session.status())
            .finish()
    }
}

impl Simulation {
    /// Replay `script` on a fresh session. Stops early once the game is
    /// over; the remaining commands are counted as skipped.
    pub fn run(world: World, config: EngineConfig, script: &Script) -> EngineResult<Self> {
        let mut session = Session::new(world, config)?;
        let mut steps = Vec::with_capacity(script.commands.len());
        for command in &script.commands {
            let outcome = session.dispatch(command);
            debug!("replayed {command:?}: success={}", outcome.success);
            let game_over = outcome.game_over;
            steps.push(Step {
                command: command.clone(),
                outcome,
            });
            if game_over {
                break;
            }
        }
        let skipped = script.commands.len() - steps.len();
        info!(
            "replayed {} commands ({} skipped), status {:?}",
            steps.len(),
            skipped,
            session.status()
        );
        Ok(Self {
            session,
            steps,
            skipped,
            expected_log: script.expected_log.clone(),
        })
    }

    /// The session in its final state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Every replayed command with its outcome.
    pub fn outcomes(&self) -> &[Step] {
        &self.steps
    }

    /// Commands not replayed because the game ended first.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// The id log the script expects, if it states one.
    pub fn expected_log(&self) -> Option<&[LocationId]> {
        self.expected_log.as_deref()
    }

    /// Location id of every event in the final history.
    pub fn id_log(&self) -> Vec<LocationId> {
        self.session.history().id_log()
    }

    /// Human-readable record of the replay: each command prefixed with `>`
    /// followed by the reply.
    pub fn transcript(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(start) = self.session.history().first() {
            lines.push(start.location_text.clone());
        }
        for step in &self.steps {
            lines.push(format!("> {}", step.command));
            lines.extend(step.outcome.message.lines().map(str::to_string));
        }
        lines
    }

    /// Check the id log against the script's expectation, if it has one.
    pub fn verify(&self) -> EngineResult<()> {
        let Some(expected) = &self.expected_log else {
            return Ok(());
        };
        let actual = self.id_log();
        if actual == *expected {
            Ok(())
        } else {
            Err(EngineError::TraceMismatch {
                expected: expected.clone(),
                actual,
            })
        }
    }
}
