//! Interactive read-eval-print loop over a session.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use fw_engine::{GameStatus, Outcome, Session};

use super::SessionArgs;

pub fn run(path: &Path, args: &SessionArgs) -> Result<(), String> {
    let world = super::load_world(path)?;
    let config = args.config(&world);
    let mut session = Session::new(world, config).map_err(|e| e.to_string())?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    play(&mut session, stdin.lock(), &mut stdout).map_err(|e| format!("terminal error: {e}"))
}

fn play(session: &mut Session, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
    print_location(session, out)?;
    if session.is_over() {
        print_ending(session, out)?;
    }
    write!(out, "{} ", ">".bold())?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            write!(out, "{} ", ">".bold())?;
            out.flush()?;
            continue;
        }

        let outcome = session.dispatch(&line);
        print_outcome(&outcome, out)?;
        if session.status() == GameStatus::Quit {
            return Ok(());
        }
        if outcome.success && outcome.game_over {
            print_ending(session, out)?;
        }
        print_commands(session, out)?;
        write!(out, "{} ", ">".bold())?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_location(session: &Session, out: &mut impl Write) -> io::Result<()> {
    let Ok(view) = session.current_location_view() else {
        return Ok(());
    };
    writeln!(out, "{}", view.name.bold().underline())?;
    writeln!(out, "{}", view.text)?;
    if !view.items.is_empty() {
        writeln!(out, "You see: {}.", view.items.join(", "))?;
    }
    if let Some(npc) = &view.npc {
        writeln!(out, "{npc} is here.")?;
    }
    if let Some(puzzle) = &view.puzzle {
        writeln!(out, "Puzzle: {puzzle}")?;
    }
    print_commands(session, out)
}

fn print_commands(session: &Session, out: &mut impl Write) -> io::Result<()> {
    let Ok(view) = session.current_location_view() else {
        return Ok(());
    };
    let mut commands = vec!["look", "inventory", "score", "undo", "log", "quit"];
    commands.extend(view.available_commands.iter().map(String::as_str));
    writeln!(out, "{}", format!("Commands: {}", commands.join(", ")).dimmed())
}

fn print_outcome(outcome: &Outcome, out: &mut impl Write) -> io::Result<()> {
    if outcome.success {
        writeln!(out, "{}", outcome.message)
    } else {
        writeln!(out, "{}", outcome.message.red())
    }
}

fn print_ending(session: &Session, out: &mut impl Write) -> io::Result<()> {
    let player = session.player();
    let banner = match session.status() {
        GameStatus::Won => "*** You won! ***".green().bold(),
        GameStatus::Lost => "*** Game over ***".red().bold(),
        GameStatus::Ongoing | GameStatus::Quit => return Ok(()),
    };
    writeln!(out, "{banner}")?;
    writeln!(
        out,
        "Score {} | Coins {} | Moves {}",
        player.score, player.coins, player.moves_made
    )?;
    writeln!(
        out,
        "{}",
        "Type undo to step back or quit to leave.".dimmed()
    )
}
