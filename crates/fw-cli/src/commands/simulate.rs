use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde_json::json;

use fw_engine::{EventKind, Script, Simulation};

use super::SessionArgs;

pub fn run(
    world_path: &Path,
    script_path: &Path,
    args: &SessionArgs,
    json: bool,
    transcript: bool,
) -> Result<(), String> {
    let world = super::load_world(world_path)?;
    let text = std::fs::read_to_string(script_path)
        .map_err(|e| format!("cannot read {}: {e}", script_path.display()))?;
    let script = Script::parse(&text).map_err(|e| e.to_string())?;

    let config = args.config(&world);
    let sim = Simulation::run(world, config, &script).map_err(|e| e.to_string())?;
    let verdict = sim.verify();

    if json {
        print_json(&sim, verdict.is_ok()).map_err(|e| e.to_string())?;
    } else {
        print_report(&sim, script_path, transcript);
    }

    verdict.map_err(|e| e.to_string())
}

fn print_json(sim: &Simulation, verified: bool) -> serde_json::Result<()> {
    let session = sim.session();
    let player = session.player();
    let report = json!({
        "status": session.status(),
        "score": player.score,
        "coins": player.coins,
        "moves": player.moves_made,
        "steps_taken": session.history().steps_taken(),
        "skipped": sim.skipped(),
        "id_log": sim.id_log(),
        "verified": verified,
        "events": session.snapshot_log(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_report(sim: &Simulation, script_path: &Path, transcript: bool) {
    let session = sim.session();
    let player = session.player();

    println!(
        "  {} '{}' {}",
        "Simulation".bold(),
        script_path.display(),
        format!(
            "({} commands replayed, {} skipped)",
            sim.outcomes().len(),
            sim.skipped()
        )
        .dimmed()
    );
    println!();

    if transcript {
        println!("  {}", "Transcript".bold().underline());
        println!();
        for line in sim.transcript() {
            if line.starts_with('>') {
                println!("  {}", line.cyan());
            } else {
                println!("  {line}");
            }
        }
        println!();
    }

    println!("  {}", "Event Log".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Location", "Command", "Type", "Detail"]);
    for (index, event) in session.snapshot_log().iter().enumerate() {
        let detail = event
            .affected_item
            .clone()
            .or_else(|| event.puzzle_completed.clone())
            .or_else(|| event.mission_completed.clone())
            .unwrap_or_default();
        table.add_row(vec![
            index.to_string(),
            event.location_id.to_string(),
            event.command.clone().unwrap_or_else(|| "-".to_string()),
            colorize_kind(event.kind).to_string(),
            detail,
        ]);
    }
    println!("{table}");
    println!();

    println!(
        "  Status: {}  Score: {}  Coins: {}  Moves: {}",
        super::status_label(session.status()).bold(),
        player.score,
        player.coins,
        player.moves_made
    );
    let ids: Vec<String> = sim.id_log().iter().map(ToString::to_string).collect();
    println!("  Location log: {}", ids.join(", "));
    if sim.expected_log().is_some() {
        match sim.verify() {
            Ok(()) => println!("  {}", "Location log OK".green()),
            Err(_) => println!("  {}", "Location log MISMATCH".red().bold()),
        }
    }
}

fn colorize_kind(kind: EventKind) -> colored::ColoredString {
    let label = kind.as_str();
    match kind {
        EventKind::Start => label.dimmed(),
        EventKind::Move => label.blue(),
        EventKind::Pickup | EventKind::Drop => label.cyan(),
        EventKind::Talk => label.normal(),
        EventKind::Mission | EventKind::Puzzle => label.green().bold(),
        EventKind::Other => label.yellow(),
    }
}
