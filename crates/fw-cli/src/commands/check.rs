use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use fw_engine::EngineConfig;

pub fn run(path: &Path) -> Result<(), String> {
    let world = super::load_world(path)?;
    let config = EngineConfig::from_world(&world);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Id", "Name", "Commands", "Items", "NPC", "Budget", "Unlock", "Puzzle",
    ]);
    for location in world.locations() {
        let items: Vec<&str> = location.items_present.iter().map(String::as_str).collect();
        table.add_row(vec![
            location.id.to_string(),
            location.name.clone(),
            location.available_commands.len().to_string(),
            items.join(", "),
            location.npc_present.clone().unwrap_or_default(),
            location
                .move_budget
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string()),
            location.unlock_condition.clone().unwrap_or_default(),
            if location.has_puzzle() { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{table}");
    println!();

    println!(
        "  {} {}",
        "All checks passed for".green(),
        path.display().to_string().bold()
    );
    println!(
        "  {} locations, {} items, {} npcs",
        world.location_count(),
        world.item_count(),
        world.npc_count()
    );
    println!(
        "  start: {}, win rule: {}, max moves: {}",
        config.start_location.unwrap_or_else(|| world.start_location()),
        super::describe_rule(config.win_rule),
        config
            .max_moves
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );

    Ok(())
}
