use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use tw_core::{EntityKind, Positioned};
use tw_simulation::{BehaviorState, SimEventKind};

use crate::WorldArgs;

pub fn run(args: &WorldArgs, ticks: u64, verbose: bool, map: bool) -> Result<(), String> {
    let mut sim = super::load_simulation(args)?;
    let initial = sim.world().len();
    sim.run(ticks);

    // Header
    let world = sim.world();
    let source = match &args.scenario {
        Some(path) => path.display().to_string(),
        None => format!("generated, seed={}", args.seed),
    };
    println!(
        "  {} {}x{} {}",
        "Simulation".bold(),
        world.width(),
        world.height(),
        format!("({ticks} ticks, {source})").dimmed()
    );
    println!(
        "  {} occupants at start, {} now, {} events logged",
        initial,
        world.len(),
        sim.events().len()
    );
    let delivered: u32 = world
        .occupants()
        .filter(|o| o.kind() == EntityKind::Blacksmith)
        .map(|o| o.resource_count)
        .sum();
    println!(
        "  {} ore left, {} delivered to blacksmiths",
        world.count_of(EntityKind::Ore),
        delivered
    );
    println!();

    // Events
    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let tick_label = format!("[tick {:>3}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = sim
            .events()
            .events()
            .iter()
            .filter(|e| e.kind.is_notable())
            .collect();
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                let label = match event.kind {
                    SimEventKind::EntityDied { .. } => "DEATH".red().bold(),
                    SimEventKind::Transformed { .. } => "  NEW".cyan().bold(),
                    SimEventKind::Removed { .. } => " GONE".dimmed(),
                    _ => " INFO".normal(),
                };
                println!("  {label}  [tick {:>3}] {}", event.tick, event.description);
            }
            println!();
        }
    }

    // Occupant status table
    println!("  {}", "Occupant Status".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Kind", "State", "Cell", "Load", "Health"]);

    for occupant in world.occupants().filter(|o| o.is_mobile() || o.is_dead()) {
        let load = match occupant.resource_limit {
            Some(limit) => format!("{}/{limit}", occupant.resource_count),
            None => "--".to_string(),
        };
        table.add_row(vec![
            occupant.id().to_string(),
            occupant.kind().to_string(),
            format_state(BehaviorState::of(occupant)),
            occupant.cell().to_string(),
            load,
            occupant.health.to_string(),
        ]);
    }

    println!("{table}");
    println!();

    if map {
        println!("  {}", "Map".bold().underline());
        println!();
        for row in super::render_map(world) {
            println!("  {row}");
        }
        println!();
    }

    Ok(())
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::EntityDied { .. } => description.red().bold(),
        SimEventKind::Attacked { .. } => description.red(),
        SimEventKind::Gathered { .. } => description.yellow(),
        SimEventKind::Deposited { .. } => description.green(),
        SimEventKind::Transformed { .. } => description.cyan(),
        SimEventKind::Moved { .. } => description.blue(),
        SimEventKind::Spawned { .. } | SimEventKind::Removed { .. } => description.normal(),
    }
}

fn format_state(state: BehaviorState) -> String {
    match state {
        BehaviorState::Dead => state.to_string().red().to_string(),
        BehaviorState::Full => state.to_string().green().to_string(),
        _ => state.to_string(),
    }
}
