pub mod example;
pub mod export;
pub mod simulate;

use std::path::Path;

use tw_core::{Cell, World};
use tw_simulation::{Scenario, SimConfig, Simulation};

use crate::WorldArgs;

/// Build the simulation described by the command-line world options.
fn load_simulation(args: &WorldArgs) -> Result<Simulation, String> {
    let config = SimConfig::default()
        .with_seed(args.seed)
        .with_corpse_ticks(args.corpse_ticks)
        .with_max_events(5000);
    let sim = match &args.scenario {
        Some(path) => Simulation::from_scenario(&read_scenario(path)?, config),
        None => Simulation::generated(args.width, args.height, config),
    };
    sim.map_err(|e| format!("cannot build world: {e}"))
}

fn read_scenario(path: &Path) -> Result<Scenario, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Scenario::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

/// Write `content` to `output`, or to stdout when no path is given.
fn write_output(content: &str, output: Option<&Path>) -> Result<(), String> {
    if let Some(path) = output {
        std::fs::write(path, content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported to {}", path.display());
    } else {
        println!("{content}");
    }
    Ok(())
}

/// One text row per grid row, one glyph per cell.
fn render_map(world: &World) -> Vec<String> {
    (0..world.height() as i32)
        .map(|y| {
            (0..world.width() as i32)
                .map(|x| match world.occupant_at(Cell::new(x, y)) {
                    Some(o) if o.is_dead() => 'x',
                    Some(o) => o.kind().glyph(),
                    None => '.',
                })
                .collect()
        })
        .collect()
}
