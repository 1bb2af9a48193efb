use std::path::Path;

use crate::WorldArgs;

pub fn run(args: &WorldArgs, ticks: u64, output: Option<&Path>) -> Result<(), String> {
    let mut sim = super::load_simulation(args)?;
    sim.run(ticks);

    let export = serde_json::json!({
        "tick": sim.current_tick(),
        "width": sim.world().width(),
        "height": sim.world().height(),
        "occupants": sim.snapshot(),
    });
    let content = serde_json::to_string_pretty(&export)
        .map_err(|e| format!("JSON serialization error: {e}"))?;
    super::write_output(&content, output)
}
