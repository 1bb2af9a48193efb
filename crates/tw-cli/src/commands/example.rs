use std::path::Path;

use tw_simulation::Scenario;

pub fn run(output: Option<&Path>) -> Result<(), String> {
    let content = Scenario::example()
        .to_json()
        .map_err(|e| format!("JSON serialization error: {e}"))?;
    super::write_output(&content, output)
}
