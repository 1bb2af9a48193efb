use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tw_core::{Background, Cell, EntityKind, Occupant};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::Simulation;

fn default_background() -> String {
    Background::default().name
}

/// A serializable description of a starting world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Terrain filling every cell not listed in `terrain`.
    #[serde(default = "default_background")]
    pub background: String,
    /// Per-cell terrain overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terrain: Vec<TerrainSpec>,
    /// Occupants placed at the start, in placement order.
    #[serde(default)]
    pub occupants: Vec<OccupantSpec>,
}

/// A terrain override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSpec {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Terrain name.
    pub background: String,
}

/// An occupant to place. Omitted stats fall back to the kind's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantSpec {
    /// Kind of occupant.
    pub kind: EntityKind,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Ticks between turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u64>,
    /// Units held at the start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<u32>,
    /// Carrying capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_limit: Option<u32>,
    /// Starting health.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<u32>,
    /// Damage per hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<u32>,
}

impl OccupantSpec {
    /// An entry with every stat left at the kind's default.
    pub fn new(kind: EntityKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            rate: None,
            resource_count: None,
            resource_limit: None,
            health: None,
            attack: None,
        }
    }

    /// Build a fresh occupant from this entry.
    pub fn to_occupant(&self) -> Occupant {
        let mut occupant = Occupant::new(self.kind, Cell::new(self.x, self.y));
        if let Some(rate) = self.rate {
            occupant = occupant.with_rate(rate);
        }
        if let Some(count) = self.resource_count {
            occupant = occupant.with_resource_count(count);
        }
        if let Some(limit) = self.resource_limit {
            occupant = occupant.with_resource_limit(limit);
        }
        if let Some(health) = self.health {
            occupant = occupant.with_health(health);
        }
        if let Some(attack) = self.attack {
            occupant = occupant.with_attack(attack);
        }
        occupant
    }
}

impl Scenario {
    /// Parse a scenario from JSON.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the scenario as pretty-printed JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A small hand-made world with two miners, a soldier, and goblins.
    pub fn example() -> Self {
        let mut occupants = vec![
            OccupantSpec::new(EntityKind::Blacksmith, 0, 0),
            OccupantSpec::new(EntityKind::MinerNotFull, 1, 2),
            OccupantSpec::new(EntityKind::MinerNotFull, 8, 6),
            OccupantSpec::new(EntityKind::Soldier, 2, 7),
            OccupantSpec::new(EntityKind::Goblin, 9, 1),
            OccupantSpec::new(EntityKind::Goblin, 7, 7),
        ];
        for (x, y) in [(4, 1), (6, 2), (5, 5), (2, 4), (9, 4)] {
            occupants.push(OccupantSpec::new(EntityKind::Ore, x, y));
        }
        for y in 1..=5 {
            occupants.push(OccupantSpec::new(EntityKind::Obstacle, 3, y));
        }
        Self {
            width: 10,
            height: 8,
            background: default_background(),
            terrain: vec![TerrainSpec {
                x: 0,
                y: 0,
                background: "rock".into(),
            }],
            occupants,
        }
    }

    /// Generate a random but reproducible world.
    ///
    /// Occupant counts scale with the area; every occupant gets its own
    /// cell.
    pub fn generate(width: u32, height: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let area = (width as usize) * (height as usize);

        let mut cells: Vec<(i32, i32)> = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| (x, y)))
            .collect();
        cells.shuffle(&mut rng);

        let counts = [
            (EntityKind::Blacksmith, rng.random_range(1..=2)),
            (EntityKind::MinerNotFull, rng.random_range(2..=4)),
            (EntityKind::Soldier, rng.random_range(1..=2)),
            (EntityKind::Goblin, rng.random_range(1..=3)),
            (EntityKind::Ore, (area / 10).max(1)),
            (EntityKind::Obstacle, area / 12),
        ];

        let mut free = cells.into_iter();
        let mut occupants = Vec::new();
        'kinds: for (kind, count) in counts {
            for _ in 0..count {
                let Some((x, y)) = free.next() else {
                    break 'kinds;
                };
                occupants.push(OccupantSpec::new(kind, x, y));
            }
        }
        debug!(width, height, seed, placed = occupants.len(), "generated scenario");

        Self {
            width,
            height,
            background: default_background(),
            terrain: Vec::new(),
            occupants,
        }
    }

    /// Build a simulation, spawning every occupant in order.
    ///
    /// Unlike the permissive kernel operations, every placement is checked:
    /// out-of-bounds cells and double occupancy are errors.
    pub fn build(&self, config: SimConfig) -> SimResult<Simulation> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::Scenario(format!(
                "world must not be empty, got {}x{}",
                self.width, self.height
            )));
        }
        let mut sim = Simulation::new(
            self.width,
            self.height,
            Background::new(self.background.clone()),
            config,
        );
        for patch in &self.terrain {
            let cell = Cell::new(patch.x, patch.y);
            if !sim.set_background(cell, Background::new(patch.background.clone())) {
                return Err(SimError::Scenario(format!(
                    "terrain {cell} is outside the {}x{} world",
                    self.width, self.height
                )));
            }
        }
        for spec in &self.occupants {
            sim.try_spawn(spec.to_occupant())?;
        }
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use tw_core::TwError;

    use super::*;

    #[test]
    fn example_builds_and_round_trips() {
        let scenario = Scenario::example();
        let json = scenario.to_json().unwrap();
        assert_eq!(Scenario::from_json(&json).unwrap(), scenario);

        let sim = scenario.build(SimConfig::default()).unwrap();
        assert_eq!(sim.world().len(), scenario.occupants.len());
        assert_eq!(
            sim.world().background_at(Cell::new(0, 0)).unwrap().name,
            "rock"
        );
        // One queued turn per mobile occupant.
        assert_eq!(sim.scheduler().len(), 5);
    }

    #[test]
    fn omitted_fields_use_defaults() {
        let scenario = Scenario::from_json(
            r#"{
                "width": 3,
                "height": 2,
                "occupants": [
                    { "kind": "miner_not_full", "x": 0, "y": 0, "rate": 7 },
                    { "kind": "goblin", "x": 2, "y": 1 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(scenario.background, "grass");

        let miner = scenario.occupants[0].to_occupant();
        assert_eq!(miner.rate, 7);
        assert_eq!(miner.resource_limit, Some(2));
        let goblin = scenario.occupants[1].to_occupant();
        assert_eq!(goblin.rate, EntityKind::Goblin.default_rate());
        assert_eq!(goblin.health, 3);
    }

    #[test]
    fn unknown_kind_is_a_json_error() {
        let err = Scenario::from_json(
            r#"{ "width": 2, "height": 2, "occupants": [{ "kind": "dragon", "x": 0, "y": 0 }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
    }

    #[test]
    fn invalid_placements_are_rejected() {
        let mut scenario = Scenario {
            width: 2,
            height: 2,
            background: default_background(),
            terrain: Vec::new(),
            occupants: vec![OccupantSpec::new(EntityKind::Ore, 2, 0)],
        };
        let err = scenario.build(SimConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::World(TwError::OutOfBounds { .. })));

        scenario.occupants = vec![
            OccupantSpec::new(EntityKind::Ore, 1, 1),
            OccupantSpec::new(EntityKind::Goblin, 1, 1),
        ];
        let err = scenario.build(SimConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::World(TwError::CellOccupied { .. })));

        scenario.occupants.clear();
        scenario.terrain.push(TerrainSpec {
            x: -1,
            y: 0,
            background: "water".into(),
        });
        assert!(matches!(
            scenario.build(SimConfig::default()),
            Err(SimError::Scenario(_))
        ));

        scenario.width = 0;
        assert!(matches!(
            scenario.build(SimConfig::default()),
            Err(SimError::Scenario(_))
        ));
    }

    #[test]
    fn generation_is_reproducible() {
        let a = Scenario::generate(12, 9, 7);
        let b = Scenario::generate(12, 9, 7);
        assert_eq!(a, b);
        assert!(a.build(SimConfig::default()).is_ok());

        let c = Scenario::generate(12, 9, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn generation_fits_tiny_worlds() {
        let scenario = Scenario::generate(2, 1, 1);
        assert!(scenario.occupants.len() <= 2);
        assert!(scenario.build(SimConfig::default()).is_ok());
    }
}
