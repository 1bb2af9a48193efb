//! Integration tests for the simulation flow.
use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use tw_core::{
    Background, Cell, EntityId, EntityKind, Occupant, Positioned, RemovalListener,
    ResourceBearing,
};
use tw_simulation::{Action, BehaviorState, Scenario, SimConfig, SimEventKind, Simulation};

fn corridor(width: u32) -> Simulation {
    Simulation::new(width, 1, Background::default(), SimConfig::default())
}

fn count(sim: &Simulation, pred: impl Fn(&SimEventKind) -> bool) -> usize {
    sim.events().events().iter().filter(|e| pred(&e.kind)).count()
}

#[derive(Debug)]
struct Recorder(Rc<RefCell<Vec<EntityId>>>);

impl RemovalListener for Recorder {
    fn removed_from_world(&mut self, occupant: &Occupant) {
        self.0.borrow_mut().push(occupant.id());
    }
}

#[test]
fn transform_cancels_every_pending_action() {
    let mut sim = corridor(3);
    let miner = Occupant::new(EntityKind::MinerNotFull, Cell::new(0, 0))
        .with_rate(2)
        .with_resource_limit(1);
    let id = miner.id();
    let first = sim.spawn(miner).unwrap();
    // A second, far-off turn that only the transform can withdraw.
    let extra = sim.schedule_at(Action::behave(id), 50);
    sim.add_occupant(Occupant::new(EntityKind::Ore, Cell::new(1, 0)));

    sim.advance_to(2);

    let full = sim.world().occupant(id).unwrap();
    assert_eq!(full.kind(), EntityKind::MinerFull);
    assert_eq!(full.resource_count(), 1);
    assert!(!sim.scheduler().contains(first));
    assert!(!sim.scheduler().contains(extra));

    let pending = full.pending_actions().to_vec();
    assert_eq!(pending.len(), 1);
    assert_eq!(sim.scheduler().len(), 1);
    assert_eq!(sim.scheduler().tick_of(pending[0]), Some(4));

    sim.advance_to(60);
    assert!(!sim.scheduler().contains(extra));
    assert_eq!(sim.scheduler().len(), 1);
}

#[test]
fn miner_gathers_delivers_and_starts_over() {
    let mut sim = corridor(4);
    let smith = Occupant::new(EntityKind::Blacksmith, Cell::new(0, 0));
    let smith_id = smith.id();
    sim.add_occupant(smith);
    let miner = Occupant::new(EntityKind::MinerNotFull, Cell::new(1, 0))
        .with_rate(1)
        .with_resource_limit(1);
    let miner_id = miner.id();
    sim.spawn(miner);
    sim.add_occupant(Occupant::new(EntityKind::Ore, Cell::new(2, 0)));

    sim.run(1);
    assert_eq!(sim.state_of(miner_id), Some(BehaviorState::Full));
    assert_eq!(sim.world().count_of(EntityKind::Ore), 0);

    sim.run(1);
    assert_eq!(sim.state_of(miner_id), Some(BehaviorState::Gathering));
    assert_eq!(sim.world().occupant(smith_id).unwrap().resource_count(), 1);
    assert_eq!(sim.world().occupant(miner_id).unwrap().resource_count(), 0);

    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::Gathered { .. })), 1);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::Deposited { amount: 1, .. })), 1);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::Transformed { .. })), 2);

    // Nothing left to mine: the miner idles in place.
    let idle = sim.advance_by(1);
    assert_eq!(idle, vec![Cell::new(1, 0)]);
    assert!(sim.world().validate().is_ok());
}

#[test]
fn miner_walks_to_distant_ore() {
    let mut sim = corridor(6);
    let miner = Occupant::new(EntityKind::MinerNotFull, Cell::new(0, 0)).with_rate(1);
    let id = miner.id();
    sim.spawn(miner);
    sim.add_occupant(Occupant::new(EntityKind::Ore, Cell::new(5, 0)));

    sim.run(4);
    assert_eq!(sim.world().occupant(id).unwrap().cell(), Cell::new(4, 0));
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::Moved { .. })), 4);

    sim.run(1);
    assert_eq!(sim.world().occupant(id).unwrap().resource_count(), 1);
    assert_eq!(sim.world().count_of(EntityKind::Ore), 0);
}

#[test]
fn killed_fighters_linger_then_expire() {
    let config = SimConfig::default().with_corpse_ticks(2);
    let mut sim = Simulation::new(3, 1, Background::default(), config);
    let removed = Rc::new(RefCell::new(Vec::new()));
    sim.add_removal_listener(Box::new(Recorder(Rc::clone(&removed))));

    let soldier = Occupant::new(EntityKind::Soldier, Cell::new(0, 0)).with_rate(1);
    let goblin = Occupant::new(EntityKind::Goblin, Cell::new(1, 0))
        .with_rate(10)
        .with_health(2);
    let goblin_id = goblin.id();
    sim.spawn(soldier);
    let goblin_turn = sim.spawn(goblin).unwrap();

    sim.run(2);
    assert_eq!(sim.state_of(goblin_id), Some(BehaviorState::Dead));
    assert!(!sim.scheduler().contains(goblin_turn));
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::Attacked { .. })), 2);
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::EntityDied { .. })), 1);

    // The corpse still blocks its cell but is no longer a target.
    sim.run(1);
    assert!(sim.world().contains(goblin_id));
    assert_eq!(count(&sim, |k| matches!(k, SimEventKind::Attacked { .. })), 2);

    let changed = sim.advance_by(1);
    assert!(changed.contains(&Cell::new(1, 0)));
    assert!(!sim.world().contains(goblin_id));
    assert_eq!(removed.borrow().as_slice(), &[goblin_id]);

    sim.advance_to(20);
    let after = sim.events().events_for_entity(goblin_id);
    assert!(matches!(
        after.last().map(|e| &e.kind),
        Some(SimEventKind::Removed { .. })
    ));
}

#[test]
fn actions_for_vanished_owners_do_nothing() {
    let mut sim = corridor(3);
    sim.schedule_at(Action::behave(EntityId::new()), 1);
    assert!(sim.advance_to(1).is_empty());
    assert!(sim.events().is_empty());
    assert!(sim.scheduler().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn generated_worlds_keep_one_live_turn_per_actor(
        width in 4u32..12,
        height in 4u32..12,
        seed in any::<u64>(),
        ticks in 1u64..40,
    ) {
        let mut sim = Scenario::generate(width, height, seed)
            .build(SimConfig::default().with_seed(seed))
            .unwrap();
        for _ in 0..ticks {
            sim.advance_by(1);
            prop_assert!(sim.world().validate().is_ok());

            let mut tracked = 0;
            for occupant in sim.world().occupants() {
                let pending = occupant.pending_actions();
                if occupant.is_mobile() || occupant.is_dead() {
                    prop_assert_eq!(pending.len(), 1, "{}", occupant.kind());
                } else {
                    prop_assert!(pending.is_empty());
                }
                for id in pending {
                    prop_assert!(sim.scheduler().contains(*id));
                }
                tracked += pending.len();
            }
            prop_assert_eq!(tracked, sim.scheduler().len());
        }
    }
}
