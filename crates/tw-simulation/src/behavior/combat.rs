use tw_core::{EntityId, EntityKind, Occupant, Positioned};

use super::{Behavior, Interaction};
use crate::context::SimContext;
use crate::event::SimEventKind;

/// Soldiers and goblins: hit the nearest enemy until it drops.
#[derive(Debug, Clone, Copy)]
pub struct Fighter {
    enemy: EntityKind,
}

impl Fighter {
    /// Soldiers hunt goblins.
    pub const SOLDIER: Fighter = Fighter {
        enemy: EntityKind::Goblin,
    };
    /// Goblins hunt soldiers.
    pub const GOBLIN: Fighter = Fighter {
        enemy: EntityKind::Soldier,
    };
}

impl Behavior for Fighter {
    fn goal_type(&self) -> EntityKind {
        self.enemy
    }

    fn interact(&self, ctx: &mut SimContext<'_>, actor: EntityId, target: EntityId) -> Interaction {
        let Some(damage) = ctx.world.occupant(actor).map(|a| a.attack) else {
            return Interaction::default();
        };
        let Some(victim) = ctx.world.occupant_mut(target) else {
            return Interaction::default();
        };
        victim.health = victim.health.saturating_sub(damage);
        let remaining = victim.health;
        let at = victim.cell();

        ctx.emit(
            SimEventKind::Attacked {
                attacker: actor,
                target,
                damage,
                remaining,
            },
            format!("{actor} hit {target} for {damage} ({remaining} left)"),
        );
        if remaining == 0 {
            ctx.kill(target, actor);
        }
        Interaction {
            changed: vec![at],
            completed: true,
        }
    }

    fn transform(&self, _occupant: &Occupant) -> Option<Occupant> {
        None
    }
}

#[cfg(test)]
mod tests {
    use tw_core::{Background, Cell, World};

    use super::*;
    use crate::action::Action;
    use crate::config::SimConfig;
    use crate::event::EventLog;
    use crate::schedule::Scheduler;

    #[test]
    fn blows_wear_down_and_kill() {
        let mut world = World::new(3, 3, Background::default());
        let mut scheduler = Scheduler::new();
        let mut events = EventLog::new(0);
        let config = SimConfig::default().with_corpse_ticks(3);

        let soldier = Occupant::new(EntityKind::Soldier, Cell::new(0, 0)).with_attack(2);
        let goblin = Occupant::new(EntityKind::Goblin, Cell::new(1, 0));
        let (soldier_id, goblin_id) = (soldier.id(), goblin.id());
        world.add_occupant(soldier);
        world.add_occupant(goblin);

        let mut ctx = SimContext {
            world: &mut world,
            scheduler: &mut scheduler,
            events: &mut events,
            config: &config,
            tick: 10,
        };
        let turn = ctx.schedule_for(Action::behave(goblin_id), 12).unwrap();

        Fighter::SOLDIER.interact(&mut ctx, soldier_id, goblin_id);
        assert_eq!(ctx.world.occupant(goblin_id).unwrap().health, 1);
        assert!(!ctx.world.occupant(goblin_id).unwrap().is_dead());

        Fighter::SOLDIER.interact(&mut ctx, soldier_id, goblin_id);
        let corpse = ctx.world.occupant(goblin_id).unwrap();
        assert!(corpse.is_dead());
        assert_eq!(corpse.health, 0);

        // The goblin's turn is gone and only its expiry remains.
        assert!(!scheduler.contains(turn));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_due(), Some(13));
        let died = events
            .events()
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::EntityDied { .. }))
            .count();
        assert_eq!(died, 1);
    }

    #[test]
    fn fighters_never_transform() {
        let soldier = Occupant::new(EntityKind::Soldier, Cell::new(0, 0));
        assert!(Fighter::SOLDIER.transform(&soldier).is_none());
        assert_eq!(Fighter::GOBLIN.goal_type(), EntityKind::Soldier);
    }
}
