#![allow(dead_code)]

use ecdb::component_union;
use ecdb::engine::commands::Command;
use ecdb::engine::database::EntityComponentDatabase;
use ecdb::engine::error::ECSResult;
use ecdb::engine::systems::System;

pub const AGENTS_SMALL: usize = 10_000;
pub const AGENTS_MED: usize = 100_000;

#[derive(Clone, Copy, Debug)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Wealth {
    pub value: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Productivity {
    pub rate: f32,
}

component_union! {
    #[derive(Clone, Debug)]
    pub enum Agent {
        Position(Position),
        Wealth(Wealth),
        Productivity(Productivity),
    }
}

pub type Db = EntityComponentDatabase<Agent>;

/// Every agent has a position and wealth; every other one is productive.
pub fn populate(agent_count: usize) -> ECSResult<Db> {
    let mut db = Db::new();
    for i in 0..agent_count {
        let mut components: Vec<Agent> = vec![
            Position { x: i as f32, y: 0.0 }.into(),
            Wealth { value: 100.0 }.into(),
        ];
        if i % 2 == 0 {
            components.push(Productivity { rate: 1.0 }.into());
        }
        db.add_entity(components)?;
    }
    Ok(db)
}

/// Adds each productive agent's rate to its wealth.
pub struct ProductionSystem;

impl System<Agent, Command<Agent>> for ProductionSystem {
    fn run(&self, db: &Db) -> Vec<Command<Agent>> {
        db.query_static::<(Productivity, Wealth)>(db.size())
            .into_iter()
            .map(|(entity, (p, w))| Command::Add {
                entity,
                component: Wealth { value: w.value + p.rate }.into(),
            })
            .collect()
    }

    fn name(&self) -> &str {
        "production"
    }
}

/// Moves every agent one unit along `y`.
pub struct DriftSystem;

impl System<Agent, Command<Agent>> for DriftSystem {
    fn run(&self, db: &Db) -> Vec<Command<Agent>> {
        db.query_static::<(Position,)>(db.size())
            .into_iter()
            .map(|(entity, (p,))| Command::Add {
                entity,
                component: Position { x: p.x, y: p.y + 1.0 }.into(),
            })
            .collect()
    }

    fn name(&self) -> &str {
        "drift"
    }
}
