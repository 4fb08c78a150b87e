#![allow(dead_code)]

use ecdb::component_union;
use ecdb::engine::commands::Command;
use ecdb::engine::database::EntityComponentDatabase;
use ecdb::engine::entity::Entity;
use ecdb::engine::systems::System;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Velocity {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health(pub i32);

component_union! {
    #[derive(Clone, Debug, PartialEq)]
    pub enum Kinematics {
        Position(Position),
        Velocity(Velocity),
        Health(Health),
    }
}

pub type Db = EntityComponentDatabase<Kinematics>;
pub type Cmd = Command<Kinematics>;

pub const NO_COMPONENTS: [Kinematics; 0] = [];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn position(x: i32, y: i32) -> Kinematics {
    Position { x, y }.into()
}

pub fn velocity(x: i32, y: i32) -> Kinematics {
    Velocity { x, y }.into()
}

/// Spawns `count` entities at `(i, i)` moving by `(1, 1)`.
pub fn spawn_movers(db: &mut Db, count: usize) -> Vec<Entity> {
    (0..count as i32)
        .map(|i| db.add_entity([position(i, i), velocity(1, 1)]).unwrap())
        .collect()
}

/// Advances every entity with a position and a velocity by one step, then
/// zeroes its velocity.
#[derive(Debug)]
pub struct MovementSystem;

impl System<Kinematics, Cmd> for MovementSystem {
    fn run(&self, db: &Db) -> Vec<Cmd> {
        let mut actions = Vec::new();
        for (entity, (p, v)) in db.query_static::<(Position, Velocity)>(128) {
            actions.push(Command::Add {
                entity,
                component: position(p.x + v.x, p.y + v.y),
            });
            actions.push(Command::Add { entity, component: velocity(0, 0) });
        }
        actions
    }

    fn name(&self) -> &str {
        "movement"
    }
}

/// Removes the oldest live entity, if there is one.
#[derive(Debug)]
pub struct RemoveOneEntitySystem;

impl System<Kinematics, Cmd> for RemoveOneEntitySystem {
    fn run(&self, db: &Db) -> Vec<Cmd> {
        db.entities().take(1).map(|entity| Command::Despawn { entity }).collect()
    }

    fn name(&self) -> &str {
        "remove_one_entity"
    }
}
