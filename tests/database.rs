use ecdb::engine::component::TypeRegistry;
use ecdb::engine::entity::Entity;
use ecdb::engine::error::{ComponentNotFoundError, ECSError, EntityNotFoundError};
use ecdb::engine::types::TypeKey;

mod common;
use common::*;

#[test]
fn add_entity_assigns_sequential_ids() {
    let mut db = Db::new();
    assert_eq!(db.last_unique_id(), 0);

    let a = db.add_entity([position(0, 0)]).unwrap();
    let b = db.add_entity(NO_COMPONENTS).unwrap();
    let c = db.add_entity([velocity(1, 1)]).unwrap();

    assert_eq!((a.unique_id(), b.unique_id(), c.unique_id()), (0, 1, 2));
    assert_eq!(db.last_unique_id(), 3);
    assert_eq!(db.size(), 3);
}

#[test]
fn ids_are_never_reused_after_removal() {
    let mut db = Db::new();
    let first = db.add_entity([position(0, 0)]).unwrap();
    db.remove_entity(first).unwrap();

    let second = db.add_entity([position(0, 0)]).unwrap();
    assert_eq!(second, Entity(1));
    assert!(!db.contains(first));
    assert_eq!(db.size(), 1);
}

#[test]
fn single_entity_scenario() {
    let mut db = Db::new();
    let entity = db.add_entity([position(0, 0), velocity(1, 1)]).unwrap();

    assert_eq!(entity.unique_id(), 0);
    assert_eq!(db.size(), 1);

    let rows = db.query_static::<(Position, Velocity)>(128);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], (entity, (&Position { x: 0, y: 0 }, &Velocity { x: 1, y: 1 })));
}

#[test]
fn empty_entity_is_live_without_components() {
    let mut db = Db::new();
    let entity = db.add_entity(NO_COMPONENTS).unwrap();

    assert!(db.contains(entity));
    assert!(db.signature(entity).unwrap().is_empty());
    assert_eq!(db.query(&[]).len(), 1);
}

#[test]
fn later_components_overwrite_earlier_ones_of_the_same_type() {
    let mut db = Db::new();
    let entity = db.add_entity([position(1, 1), position(2, 2)]).unwrap();

    assert_eq!(db.get::<Position>(entity).unwrap(), &Position { x: 2, y: 2 });
    assert_eq!(db.signature(entity).unwrap().count(), 1);
}

#[test]
fn remove_absent_entity_fails_and_leaves_database_unchanged() {
    let mut db = Db::new();
    let kept = db.add_entity([position(0, 0)]).unwrap();

    let err = db.remove_entity(Entity(42)).unwrap_err();
    assert_eq!(err, ECSError::EntityNotFound(EntityNotFoundError { entity: Entity(42) }));
    assert!(err.is_not_found());

    assert_eq!(db.size(), 1);
    assert!(db.contains(kept));
    assert_eq!(db.last_unique_id(), 1);
}

#[test]
fn removing_an_entity_twice_fails_the_second_time() {
    let mut db = Db::new();
    let entity = db.add_entity([position(0, 0)]).unwrap();

    db.remove_entity(entity).unwrap();
    assert!(db.remove_entity(entity).is_err());
    assert!(db.is_empty());
}

#[test]
fn remove_entity_drops_all_of_its_components() {
    let mut db = Db::new();
    let entity = db.add_entity([position(0, 0), velocity(1, 1)]).unwrap();
    let position_key = db.key_of::<Position>().unwrap();
    let velocity_key = db.key_of::<Velocity>().unwrap();

    db.remove_entity(entity).unwrap();

    assert!(db.get_component(entity, position_key).is_err());
    assert!(db.get_component(entity, velocity_key).is_err());
    assert!(db.is_consistent());
}

#[test]
fn take_entity_returns_components_in_key_order() {
    let mut db = Db::new();
    db.registry_mut().register::<Velocity>().unwrap();
    db.registry_mut().register::<Position>().unwrap();

    let entity = db.add_entity([position(3, 4), velocity(5, 6)]).unwrap();
    let components = db.take_entity(entity).unwrap();

    assert_eq!(components, vec![velocity(5, 6), position(3, 4)]);
    assert!(db.is_empty());
}

#[test]
fn get_component_round_trip() {
    let mut db = Db::new();
    let entity = db.add_entity(NO_COMPONENTS).unwrap();

    db.add_component(entity, Health(7)).unwrap();
    let key = db.key_of::<Health>().unwrap();

    assert_eq!(db.get_component(entity, key).unwrap(), &Kinematics::Health(Health(7)));
    assert_eq!(db.get::<Health>(entity).unwrap(), &Health(7));
    assert!(db.has_component(entity, key));
}

#[test]
fn add_component_replaces_existing_value() {
    let mut db = Db::new();
    let entity = db.add_entity([position(0, 0)]).unwrap();

    db.add_component(entity, Position { x: 9, y: 9 }).unwrap();

    assert_eq!(db.get::<Position>(entity).unwrap(), &Position { x: 9, y: 9 });
    assert!(db.is_consistent());
}

#[test]
fn add_component_to_dead_entity_fails() {
    let mut db = Db::new();

    let err = db.add_component(Entity(3), Health(1)).unwrap_err();
    assert_eq!(err, ECSError::EntityNotFound(EntityNotFoundError { entity: Entity(3) }));
    assert!(db.is_consistent());
}

#[test]
fn get_missing_component_reports_entity_and_key() {
    let mut db = Db::new();
    let entity = db.add_entity([position(0, 0)]).unwrap();
    let key = db.registry_mut().register::<Velocity>().unwrap();

    let err = db.get_component(entity, key).unwrap_err();
    assert_eq!(err, ECSError::ComponentNotFound(ComponentNotFoundError { entity, key }));
    assert_eq!(err.to_string(), format!("Entity(0) has no component of type {key}"));
}

#[test]
fn typed_get_of_unregistered_shape_fails() {
    let mut db = Db::new();
    let entity = db.add_entity([position(0, 0)]).unwrap();

    assert!(matches!(
        db.get::<Health>(entity),
        Err(ECSError::UnregisteredType { .. })
    ));
}

#[test]
fn remove_component_is_idempotent() {
    let mut db = Db::new();
    let entity = db.add_entity([position(1, 2), velocity(0, 0)]).unwrap();
    let key = db.key_of::<Position>().unwrap();

    assert_eq!(db.remove_component(entity, key), Some(position(1, 2)));
    assert_eq!(db.remove_component(entity, key), None);
    assert_eq!(db.remove_component(Entity(99), key), None);
    assert_eq!(db.remove_component(entity, TypeKey(200)), None);

    assert!(!db.has_component(entity, key));
    assert!(db.contains(entity));
    assert!(db.is_consistent());
}

#[test]
fn typed_remove_returns_the_shape() {
    let mut db = Db::new();
    let entity = db.add_entity([velocity(4, 5)]).unwrap();

    assert_eq!(db.remove::<Velocity>(entity), Some(Velocity { x: 4, y: 5 }));
    assert_eq!(db.remove::<Velocity>(entity), None);
    assert_eq!(db.remove::<Health>(entity), None);
}

#[test]
fn entities_iterate_in_ascending_id_order() {
    let mut db = Db::new();
    let ids: Vec<Entity> = (0..5).map(|_| db.add_entity(NO_COMPONENTS).unwrap()).collect();
    db.remove_entity(ids[2]).unwrap();

    let live: Vec<Entity> = db.entities().collect();
    assert_eq!(live, vec![ids[0], ids[1], ids[3], ids[4]]);
}

#[test]
fn frozen_registry_rejects_new_types_and_rolls_back_the_entity() {
    let mut registry = TypeRegistry::new();
    registry.register::<Position>().unwrap();
    registry.freeze();

    let mut db = Db::with_registry(registry);
    db.add_entity([position(0, 0)]).unwrap();

    let err = db.add_entity([position(1, 1), velocity(1, 1)]).unwrap_err();
    assert!(matches!(err, ECSError::RegistryFrozen { .. }));

    assert_eq!(db.size(), 1);
    assert_eq!(db.last_unique_id(), 2);
    assert_eq!(db.query_static::<(Position,)>(0).len(), 1);
    assert!(db.is_consistent());
}

#[test]
fn shared_registry_gives_identical_keys() {
    let mut registry = TypeRegistry::new();
    let position_key = registry.register::<Position>().unwrap();
    let velocity_key = registry.register::<Velocity>().unwrap();

    let a = Db::with_registry(registry.clone());
    let b = Db::with_registry(registry);

    assert_eq!(a.key_of::<Position>(), Some(position_key));
    assert_eq!(b.key_of::<Position>(), Some(position_key));
    assert_eq!(b.key_of::<Velocity>(), Some(velocity_key));
}

#[test]
fn registry_assigns_dense_keys_in_registration_order() {
    let mut registry = TypeRegistry::new();

    assert_eq!(registry.register::<Health>().unwrap(), TypeKey(0));
    assert_eq!(registry.register::<Position>().unwrap(), TypeKey(1));
    assert_eq!(registry.register::<Health>().unwrap(), TypeKey(0));
    assert_eq!(registry.len(), 2);

    let names: Vec<&str> = registry.iter().map(|desc| desc.name).collect();
    assert!(names[0].ends_with("Health"));
    assert!(names[1].ends_with("Position"));

    let component = velocity(0, 0);
    assert_eq!(registry.key_of_component(&component), None);
    assert_eq!(registry.resolve(&component).unwrap(), TypeKey(2));

    registry.freeze();
    assert!(registry.is_frozen());
    assert_eq!(registry.resolve(&component).unwrap(), TypeKey(2));
}
