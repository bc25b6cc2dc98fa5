use std::collections::BTreeSet;

use crate::actions::Action;
use crate::components::*;
use crate::constants::*;
use crate::enums::*;
use crate::errors::ActionError;
use crate::types::{EntityId, TerrainFlags, Vec2};

#[test]
fn test_faction_opponent() {
    assert_eq!(Faction::Blue.opponent(), Faction::Red);
    assert_eq!(Faction::Red.opponent(), Faction::Blue);
    assert_eq!(Faction::Red.opponent().opponent(), Faction::Red);
}

#[test]
fn test_fire_distribution_sums_to_one() {
    let total: f64 = FIRE_DISTRIBUTION.iter().sum();
    assert!((total - 1.0).abs() < 1e-12, "distribution sums to {total}");
}

#[test]
fn test_assault_thresholds_ordered() {
    assert!(ASSAULT_THRESHOLD_ACTIVE < ASSAULT_THRESHOLD_PINNED);
    assert!(ASSAULT_THRESHOLD_PINNED < ASSAULT_THRESHOLD_SUPPRESSED);
}

#[test]
fn test_terrain_flags() {
    let flags = TerrainFlags::OPAQUE | TerrainFlags::WALKABLE;
    assert!(flags.intersects(TerrainFlags::OPAQUE));
    assert!(flags.contains(TerrainFlags::WALKABLE));
    assert!(!flags.intersects(TerrainFlags::BOUNDARY));
    assert!(!flags.contains(TerrainFlags::OPAQUE | TerrainFlags::WATER));
    assert_eq!((flags & TerrainFlags::WALKABLE), TerrainFlags::WALKABLE);
}

#[test]
fn test_terrain_flags_serialize_as_integer() {
    let json = serde_json::to_string(&(TerrainFlags::OPAQUE | TerrainFlags::BOUNDARY)).unwrap();
    assert_eq!(json, "17");
}

#[test]
fn test_entity_id_display_and_parse() {
    let id = EntityId(7);
    assert_eq!(id.to_string(), "#7");
    assert_eq!("#7".parse::<EntityId>().unwrap(), id);
    assert_eq!("12".parse::<EntityId>().unwrap(), EntityId(12));
}

#[test]
fn test_combat_unit_serde() {
    let unit = CombatUnit {
        status: UnitStatus::Pinned,
        faction: Faction::Red,
        command_id: EntityId(1),
        inside_terrains: BTreeSet::from([EntityId(4), EntityId(9)]),
    };
    let json = serde_json::to_string(&unit).unwrap();
    let back: CombatUnit = serde_json::from_str(&json).unwrap();
    assert_eq!(unit, back);
}

#[test]
fn test_fire_controls_defaults() {
    let controls: FireControls =
        serde_json::from_str(r#"{"can_reactive_fire": true}"#).unwrap();
    assert_eq!(controls, FireControls::default());
}

#[test]
fn test_terrain_defaults_to_closed_loop() {
    let terrain: TerrainFeature =
        serde_json::from_str(r#"{"vertices": [[0.0, 0.0], [1.0, 0.0]], "flag": 1}"#).unwrap();
    assert!(terrain.is_closed_loop);
    assert_eq!(terrain.vertices[1], Vec2::new(1.0, 0.0));
}

#[test]
fn test_action_serde_tagged() {
    let action = Action::Fire {
        unit_id: EntityId(3),
        target_id: EntityId(5),
    };
    let json = serde_json::to_string(&action).unwrap();
    assert!(json.contains(r#""type":"Fire""#), "got {json}");
    let back: Action = serde_json::from_str(&json).unwrap();
    assert_eq!(back, action);
    assert_eq!(back.unit_id(), EntityId(3));
}

#[test]
fn test_action_error_invalid() {
    let err = ActionError::from(InvalidAction::NoInitiative);
    assert_eq!(err.invalid(), Some(InvalidAction::NoInitiative));
}

#[test]
fn test_component_keys_unique() {
    let keys = [
        Transform::KEY,
        CombatUnit::KEY,
        MoveControls::KEY,
        FireControls::KEY,
        AssaultControls::KEY,
        TerrainFeature::KEY,
        InitiativeState::KEY,
        EliminationObjective::KEY,
        FactionRoot::KEY,
    ];
    let unique: BTreeSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
    assert!(TerrainFeature::SHARED);
    assert!(!CombatUnit::SHARED);
}
