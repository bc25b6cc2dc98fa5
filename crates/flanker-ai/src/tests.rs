use approx::assert_relative_eq;

use flanker_core::actions::Action;
use flanker_core::components::{CombatUnit, FireControls};
use flanker_core::constants::WIN_SCORE;
use flanker_core::enums::{Faction, UnitStatus};
use flanker_core::types::{EntityId, TerrainFlags, Vec2};
use flanker_sim::scenario::*;
use flanker_sim::systems::initiative;
use flanker_sim::{GameState, SimConfig};

use crate::agent::{play_initiative, Agent, AgentKind};
use crate::config::{AiConfig, AiConfigComponent, SearchConfig, SearchPolicy};
use crate::errors::AiError;
use crate::heuristic;
use crate::representation::{score_units, RepresentationState};
use crate::search::search;
use crate::unabstracted::UnabstractedState;
use crate::waypoints::{WaypointAction, WaypointGraph, WaypointsState};

/// Blue `a` at (0,0) and Red `b` at (30,0) on open ground. Either side
/// wins by destroying one enemy.
fn open_ground() -> (GameState, EntityId, EntityId) {
    let mut world = GameState::new(SimConfig::default());
    spawn_initiative(&mut world, Faction::Blue);
    let blue = spawn_faction_root(&mut world, Faction::Blue, "Blue");
    let red = spawn_faction_root(&mut world, Faction::Red, "Red");
    let a = spawn_squad(&mut world, Faction::Blue, blue, Vec2::new(0.0, 0.0)).unwrap();
    let b = spawn_squad(&mut world, Faction::Red, red, Vec2::new(30.0, 0.0)).unwrap();
    spawn_objective(&mut world, Faction::Red, Faction::Blue, 1);
    spawn_objective(&mut world, Faction::Blue, Faction::Red, 1);
    (world, a, b)
}

/// Blue mover at (-2,-10) south-west of a 10x10 opaque block at the
/// origin, watched by a Red spotter at (15,20). Waypoints east of the
/// mover at (4,-10) (hidden), (12,-10) and (20,-10) (both in view).
fn screened_world() -> (GameState, EntityId, EntityId, WaypointGraph) {
    let mut world = GameState::new(SimConfig::default());
    spawn_rect(&mut world, Vec2::ZERO, Vec2::new(10.0, 10.0), TerrainFlags::OPAQUE);
    spawn_initiative(&mut world, Faction::Blue);
    let blue = spawn_faction_root(&mut world, Faction::Blue, "Blue");
    let red = spawn_faction_root(&mut world, Faction::Red, "Red");
    let mover = spawn_squad(&mut world, Faction::Blue, blue, Vec2::new(-2.0, -10.0)).unwrap();
    let spotter = spawn_squad(&mut world, Faction::Red, red, Vec2::new(15.0, 20.0)).unwrap();
    spawn_objective(&mut world, Faction::Blue, Faction::Red, 1);

    let points = [
        Vec2::new(4.0, -10.0),
        Vec2::new(12.0, -10.0),
        Vec2::new(20.0, -10.0),
    ];
    let graph = WaypointGraph::build(&world, &points, 1.0).unwrap();
    (world, mover, spotter, graph)
}

fn set_status(world: &mut GameState, id: EntityId, status: UnitStatus) {
    world.get_mut::<CombatUnit>(id).unwrap().status = status;
}

fn minimax_config(depth: u32) -> SearchConfig {
    SearchConfig {
        depth,
        policy: SearchPolicy::Minimax,
        ..SearchConfig::default()
    }
}

fn expectimax_config(depth: u32) -> SearchConfig {
    SearchConfig {
        depth,
        policy: SearchPolicy::Expectimax,
        ..SearchConfig::default()
    }
}

// ---- Scoring ----

#[test]
fn test_score_signed_by_maximizing_faction() {
    let units = [
        (Faction::Blue, UnitStatus::Active),
        (Faction::Red, UnitStatus::Pinned),
        (Faction::Red, UnitStatus::Suppressed),
    ];
    assert_relative_eq!(score_units(None, units, Faction::Blue), 0.0);
    assert_relative_eq!(score_units(None, units[..2].to_vec(), Faction::Blue), 1.0);
    assert_relative_eq!(score_units(None, units[..2].to_vec(), Faction::Red), -1.0);
}

#[test]
fn test_score_winner_overrides_units() {
    let units = [(Faction::Blue, UnitStatus::Active)];
    assert_relative_eq!(score_units(Some(Faction::Red), units, Faction::Blue), -WIN_SCORE);
    assert_relative_eq!(score_units(Some(Faction::Red), units, Faction::Red), WIN_SCORE);
}

// ---- Unabstracted representation ----

#[test]
fn test_unabstracted_actions_cover_moves_and_fire() {
    let (world, a, b) = open_ground();
    let mut state = UnabstractedState::from_world(&world).unwrap();

    let actions = state.get_actions().unwrap();

    let moves = actions
        .iter()
        .filter(|action| matches!(action, Action::Move { unit_id, .. } if *unit_id == a))
        .count();
    assert_eq!(moves, 6);
    assert!(actions.contains(&Action::Fire {
        unit_id: a,
        target_id: b
    }));
    assert!(actions.iter().all(|action| action.unit_id() == a));
}

#[test]
fn test_unabstracted_offers_assault_on_suppressed_enemy() {
    let (mut world, a, b) = open_ground();
    set_status(&mut world, b, UnitStatus::Suppressed);
    let mut state = UnabstractedState::from_world(&world).unwrap();

    let actions = state.get_actions().unwrap();

    assert!(actions.contains(&Action::Assault {
        unit_id: a,
        target_id: b
    }));
    assert!(!actions.iter().any(|action| matches!(action, Action::Fire { .. })));
}

#[test]
fn test_unabstracted_fire_branches_follow_distribution() {
    let (world, a, b) = open_ground();
    let state = UnabstractedState::from_world(&world).unwrap();

    let branches = state
        .get_branches(&Action::Fire {
            unit_id: a,
            target_id: b,
        })
        .unwrap();

    assert_eq!(branches.len(), 4);
    let total: f64 = branches.iter().map(|(p, _)| p).sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-12);

    let statuses: Vec<Option<UnitStatus>> = branches
        .iter()
        .map(|(_, branch)| branch.world().try_get::<CombatUnit>(b).map(|u| u.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            Some(UnitStatus::Active),
            Some(UnitStatus::Pinned),
            Some(UnitStatus::Suppressed),
            None,
        ]
    );
    assert_eq!(branches[0].1.get_initiative().unwrap(), Faction::Red);
    assert_eq!(branches[3].1.get_winner().unwrap(), Some(Faction::Blue));
}

#[test]
fn test_unabstracted_invalid_action_has_no_branch() {
    let (world, a, b) = open_ground();
    let state = UnabstractedState::from_world(&world).unwrap();
    let out_of_turn = Action::Fire {
        unit_id: b,
        target_id: a,
    };

    assert!(state.get_branches(&out_of_turn).unwrap().is_empty());
    assert!(state.get_deterministic_branch(&out_of_turn).unwrap().is_none());
}

#[test]
fn test_unabstracted_deterministic_fire_suppresses() {
    let (world, a, b) = open_ground();
    let state = UnabstractedState::from_world(&world).unwrap();

    let branch = state
        .get_deterministic_branch(&Action::Fire {
            unit_id: a,
            target_id: b,
        })
        .unwrap()
        .unwrap();

    assert_eq!(
        branch.world().get::<CombatUnit>(b).unwrap().status,
        UnitStatus::Suppressed
    );
    assert_eq!(branch.get_initiative().unwrap(), Faction::Blue);
    // Overrides do not leak into the branch
    assert!(branch.world().get::<FireControls>(b).unwrap().forced_outcome.is_none());
}

#[test]
fn test_unabstracted_deterministic_assault_on_suppressed_wins() {
    let (mut world, a, b) = open_ground();
    set_status(&mut world, b, UnitStatus::Suppressed);
    let state = UnabstractedState::from_world(&world).unwrap();

    let branch = state
        .get_deterministic_branch(&Action::Assault {
            unit_id: a,
            target_id: b,
        })
        .unwrap()
        .unwrap();

    assert!(!branch.world().contains(b));
    assert_eq!(branch.get_winner().unwrap(), Some(Faction::Blue));
}

// ---- Search ----

#[test]
fn test_minimax_depth_one_prefers_fire() {
    let (world, a, b) = open_ground();
    let mut state = UnabstractedState::from_world(&world).unwrap();

    let outcome = search(&mut state, &minimax_config(1), Faction::Blue).unwrap();

    assert_eq!(
        outcome.action,
        Some(Action::Fire {
            unit_id: a,
            target_id: b
        })
    );
    // Blue Active against Red Suppressed
    assert_relative_eq!(outcome.score, 2.0);
    assert!(outcome.nodes > 1);
}

#[test]
fn test_minimax_finds_fire_then_assault_win() {
    let (world, a, b) = open_ground();
    let mut state = UnabstractedState::from_world(&world).unwrap();

    let outcome = search(&mut state, &minimax_config(2), Faction::Blue).unwrap();

    assert_eq!(
        outcome.action,
        Some(Action::Fire {
            unit_id: a,
            target_id: b
        })
    );
    assert!(outcome.score >= WIN_SCORE);
}

#[test]
fn test_expectimax_weights_fire_outcomes() {
    let (world, a, b) = open_ground();
    let mut state = UnabstractedState::from_world(&world).unwrap();

    let outcome = search(&mut state, &expectimax_config(1), Faction::Blue).unwrap();

    assert_eq!(
        outcome.action,
        Some(Action::Fire {
            unit_id: a,
            target_id: b
        })
    );
    // 0.3 * 0 + 0.4 * 1 + 0.25 * 2 + 0.05 * WIN_SCORE
    assert_relative_eq!(outcome.score, 0.9 + 0.05 * WIN_SCORE, epsilon = 1e-9);
}

#[test]
fn test_search_leaves_real_world_untouched() {
    let (world, a, b) = open_ground();
    let mut state = UnabstractedState::from_world(&world).unwrap();

    search(&mut state, &minimax_config(2), Faction::Blue).unwrap();

    assert!(world.contains(b));
    assert_eq!(world.get::<CombatUnit>(a).unwrap().status, UnitStatus::Active);
    assert_eq!(world.get::<CombatUnit>(b).unwrap().status, UnitStatus::Active);
    assert_eq!(initiative::get_initiative(&world).unwrap(), Faction::Blue);
}

#[test]
fn test_terminal_root_has_no_action() {
    let (mut world, _, b) = open_ground();
    flanker_sim::systems::command::kill_unit(&mut world, b).unwrap();
    let mut state = UnabstractedState::from_world(&world).unwrap();

    let outcome = search(&mut state, &expectimax_config(3), Faction::Blue).unwrap();

    assert!(outcome.action.is_none());
    assert_relative_eq!(outcome.score, WIN_SCORE + 3.0);
    assert_eq!(outcome.nodes, 1);
}

#[test]
fn test_parallel_root_matches_sequential() {
    for policy in [SearchPolicy::Minimax, SearchPolicy::Expectimax] {
        let (world, _, _) = open_ground();
        let points = [Vec2::new(10.0, 10.0), Vec2::new(20.0, -10.0)];
        let graph = WaypointGraph::build(&world, &points, 5.0).unwrap();

        let config = SearchConfig {
            depth: 2,
            policy,
            ..SearchConfig::default()
        };
        let parallel_config = SearchConfig {
            parallel: true,
            ..config.clone()
        };

        let mut sequential = WaypointsState::from_world(&graph, &world, 11).unwrap();
        let mut parallel = WaypointsState::from_world(&graph, &world, 11).unwrap();
        let expected = search(&mut sequential, &config, Faction::Blue).unwrap();
        let actual = search(&mut parallel, &parallel_config, Faction::Blue).unwrap();

        assert_eq!(actual.action, expected.action, "{policy:?}");
        assert_relative_eq!(actual.score, expected.score, epsilon = 1e-9);
    }
}

// ---- Waypoint representation ----

#[test]
fn test_waypoint_units_get_their_own_nodes() {
    let (world, mover, spotter, graph) = screened_world();

    let state = WaypointsState::from_world(&graph, &world, 1).unwrap();

    assert_eq!(state.graph().len(), 5);
    assert_eq!(state.unit(mover).unwrap().node, 3);
    assert_eq!(state.unit(spotter).unwrap().node, 4);
    assert_eq!(state.graph().node(3).unwrap().position, Vec2::new(-2.0, -10.0));
    // The template is left alone
    assert_eq!(graph.len(), 3);
}

#[test]
fn test_waypoint_move_interrupt_first_visible_node() {
    let (world, mover, _, graph) = screened_world();
    let state = WaypointsState::from_world(&graph, &world, 1).unwrap();
    let unit = *state.unit(mover).unwrap();

    assert_eq!(state.graph().path(3, 2), Some(&[3, 0, 1, 2][..]));
    assert_eq!(state.move_interrupt(&unit, 2), Some(1));
    assert_eq!(state.move_interrupt(&unit, 1), Some(1));
    assert_eq!(state.move_interrupt(&unit, 0), None);
}

#[test]
fn test_waypoint_actions_carry_interrupts() {
    let (world, mover, _, graph) = screened_world();
    let mut state = WaypointsState::from_world(&graph, &world, 1).unwrap();

    let actions = state.get_actions().unwrap();

    assert!(actions.contains(&WaypointAction::Move {
        unit_id: mover,
        to_node: 0,
        interrupt_at: None,
    }));
    assert!(actions.contains(&WaypointAction::Move {
        unit_id: mover,
        to_node: 2,
        interrupt_at: Some(1),
    }));
    // Spotter is out of sight and behind the block
    assert!(!actions
        .iter()
        .any(|action| matches!(action, WaypointAction::Fire { .. } | WaypointAction::Assault { .. })));
}

#[test]
fn test_waypoint_interrupted_move_pins_at_interrupt() {
    let (world, mover, _, graph) = screened_world();
    let state = WaypointsState::from_world(&graph, &world, 1).unwrap();

    let interrupted = state
        .get_deterministic_branch(&WaypointAction::Move {
            unit_id: mover,
            to_node: 2,
            interrupt_at: Some(1),
        })
        .unwrap()
        .unwrap();
    let unit = interrupted.unit(mover).unwrap();
    assert_eq!(unit.node, 1);
    assert_eq!(unit.status, UnitStatus::Pinned);
    assert_eq!(interrupted.get_initiative().unwrap(), Faction::Blue);

    let clear = state
        .get_deterministic_branch(&WaypointAction::Move {
            unit_id: mover,
            to_node: 0,
            interrupt_at: None,
        })
        .unwrap()
        .unwrap();
    assert_eq!(clear.unit(mover).unwrap().node, 0);
    assert_eq!(clear.unit(mover).unwrap().status, UnitStatus::Active);
}

#[test]
fn test_waypoint_fire_branches() {
    let (world, a, b) = open_ground();
    let graph = WaypointGraph::build(&world, &[], 5.0).unwrap();
    let mut state = WaypointsState::from_world(&graph, &world, 1).unwrap();
    let fire = WaypointAction::Fire {
        unit_id: a,
        target_id: b,
    };
    assert!(state.get_actions().unwrap().contains(&fire));

    let branches = state.get_branches(&fire).unwrap();

    assert_eq!(branches.len(), 4);
    let total: f64 = branches.iter().map(|(p, _)| p).sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    let (_, miss) = &branches[0];
    assert_eq!(miss.unit(b).unwrap().status, UnitStatus::Active);
    assert_eq!(miss.get_initiative().unwrap(), Faction::Red);
    let (_, pin) = &branches[1];
    assert_eq!(pin.unit(b).unwrap().status, UnitStatus::Pinned);
    assert_eq!(pin.get_initiative().unwrap(), Faction::Red);
    let (_, suppress) = &branches[2];
    assert_eq!(suppress.unit(b).unwrap().status, UnitStatus::Suppressed);
    assert_eq!(suppress.get_initiative().unwrap(), Faction::Blue);
    let (_, kill) = &branches[3];
    assert!(kill.unit(b).is_none());
    assert_eq!(kill.get_winner().unwrap(), Some(Faction::Blue));
}

#[test]
fn test_waypoint_miss_restores_target_reactive_fire() {
    let (mut world, a, b) = open_ground();
    world.get_mut::<FireControls>(b).unwrap().can_reactive_fire = false;
    let graph = WaypointGraph::build(&world, &[], 5.0).unwrap();
    let state = WaypointsState::from_world(&graph, &world, 1).unwrap();
    assert!(state.unit(b).unwrap().no_fire);

    let branches = state
        .get_branches(&WaypointAction::Fire {
            unit_id: a,
            target_id: b,
        })
        .unwrap();

    assert!(!branches[0].1.unit(b).unwrap().no_fire);
}

#[test]
fn test_waypoint_fire_on_suppressed_kills() {
    let (mut world, a, b) = open_ground();
    set_status(&mut world, b, UnitStatus::Suppressed);
    let graph = WaypointGraph::build(&world, &[], 5.0).unwrap();
    let state = WaypointsState::from_world(&graph, &world, 1).unwrap();

    let branch = state
        .get_deterministic_branch(&WaypointAction::Fire {
            unit_id: a,
            target_id: b,
        })
        .unwrap()
        .unwrap();

    assert!(branch.unit(b).is_none());
    assert_eq!(branch.objectives()[0].units_destroyed_counter, 1);
    assert_eq!(branch.get_winner().unwrap(), Some(Faction::Blue));
}

#[test]
fn test_waypoint_assault_resolves_melee() {
    let (mut world, a, b) = open_ground();
    set_status(&mut world, b, UnitStatus::Suppressed);
    let graph = WaypointGraph::build(&world, &[], 5.0).unwrap();
    let mut state = WaypointsState::from_world(&graph, &world, 1).unwrap();
    let assault = WaypointAction::Assault {
        unit_id: a,
        target_id: b,
        interrupt_at: None,
    };
    assert!(state.get_actions().unwrap().contains(&assault));

    let branch = state.get_deterministic_branch(&assault).unwrap().unwrap();

    assert!(branch.unit(b).is_none());
    assert_eq!(branch.unit(a).unwrap().node, 1);
    assert_eq!(branch.get_winner().unwrap(), Some(Faction::Blue));
}

#[test]
fn test_waypoint_interrupted_assault_suppresses_attacker() {
    let (world, a, b) = open_ground();
    let graph = WaypointGraph::build(&world, &[], 5.0).unwrap();
    let mut state = WaypointsState::from_world(&graph, &world, 1).unwrap();
    let assault = WaypointAction::Assault {
        unit_id: a,
        target_id: b,
        interrupt_at: Some(0),
    };
    assert!(state.get_actions().unwrap().contains(&assault));

    let branch = state.get_deterministic_branch(&assault).unwrap().unwrap();

    let attacker = branch.unit(a).unwrap();
    assert_eq!(attacker.status, UnitStatus::Suppressed);
    assert_eq!(attacker.node, 0);
    assert!(branch.unit(b).is_some());
    assert_eq!(branch.get_initiative().unwrap(), Faction::Red);
}

#[test]
fn test_waypoint_out_of_turn_action_unavailable() {
    let (world, a, b) = open_ground();
    let graph = WaypointGraph::build(&world, &[], 5.0).unwrap();
    let state = WaypointsState::from_world(&graph, &world, 1).unwrap();

    let action = WaypointAction::Fire {
        unit_id: b,
        target_id: a,
    };
    assert!(state.get_deterministic_branch(&action).unwrap().is_none());
    assert!(state.get_branches(&action).unwrap().is_empty());
}

#[test]
fn test_waypoint_deabstract_uses_node_position() {
    let (world, mover, spotter, graph) = screened_world();
    let state = WaypointsState::from_world(&graph, &world, 1).unwrap();

    let action = state.deabstract(&WaypointAction::Move {
        unit_id: mover,
        to_node: 1,
        interrupt_at: Some(1),
    });
    assert_eq!(
        action,
        Action::Move {
            unit_id: mover,
            to: Vec2::new(12.0, -10.0)
        }
    );

    let action = state.deabstract(&WaypointAction::Assault {
        unit_id: mover,
        target_id: spotter,
        interrupt_at: None,
    });
    assert_eq!(
        action,
        Action::Assault {
            unit_id: mover,
            target_id: spotter
        }
    );
}

#[test]
fn test_waypoint_search_takes_the_kill() {
    let (mut world, _, b) = open_ground();
    set_status(&mut world, b, UnitStatus::Suppressed);
    let graph = WaypointGraph::build(&world, &[Vec2::new(15.0, 15.0)], 5.0).unwrap();
    let mut state = WaypointsState::from_world(&graph, &world, 3).unwrap();

    let outcome = search(&mut state, &minimax_config(2), Faction::Blue).unwrap();

    assert!(matches!(
        outcome.action,
        Some(WaypointAction::Fire { .. } | WaypointAction::Assault { .. })
    ));
    assert!(outcome.score >= WIN_SCORE);
}

// ---- Heuristic ----

#[test]
fn test_heuristic_fires_when_possible() {
    let (mut world, a, b) = open_ground();
    assert_eq!(
        heuristic::choose_action(&mut world, Faction::Blue).unwrap(),
        Some(Action::Fire {
            unit_id: a,
            target_id: b
        })
    );
}

#[test]
fn test_heuristic_advances_toward_hidden_enemy() {
    let (mut world, mover, spotter, _) = screened_world();
    let start = Vec2::new(-2.0, -10.0);

    let action = heuristic::choose_action(&mut world, Faction::Blue).unwrap();

    let Some(Action::Move { unit_id, to }) = action else {
        panic!("expected a move, got {action:?}");
    };
    assert_eq!(unit_id, mover);
    let step = start.distance(to);
    assert!((1.0..=10.0).contains(&step), "step {step}");
    // Closer to the enemy than before
    let enemy = Vec2::new(15.0, 20.0);
    assert!(to.distance(enemy) < start.distance(enemy));
    assert!(world.contains(spotter));
}

#[test]
fn test_heuristic_nothing_to_do_without_units() {
    let (mut world, a, _) = open_ground();
    flanker_sim::systems::command::kill_unit(&mut world, a).unwrap();
    assert_eq!(heuristic::choose_action(&mut world, Faction::Blue).unwrap(), None);
}

// ---- Agents ----

#[test]
fn test_zero_cap_passes_initiative() {
    let (mut world, _, _) = open_ground();
    let config = SearchConfig {
        action_cap: 0,
        ..minimax_config(1)
    };

    let records = play_initiative(&mut world, Faction::Blue, &config, &AiConfig::Unabstracted).unwrap();

    assert!(records.is_empty());
    assert_eq!(initiative::get_initiative(&world).unwrap(), Faction::Red);
}

#[test]
fn test_unabstracted_agent_opens_with_fire() {
    let (mut world, a, b) = open_ground();
    let config = SearchConfig {
        action_cap: 5,
        ..minimax_config(1)
    };

    let records = play_initiative(&mut world, Faction::Blue, &config, &AiConfig::Unabstracted).unwrap();

    assert!(!records.is_empty() && records.len() <= 5);
    assert_eq!(
        records[0].action,
        Action::Fire {
            unit_id: a,
            target_id: b
        }
    );
    assert!(records.iter().all(|r| r.faction == Faction::Blue));
}

#[test]
fn test_agents_terminate_within_cap() {
    let configs = [
        AiConfig::RandomHeuristic,
        AiConfig::default(),
        AiConfig::Unabstracted,
    ];
    for ai in configs {
        let mut world = GameState::new(SimConfig::default());
        setup_skirmish(&mut world).unwrap();
        let search = SearchConfig {
            action_cap: 3,
            ..expectimax_config(1)
        };

        let records = play_initiative(&mut world, Faction::Blue, &search, &ai).unwrap();

        assert!(records.len() <= 3, "{ai:?} applied {}", records.len());
        let winner = flanker_sim::systems::objective::get_winner(&world).unwrap();
        let initiative = initiative::get_initiative(&world).unwrap();
        assert!(winner.is_some() || initiative == Faction::Red, "{ai:?}");
    }
}

#[test]
fn test_agent_stops_on_winner() {
    let (mut world, _, b) = open_ground();
    flanker_sim::systems::command::kill_unit(&mut world, b).unwrap();

    let records = play_initiative(
        &mut world,
        Faction::Blue,
        &minimax_config(1),
        &AiConfig::RandomHeuristic,
    )
    .unwrap();

    assert!(records.is_empty());
    assert_eq!(initiative::get_initiative(&world).unwrap(), Faction::Blue);
}

#[test]
fn test_default_waypoints_need_boundary() {
    let (world, _, _) = open_ground();
    let result = Agent::new(&world, Faction::Blue, &AiConfig::default(), SearchConfig::default());
    assert!(matches!(result, Err(AiError::NoBoundary)));
}

#[test]
fn test_default_waypoints_grid_over_boundary() {
    let mut world = GameState::new(SimConfig::default());
    setup_skirmish(&mut world).unwrap();

    let agent = Agent::new(&world, Faction::Red, &AiConfig::default(), SearchConfig::default()).unwrap();

    let AgentKind::Waypoints(graph) = &agent.kind else {
        panic!("expected a waypoint agent");
    };
    assert_eq!(graph.len(), 100);
    assert_relative_eq!(graph.path_tolerance(), 20.0);
}

// ---- Configuration ----

#[test]
fn test_agent_from_stored_config() {
    let mut world = GameState::with_manifest(crate::manifest(), SimConfig::default());
    spawn_initiative(&mut world, Faction::Blue);
    let red = spawn_faction_root(&mut world, Faction::Red, "Red");
    spawn_squad(&mut world, Faction::Red, red, Vec2::new(5.0, 5.0)).unwrap();
    world.create((AiConfigComponent {
        faction: Faction::Red,
        config: AiConfig::Unabstracted,
    },));

    let agent = Agent::from_world(&world, Faction::Red, SearchConfig::default()).unwrap();
    assert!(matches!(agent.kind, AgentKind::Unabstracted));

    let missing = Agent::from_world(&world, Faction::Blue, SearchConfig::default());
    assert!(matches!(missing, Err(AiError::MissingConfig(Faction::Blue))));

    // Config entities survive the copy a search branch makes
    let state = UnabstractedState::from_world(&world).unwrap();
    assert_eq!(
        crate::config::ai_config(state.world(), Faction::Red).unwrap(),
        Some(AiConfig::Unabstracted)
    );
}

#[test]
fn test_ai_config_json() {
    let empty: AiConfig = serde_json::from_str(r#"{"type":"Waypoints"}"#).unwrap();
    assert_eq!(empty, AiConfig::default());

    let explicit: AiConfig = serde_json::from_str(
        r#"{"type":"Waypoints","waypoint_coordinates":[[1.0,2.0],[3.0,4.0]],"path_tolerance":5.0}"#,
    )
    .unwrap();
    assert_eq!(
        explicit,
        AiConfig::Waypoints {
            waypoint_coordinates: vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)],
            path_tolerance: 5.0,
        }
    );

    let heuristic: AiConfig = serde_json::from_str(r#"{"type":"RandomHeuristic"}"#).unwrap();
    assert_eq!(heuristic, AiConfig::RandomHeuristic);
    assert!(serde_json::from_str::<AiConfig>(r#"{"type":"Oracle"}"#).is_err());
}

#[test]
fn test_search_config_defaults() {
    let config = SearchConfig::default();
    assert_eq!(config.depth, 4);
    assert_eq!(config.policy, SearchPolicy::Expectimax);
    assert!(!config.parallel);
    assert_eq!(config.action_cap, 20);
}
