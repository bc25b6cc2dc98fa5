//! skirmish: write a demo scene and let two AI agents play it out.
//!
//! Usage:
//!   skirmish demo --output scene.json [--ai waypoints|unabstracted|heuristic]
//!   skirmish run --scene scene.json [--depth N] [--turns N] [--seed N]

use std::path::PathBuf;
use std::process;

use flanker_ai::{Agent, AiConfig, AiConfigComponent, SearchConfig, SearchPolicy};
use flanker_core::constants::{DEFAULT_SEARCH_DEPTH, DEFAULT_SEED};
use flanker_core::enums::Faction;
use flanker_sim::scenario::setup_skirmish;
use flanker_sim::systems::{initiative, objective};
use flanker_sim::{persistence, GameState, SimConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_TURNS: u32 = 50;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "demo" => cmd_demo(&args[2..]),
        "run" => cmd_run(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "skirmish: FLANKER scene and AI playout tool\n\
         \n\
         Commands:\n\
         \n\
         demo      Write the two-squads-a-side demo scene\n\
         \n\
           --output <path>    Output scene file path\n\
           --ai <kind>        waypoints, unabstracted or heuristic (default: waypoints)\n\
         \n\
         run       Alternate AI initiatives on a scene until one side wins\n\
         \n\
           --scene <path>     Scene file to load\n\
           --depth <N>        Search depth (default: 4)\n\
           --turns <N>        Most initiatives to play (default: 50)\n\
           --seed <N>         RNG seed (default: 42)\n\
           --policy <name>    minimax or expectimax (default: expectimax)\n\
           --parallel         Expand the search root on all cores\n\
           --output <path>    Write the final state here\n\
         \n\
         Set RUST_LOG=info to see every applied action.\n\
         \n\
         Examples:\n\
         \n\
           skirmish demo --output demo.json --ai unabstracted\n\
           skirmish run --scene demo.json --depth 2 --turns 20\n"
    );
}

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(&args[i + 1]);
        }
    }
    None
}

fn parse_path(args: &[String], flag: &str) -> Option<PathBuf> {
    parse_value(args, flag).map(PathBuf::from)
}

fn parse_number<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match parse_value(args, flag) {
        Some(raw) => match raw.parse() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: {flag} expects a number, got {raw}");
                process::exit(1);
            }
        },
        None => default,
    }
}

fn require_path(args: &[String], flag: &str) -> PathBuf {
    match parse_path(args, flag) {
        Some(p) => p,
        None => {
            eprintln!("Error: {flag} <path> is required");
            process::exit(1);
        }
    }
}

// --- Demo command ---

fn cmd_demo(args: &[String]) {
    let output = require_path(args, "--output");
    let config = match parse_value(args, "--ai").unwrap_or("waypoints") {
        "waypoints" => AiConfig::default(),
        "unabstracted" => AiConfig::Unabstracted,
        "heuristic" => AiConfig::RandomHeuristic,
        other => {
            eprintln!("Error: unknown AI kind {other}");
            process::exit(1);
        }
    };

    let mut world = GameState::with_manifest(flanker_ai::manifest(), SimConfig::default());
    if let Err(e) = setup_skirmish(&mut world) {
        eprintln!("Error building scene: {e}");
        process::exit(1);
    }
    for faction in [Faction::Blue, Faction::Red] {
        world.create((AiConfigComponent {
            faction,
            config: config.clone(),
        },));
    }

    if let Err(e) = persistence::save_to_path(&world, &output) {
        eprintln!("Error writing scene: {e}");
        process::exit(1);
    }
    eprintln!("Wrote demo scene to {}", output.display());
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let scene = require_path(args, "--scene");
    let seed = parse_number(args, "--seed", DEFAULT_SEED);
    let turns = parse_number(args, "--turns", DEFAULT_TURNS);
    let policy = match parse_value(args, "--policy").unwrap_or("expectimax") {
        "minimax" => SearchPolicy::Minimax,
        "expectimax" => SearchPolicy::Expectimax,
        other => {
            eprintln!("Error: unknown search policy {other}");
            process::exit(1);
        }
    };
    let search = SearchConfig {
        depth: parse_number(args, "--depth", DEFAULT_SEARCH_DEPTH),
        policy,
        parallel: args.iter().any(|a| a == "--parallel"),
        ..SearchConfig::default()
    };

    let mut world = match persistence::load_from_path(&scene, flanker_ai::manifest(), SimConfig { seed }) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error loading scene: {e}");
            process::exit(1);
        }
    };

    let agents = [Faction::Blue, Faction::Red].map(|faction| {
        match Agent::from_world(&world, faction, search.clone()) {
            Ok(agent) => agent,
            Err(e) => {
                eprintln!("Error preparing {faction:?} agent: {e}");
                process::exit(1);
            }
        }
    });

    for turn in 1..=turns {
        let faction = match initiative::get_initiative(&world) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error reading initiative: {e}");
                process::exit(1);
            }
        };
        let Some(agent) = agents.iter().find(|a| a.faction == faction) else {
            eprintln!("Error: no agent for {faction:?}");
            process::exit(1);
        };

        let records = match agent.play_initiative(&mut world) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error during {faction:?} initiative: {e}");
                process::exit(1);
            }
        };
        eprintln!("Turn {turn}: {faction:?} applied {} action(s)", records.len());
        for record in &records {
            match serde_json::to_string(record) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("Error encoding record: {e}"),
            }
        }

        match objective::get_winner(&world) {
            Ok(Some(winner)) => {
                eprintln!("{winner:?} wins on turn {turn}");
                break;
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error reading objectives: {e}");
                process::exit(1);
            }
        }
    }

    if let Some(output) = parse_path(args, "--output") {
        if let Err(e) = persistence::save_to_path(&world, &output) {
            eprintln!("Error writing final state: {e}");
            process::exit(1);
        }
        eprintln!("Final state written to {}", output.display());
    }
}
