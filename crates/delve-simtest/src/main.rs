//! Delve Headless Simulation Harness
//!
//! Drives the turn loop with scripted and random input over many seeds and
//! checks the engine's invariants. Runs entirely in-process, no renderer.
//!
//! Usage:
//!   cargo run -p delve-simtest
//!   cargo run -p delve-simtest -- --verbose --seeds 50
//!   cargo run -p delve-simtest -- --seed 7 --config game.json --render --dump

use std::collections::BTreeSet;
use std::sync::Arc;

use delve_core::generation::{FixedLayouts, MapBuilder, RoomsAndCorridors};
use delve_core::prelude::*;
use delve_core::systems::{self, Behavior};
use delve_core::view::MapView;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Ticks per random-play run
const PLAY_TICKS: usize = 600;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    render: bool,
    dump: bool,
    base_seed: u64,
    seeds: u64,
    config: GameConfig,
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        verbose: false,
        render: false,
        dump: false,
        base_seed: 0,
        seeds: 20,
        config: GameConfig::default(),
    };
    let mut seed = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--render" => options.render = true,
            "--dump" => options.dump = true,
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                seed = Some(value.parse::<u64>().map_err(|e| format!("bad --seed: {}", e))?);
            }
            "--seeds" => {
                let value = args.next().ok_or("--seeds needs a value")?;
                options.seeds = value.parse::<u64>().map_err(|e| format!("bad --seeds: {}", e))?;
            }
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                let text = std::fs::read_to_string(&path).map_err(|e| format!("{}: {}", path, e))?;
                options.config = serde_json::from_str(&text).map_err(|e| format!("{}: {}", path, e))?;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    options.base_seed = match seed.or(options.config.seed) {
        Some(seed) => seed,
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default(),
    };
    Ok(options)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let options = match parse_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    println!("=== Delve Simulation Harness ===");
    println!("base seed {}, {} seeds\n", options.base_seed, options.seeds);
    log::info!("Harness config: {:?}", options.config);

    let mut results = Vec::new();

    // 1. Level generation sweep
    results.extend(validate_generation(&options));

    // 2. Scripted door scenario
    results.extend(validate_doors(&options));

    // 3. Turn order fairness and removal
    results.extend(validate_scheduling(&options));

    // 4. Random play: occupancy, exploration, determinism
    results.extend(validate_random_play(&options));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn seed_config(options: &Options, seed: u64) -> GameConfig {
    GameConfig {
        seed: Some(seed),
        ..options.config.clone()
    }
}

fn new_game(options: &Options, seed: u64) -> Result<Game, DungeonError> {
    let config = seed_config(options, seed);
    let builder = RoomsAndCorridors::new(config.clone(), seed);
    Game::new(config, Box::new(builder))
}

// ── 1. Generation ───────────────────────────────────────────────────────

fn validate_generation(options: &Options) -> Vec<TestResult> {
    println!("--- Level Generation ---");
    let mut results = Vec::new();
    let mut failures = Vec::new();
    let mut total_rooms = 0;
    let mut total_doors = 0;

    for seed in options.base_seed..options.base_seed + options.seeds {
        let mut builder = RoomsAndCorridors::new(seed_config(options, seed), seed);
        let mut map = match builder.build(1) {
            Ok(map) => map,
            Err(e) => {
                failures.push(format!("seed {}: build failed: {}", seed, e));
                continue;
            }
        };
        if let Err(e) = builder.populate(&mut map, 1) {
            failures.push(format!("seed {}: populate failed: {}", seed, e));
            continue;
        }
        total_rooms += map.rooms.len();
        total_doors += map.doors().len();

        for (i, a) in map.rooms.iter().enumerate() {
            if map.rooms.iter().skip(i + 1).any(|b| a.intersects(b)) {
                failures.push(format!("seed {}: overlapping rooms", seed));
            }
        }
        for door in map.doors() {
            let p = door.position;
            if map.grid().is_transparent(p.x, p.y).unwrap_or(true) || door.is_open {
                failures.push(format!("seed {}: door at {} starts open", seed, p));
            }
        }
        failures.extend(map.check_invariants().into_iter().map(|p| format!("seed {}: {}", seed, p)));
    }

    if options.verbose {
        println!("  {} rooms, {} doors over {} levels", total_rooms, total_doors, options.seeds);
    }
    results.push(TestResult {
        name: "generation_sweep".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{} levels valid, {} rooms, {} doors", options.seeds, total_rooms, total_doors)
        } else {
            failures.join("; ")
        },
    });
    results
}

// ── 2. Doors ────────────────────────────────────────────────────────────

const DOOR_ROOM: &str = "\
##########
#........#
#........#
#........#
#........#
#....@#..#
#....+...#
#........#
#.......>#
##########";

fn validate_doors(options: &Options) -> Vec<TestResult> {
    println!("--- Doors ---");
    let mut results = Vec::new();
    let config = seed_config(options, options.base_seed);
    let mut game = match Game::new(config, Box::new(FixedLayouts::new(vec![DOOR_ROOM.to_string()]))) {
        Ok(game) => game,
        Err(e) => {
            results.push(TestResult {
                name: "door_layout".into(),
                passed: false,
                detail: format!("layout rejected: {}", e),
            });
            return results;
        }
    };
    let start = Point::new(5, 5);
    let door = Point::new(5, 6);
    let opened = |game: &Game| game.messages.lines().filter(|l| l.ends_with("opened a door")).count();

    let wall = systems::move_player(&mut game, Direction::Right);
    results.push(TestResult {
        name: "door_wall_blocks".into(),
        passed: wall == Ok(ActionOutcome::Blocked) && game.player_position() == Some(start) && opened(&game) == 0,
        detail: format!("{:?}", wall),
    });

    let open = systems::move_player(&mut game, Direction::Down);
    let is_open = game.map.door_at(door).is_some_and(|d| d.is_open);
    results.push(TestResult {
        name: "door_opens_in_place".into(),
        passed: open == Ok(ActionOutcome::OpenedDoor)
            && is_open
            && game.player_position() == Some(start)
            && opened(&game) == 1,
        detail: format!("{:?}, open={}, events={}", open, is_open, opened(&game)),
    });

    let player = game.player_id();
    let again = systems::open_door(&mut game, player, door);
    results.push(TestResult {
        name: "door_idempotent".into(),
        passed: again == Ok(false) && opened(&game) == 1,
        detail: format!("{:?}, events={}", again, opened(&game)),
    });

    if options.render {
        println!("{}", MapView::from_game(&game).render_ascii());
    }
    results
}

// ── 3. Scheduling ───────────────────────────────────────────────────────

struct Idle;

impl Behavior for Idle {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn act(&self, _monster: ActorId, _game: &mut Game) -> Result<bool, DungeonError> {
        Ok(false)
    }
}

const HALL: &str = "\
##########
#@.......#
#.......>#
##########";

fn validate_scheduling(options: &Options) -> Vec<TestResult> {
    println!("--- Scheduling ---");
    let mut results = Vec::new();
    let config = seed_config(options, options.base_seed);
    let mut builder = FixedLayouts::new(vec![HALL.to_string()]);

    let mut map = match builder.build(1) {
        Ok(map) => map,
        Err(e) => {
            results.push(TestResult {
                name: "scheduling_layout".into(),
                passed: false,
                detail: format!("layout rejected: {}", e),
            });
            return results;
        }
    };
    let start = map.player_start();
    let setup = (|| -> Result<(ActorId, ActorId, ActorId), DungeonError> {
        let a = map.add_player(Actor::player(config.player_name.clone()), start, None)?;
        let mut twin = Actor::player("Twin");
        twin.kind = ActorKind::Monster;
        let b = map.add_monster(twin, Point::new(4, 1), Arc::new(Idle))?;
        let mut slow = Actor::player("Slow");
        slow.kind = ActorKind::Monster;
        slow.speed = 30;
        let c = map.add_monster(slow, Point::new(6, 2), Arc::new(Idle))?;
        Ok((a, b, c))
    })();
    let (a, b, c) = match setup {
        Ok(ids) => ids,
        Err(e) => {
            results.push(TestResult {
                name: "scheduling_setup".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let mut order = Vec::new();
    for _ in 0..12 {
        let Some(next) = map.next_actor() else { break };
        order.push(next);
        map.advance_turn(next);
    }
    let fast: Vec<ActorId> = order.iter().copied().filter(|&id| id != c).collect();
    let alternates = fast.chunks(2).all(|pair| *pair == [a, b] || *pair == [a]);
    let slow_turns = order.iter().filter(|&&id| id == c).count();
    results.push(TestResult {
        name: "scheduler_fairness".into(),
        passed: alternates && slow_turns > 0 && slow_turns < fast.len() / 2,
        detail: format!("{} turns, slow actor took {}", order.len(), slow_turns),
    });

    let removed = map.remove_actor(b).is_ok();
    let mut saw_removed = false;
    for _ in 0..12 {
        let Some(next) = map.next_actor() else { break };
        saw_removed |= next == b;
        map.advance_turn(next);
    }
    results.push(TestResult {
        name: "scheduler_removal".into(),
        passed: removed && !saw_removed && map.grid().is_walkable(4, 1).unwrap_or(false),
        detail: format!("removed={}, returned afterwards={}", removed, saw_removed),
    });

    let problems = map.check_invariants();
    results.push(TestResult {
        name: "scheduler_registry_paired".into(),
        passed: problems.is_empty(),
        detail: if problems.is_empty() { "in sync".into() } else { problems.join("; ") },
    });
    results
}

// ── 4. Random play ──────────────────────────────────────────────────────

/// Final state of one run, compared across replays
#[derive(Debug, PartialEq)]
struct RunSummary {
    level: u32,
    position: Option<Point>,
    health: Option<i32>,
    actors: usize,
    explored: usize,
    messages: Vec<String>,
}

fn play(options: &Options, seed: u64, failures: &mut Vec<String>) -> Result<(Game, RunSummary), DungeonError> {
    let mut game = new_game(options, seed)?;
    let mut input = StdRng::seed_from_u64(seed ^ 0x5eed);
    let mut explored = explored_cells(&game);
    let mut level = game.level();

    for tick in 0..PLAY_TICKS {
        if game.is_over() {
            break;
        }
        let command = if game.map.can_move_down_to_next_level() {
            PlayerCommand::Descend
        } else {
            PlayerCommand::Move(Direction::ALL[input.gen_range(0..Direction::ALL.len())])
        };
        game.tick(Some(command))?;

        for problem in game.map.check_invariants() {
            failures.push(format!("seed {} tick {}: {}", seed, tick, problem));
        }
        let now = explored_cells(&game);
        if game.level() == level && !now.is_superset(&explored) {
            failures.push(format!("seed {} tick {}: explored cells reverted", seed, tick));
        }
        explored = now;
        level = game.level();
    }

    let summary = RunSummary {
        level: game.level(),
        position: game.player_position(),
        health: game.player().map(|p| p.combat.health),
        actors: game.map.actors().len(),
        explored: game.map.grid().explored_count(),
        messages: game.messages.lines().map(String::from).collect(),
    };
    Ok((game, summary))
}

fn explored_cells(game: &Game) -> BTreeSet<Point> {
    game.map
        .grid()
        .cells()
        .filter(|c| c.is_explored())
        .map(|c| c.position())
        .collect()
}

fn validate_random_play(options: &Options) -> Vec<TestResult> {
    println!("--- Random Play ---");
    let mut results = Vec::new();
    let mut failures = Vec::new();
    let mut mismatches = Vec::new();
    let mut deepest = 0;
    let mut deaths = 0;
    let mut last_game = None;

    for seed in options.base_seed..options.base_seed + options.seeds {
        let first = play(options, seed, &mut failures);
        let replay = play(options, seed, &mut Vec::new());
        match (first, replay) {
            (Ok((game, a)), Ok((_, b))) => {
                if a != b {
                    mismatches.push(seed);
                }
                if options.verbose {
                    println!(
                        "  seed {}: level {}, {} cells explored, {} actors{}",
                        seed,
                        a.level,
                        a.explored,
                        a.actors,
                        if game.is_over() { ", dead" } else { "" }
                    );
                }
                deepest = deepest.max(a.level);
                if game.is_over() {
                    deaths += 1;
                }
                last_game = Some(game);
            }
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("seed {} aborted: {}", seed, e);
                failures.push(format!("seed {}: {}", seed, e));
            }
        }
    }

    results.push(TestResult {
        name: "play_invariants".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{} runs clean, deepest level {}, {} deaths", options.seeds, deepest, deaths)
        } else {
            failures.iter().take(10).cloned().collect::<Vec<_>>().join("; ")
        },
    });
    results.push(TestResult {
        name: "play_deterministic".into(),
        passed: mismatches.is_empty(),
        detail: if mismatches.is_empty() {
            "every replay matched".into()
        } else {
            format!("replays diverged for seeds {:?}", mismatches)
        },
    });

    if let Some(game) = last_game {
        let view = MapView::from_game(&game);
        if options.render {
            println!("{}", view.render_ascii());
            for line in &view.messages {
                println!("  {}", line);
            }
        }
        if options.dump {
            match serde_json::to_string_pretty(&view) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("dump failed: {}", e),
            }
        }
    }
    results
}
