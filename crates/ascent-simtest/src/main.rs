//! Ascent Headless Simulation Harness
//!
//! Runs scripted sessions against the simulation core and checks movement,
//! combat and generation invariants. Runs entirely in-process: no window,
//! no audio, no input devices.
//!
//! Usage:
//!   cargo run -p ascent-simtest
//!   cargo run -p ascent-simtest -- --verbose
//!   cargo run -p ascent-simtest -- --config tuning.json --dump final.json

use ascent_core::generation::LevelLayout;
use ascent_core::prelude::*;
use ascent_core::snapshot::RenderSnapshot;
use serde::Serialize;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    config_path: Option<String>,
    dump_path: Option<String>,
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let value_after = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        config_path: value_after("--config"),
        dump_path: value_after("--dump"),
    }
}

fn load_config(path: Option<&str>) -> Result<SimConfig, String> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    SimConfig::from_json(&json).map_err(|e| format!("{}: {}", path, e))
}

fn main() {
    let options = parse_args();
    let default_level = if options.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    println!("=== Ascent Simulation Harness ===\n");

    let config = match load_config(options.config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(2);
        }
    };
    log::info!("harness config loaded (seed {:?})", config.generator.seed);

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_config(&config));

    // 2. Running and world clamp
    results.extend(validate_running(&config));

    // 3. Jumping and landing
    results.extend(validate_jumps(&config));

    // 4. Dash and trail
    results.extend(validate_dash(&config));

    // 5. Enemy patrol and attack
    results.extend(validate_enemies(&config));

    // 6. Procedural level
    let final_snapshot = validate_procedural(&config, &mut results);

    // 7. Save/load
    results.extend(validate_persistence(&config));

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

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if let (Some(path), Some(snapshot)) = (options.dump_path.as_deref(), final_snapshot) {
        match dump_snapshot(path, &snapshot, &results) {
            Ok(()) => println!("snapshot written to {}", path),
            Err(e) => eprintln!("failed to write {}: {}", path, e),
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

#[derive(Serialize)]
struct Dump<'a> {
    snapshot: &'a RenderSnapshot,
    results: &'a [TestResult],
}

fn dump_snapshot(path: &str, snapshot: &RenderSnapshot, results: &[TestResult]) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(&Dump { snapshot, results })
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(path, json)
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

/// Full-width floor at the bottom of the screen, player at the configured start
fn flat_session(config: &SimConfig) -> Option<Simulation> {
    let floor_top = config.world.height - config.level.ground_height;
    let floor = Rect::new(0.0, floor_top, config.world.width, config.level.ground_height);
    let layout = LevelLayout::fixed(vec![(floor, Material::Grass)], config.level.player_start);
    Simulation::from_layout(config.clone(), layout).ok()
}

fn penetrations(snap: &RenderSnapshot) -> usize {
    let actors = snap
        .enemies
        .iter()
        .map(|e| e.rect)
        .chain(snap.player.iter().map(|p| p.rect));
    actors
        .map(|a| snap.obstacles.iter().filter(|o| a.intersects(&o.rect)).count())
        .sum()
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(config: &SimConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    results.push(check(
        "config_valid",
        config.validate().is_ok(),
        format!(
            "world {}x{}, {} jumps, dash {} for {} ticks",
            config.world.width,
            config.world.height,
            config.player.max_jumps,
            config.player.dash_speed,
            config.player.dash_duration
        ),
    ));

    let json = serde_json::to_string(config).unwrap_or_default();
    let reparsed = SimConfig::from_json(&json);
    results.push(check(
        "config_json_roundtrip",
        reparsed.is_ok(),
        format!("{} bytes of JSON", json.len()),
    ));

    let mut bad = config.clone();
    bad.player.max_jumps = 0;
    results.push(check(
        "config_rejects_zero_jumps",
        bad.validate().is_err(),
        "max_jumps = 0 rejected".into(),
    ));

    results
}

// ── 2. Running ──────────────────────────────────────────────────────────

fn validate_running(config: &SimConfig) -> Vec<TestResult> {
    println!("--- Running ---");
    let mut results = Vec::new();
    let Some(mut sim) = flat_session(config) else {
        return vec![check("running_setup", false, "layout rejected".into())];
    };

    let max_x = config.world.width - config.player.width;
    let mut monotonic = true;
    let mut last_x = sim.player_body().map_or(0.0, |b| b.rect.x);
    for _ in 0..20 {
        sim.step(&[Command::MoveRight]);
        let x = sim.player_body().map_or(0.0, |b| b.rect.x);
        if !(x > last_x || x == max_x) {
            monotonic = false;
        }
        last_x = x;
    }
    results.push(check(
        "running_monotonic",
        monotonic,
        format!("x = {} after 20 ticks", last_x),
    ));

    let floor_top = config.world.height - config.level.ground_height;
    let y = sim.player_body().map_or(f32::NAN, |b| b.rect.y);
    results.push(check(
        "running_rests_on_floor",
        y == floor_top - config.player.height,
        format!("y = {}", y),
    ));

    for _ in 0..300 {
        sim.step(&[Command::MoveRight]);
    }
    let x = sim.player_body().map_or(0.0, |b| b.rect.x);
    results.push(check(
        "running_clamped",
        x == max_x,
        format!("x = {} (max {})", x, max_x),
    ));

    results
}

// ── 3. Jumps ────────────────────────────────────────────────────────────

fn validate_jumps(config: &SimConfig) -> Vec<TestResult> {
    println!("--- Jumps ---");
    let mut results = Vec::new();
    let Some(mut sim) = flat_session(config) else {
        return vec![check("jumps_setup", false, "layout rejected".into())];
    };
    for _ in 0..30 {
        sim.step(&[]);
    }

    let attempts = config.player.max_jumps + 3;
    let accepted = (0..attempts)
        .filter(|_| sim.step(&[Command::Jump]).has_cue(Cue::Jump))
        .count() as u32;
    results.push(check(
        "jumps_bounded",
        accepted == config.player.max_jumps,
        format!("{} of {} jump requests accepted", accepted, attempts),
    ));

    let mut landed_after = None;
    for t in 0..600 {
        sim.step(&[]);
        if sim.player_body().map_or(false, |b| b.on_ground) {
            landed_after = Some(t);
            break;
        }
    }
    let jumps = sim.player_state().map_or(u32::MAX, |p| p.jumps);
    results.push(check(
        "jumps_reset_on_landing",
        landed_after.is_some() && jumps == 0,
        format!("landed after {:?} ticks, jumps = {}", landed_after, jumps),
    ));

    results
}

// ── 4. Dash ─────────────────────────────────────────────────────────────

fn validate_dash(config: &SimConfig) -> Vec<TestResult> {
    println!("--- Dash ---");
    let mut results = Vec::new();
    let Some(mut sim) = flat_session(config) else {
        return vec![check("dash_setup", false, "layout rejected".into())];
    };

    let first = sim.step(&[Command::Dash(Direction::Right)]).has_cue(Cue::Dash);
    let second = sim.step(&[Command::Dash(Direction::Right)]).has_cue(Cue::Dash);
    results.push(check(
        "dash_blocks_while_active",
        first && !second,
        format!("first accepted: {}, second accepted: {}", first, second),
    ));

    let trail = sim.snapshot().trail.len();
    results.push(check(
        "dash_records_trail",
        trail > 0 && trail <= config.player.trail_capacity,
        format!("{} ghost pose(s)", trail),
    ));

    let wait = config.player.dash_duration.max(config.player.dash_cooldown);
    for _ in 0..wait {
        sim.step(&[]);
    }
    let ended = sim.player_state().map_or(false, |p| !p.is_dashing());
    let cleared = sim.snapshot().trail.is_empty();
    results.push(check(
        "dash_ends_and_clears_trail",
        ended && cleared,
        format!("dashing = {}, trail empty = {}", !ended, cleared),
    ));

    let again = sim.step(&[Command::Dash(Direction::Left)]).has_cue(Cue::Dash);
    results.push(check(
        "dash_after_cooldown",
        again,
        format!("accepted after {} ticks", wait),
    ));

    results
}

// ── 5. Enemies ──────────────────────────────────────────────────────────

fn validate_enemies(config: &SimConfig) -> Vec<TestResult> {
    println!("--- Enemies ---");
    let mut results = Vec::new();

    // Enemy on a floating ledge, player parked far away on the floor
    let floor_top = config.world.height - config.level.ground_height;
    let floor = Rect::new(0.0, floor_top, config.world.width, config.level.ground_height);
    let ledge = Rect::new(300.0, 300.0, 200.0, 20.0);
    let enemy_y = ledge.top() - config.enemy.height;
    let layout = LevelLayout::fixed(
        vec![(floor, Material::Grass), (ledge, Material::Stone)],
        Vec2::new(0.0, floor_top - config.player.height),
    )
    .with_enemy(Vec2::new(400.0, enemy_y));

    let Ok(mut sim) = Simulation::from_layout(config.clone(), layout) else {
        return vec![check("enemy_setup", false, "layout rejected".into())];
    };

    let mut min_x = f32::MAX;
    let mut max_x = f32::MIN;
    for _ in 0..600 {
        sim.step(&[]);
        if let Some(enemy) = sim.snapshot().enemies.first() {
            min_x = min_x.min(enemy.rect.x);
            max_x = max_x.max(enemy.rect.x);
        }
    }
    let stayed = sim
        .snapshot()
        .enemies
        .first()
        .map_or(false, |e| e.rect.y == enemy_y);
    results.push(check(
        "enemy_patrols_ledge",
        stayed && min_x < max_x,
        format!("x range [{}, {}], still on ledge: {}", min_x, max_x, stayed),
    ));

    // Player standing inside an enemy's reach
    let layout = LevelLayout::fixed(
        vec![(floor, Material::Grass)],
        Vec2::new(200.0, floor_top - config.player.height),
    )
    .with_enemy(Vec2::new(210.0, floor_top - config.enemy.height));
    let Ok(mut sim) = Simulation::from_layout(config.clone(), layout) else {
        return results;
    };
    let mut hits = 0;
    let mut died = false;
    for _ in 0..(config.enemy.attack_cooldown * 20) {
        let report = sim.step(&[]);
        hits += report.cues.iter().filter(|c| **c == Cue::DamageInflicted).count();
        if report.status.is_over() {
            died = true;
            break;
        }
    }
    let health = sim.player_health().map_or(-1, |h| h.current);
    results.push(check(
        "enemy_attack_cadence",
        hits > 0 && health >= 0,
        format!("{} hit(s), player health {}, died: {}", hits, health, died),
    ));

    results
}

// ── 6. Procedural level ─────────────────────────────────────────────────

fn validate_procedural(config: &SimConfig, results: &mut Vec<TestResult>) -> Option<RenderSnapshot> {
    println!("--- Procedural Level ---");
    let Ok(mut sim) = Simulation::new(config.clone()) else {
        results.push(check("procedural_setup", false, "config rejected".into()));
        return None;
    };

    let start_count = sim.obstacle_count();
    results.push(check(
        "procedural_initial_count",
        start_count == config.generator.target_count,
        format!("{} obstacle(s), seed {}", start_count, sim.seed()),
    ));

    let script = [
        vec![Command::MoveRight],
        vec![Command::Jump],
        vec![],
        vec![Command::Jump],
        vec![Command::MoveLeft],
        vec![Command::Shoot],
        vec![],
        vec![Command::Stop],
    ];
    let mut overlaps = 0;
    let mut ticks = 0;
    for i in 0..1200 {
        let report = sim.step(&script[i % script.len()]);
        ticks += 1;
        overlaps += penetrations(&sim.snapshot());
        if report.status.is_over() {
            break;
        }
    }
    results.push(check(
        "procedural_no_penetration",
        overlaps == 0,
        format!("{} overlap(s) over {} ticks, score {}", overlaps, ticks, sim.score()),
    ));

    let snap = sim.snapshot();
    let pairwise_clear = snap.obstacles.iter().enumerate().all(|(i, a)| {
        snap.obstacles[i + 1..]
            .iter()
            .all(|b| !a.rect.intersects(&b.rect))
    });
    results.push(check(
        "procedural_platforms_disjoint",
        pairwise_clear,
        format!("{} obstacle(s) on screen", snap.obstacles.len()),
    ));

    Some(snap)
}

// ── 7. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(config: &SimConfig) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let Some(mut sim) = flat_session(config) else {
        return vec![check("persistence_setup", false, "layout rejected".into())];
    };
    for _ in 0..25 {
        sim.step(&[Command::MoveRight]);
    }

    let mut buffer = Vec::new();
    if let Err(e) = sim.save(&mut buffer) {
        return vec![check("persistence_save", false, e.to_string())];
    }
    let restored = match Simulation::load(&buffer[..]) {
        Ok(s) => s,
        Err(e) => return vec![check("persistence_load", false, e.to_string())],
    };

    let same_body = restored.player_body().map(|b| b.rect) == sim.player_body().map(|b| b.rect);
    vec![check(
        "persistence_roundtrip",
        same_body && restored.current_tick() == sim.current_tick(),
        format!("{} bytes, tick {}", buffer.len(), restored.current_tick()),
    )]
}
