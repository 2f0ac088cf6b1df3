//! CivSim Headless Simulation Harness
//!
//! Runs a scripted, seeded civilization in-process and validates the
//! engine invariants along the way. No rendering, no world, no UI.
//!
//! Usage:
//!   cargo run -p civsim-simtest
//!   cargo run -p civsim-simtest -- --verbose --seed 7 --seconds 900
//!   cargo run -p civsim-simtest -- --catalog catalog.json --config sim.json --save run.bin
//!
//! `RUST_LOG` controls engine logging (default `warn`, `info` with `--verbose`).

use std::cell::Cell;
use std::rc::Rc;

use civsim_core::catalog::Catalog;
use civsim_core::components::{BlockKind, ResourceKind, Vec3, WorkOrder};
use civsim_core::config::SimConfig;
use civsim_core::engine::Civilization;
use civsim_core::host::{CivEvent, Hosts, Notifier, WorldHost};
use civsim_core::persistence::SaveData;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

struct Options {
    verbose: bool,
    seed: Option<u64>,
    seconds: u32,
    catalog: Option<String>,
    config: Option<String>,
    save: Option<String>,
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_options() -> Options {
    let args: Vec<String> = std::env::args().collect();
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        seed: flag_value(&args, "--seed").and_then(|s| s.parse().ok()),
        seconds: flag_value(&args, "--seconds")
            .and_then(|s| s.parse().ok())
            .unwrap_or(600),
        catalog: flag_value(&args, "--catalog"),
        config: flag_value(&args, "--config"),
        save: flag_value(&args, "--save"),
    }
}

// ── Hosts ───────────────────────────────────────────────────────────────

/// Flat terrain at height 0 that only counts placed blocks
struct FlatWorld {
    placed: Rc<Cell<usize>>,
}

impl WorldHost for FlatWorld {
    fn safe_spawn_point(&mut self, near: Vec3) -> Option<Vec3> {
        Some(near.with_height(1.0))
    }

    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(0.0)
    }

    fn set_block(&mut self, _x: i32, _y: i32, _z: i32, _block: BlockKind) {
        self.placed.set(self.placed.get() + 1);
    }
}

/// Prints event messages when verbose
struct ConsoleNotifier {
    verbose: bool,
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, event: &CivEvent) {
        if self.verbose {
            println!("    [event] {}", event.message());
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let opts = parse_options();
    let default_filter = if opts.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    println!("=== CivSim Simulation Harness ===\n");

    let catalog = match &opts.catalog {
        Some(path) => match Catalog::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load catalog {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => Catalog::standard(),
    };
    let mut config = match &opts.config {
        Some(path) => match SimConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => SimConfig::default(),
    };
    // --seed wins over the config file; an unseeded run still replays
    config.seed = opts.seed.or(config.seed).or(Some(42));

    let mut results = Vec::new();

    // 1. Catalog consistency
    results.extend(validate_catalog(&catalog, opts.verbose));

    // 2. Scripted run with per-second invariants
    let (civ, run_results) = run_scripted(catalog, config, &opts);
    results.extend(run_results);

    // 3. Persistence round-trips
    results.extend(validate_persistence(&civ, &opts));

    // ── Summary ──
    println!();
    match serde_json::to_string_pretty(&civ.stats()) {
        Ok(json) => println!("Final stats:\n{}", json),
        Err(e) => println!("Final stats unavailable: {}", e),
    }

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    println!();
    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &Catalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();

    let buildings = catalog.buildings().count();
    let technologies = catalog.technologies().count();
    results.push(TestResult::check(
        "catalog_not_empty",
        buildings > 0 && technologies > 0,
        format!("{} buildings, {} technologies", buildings, technologies),
    ));

    // A gated building must not be gated by a technology from a later age
    let mut late_gates = Vec::new();
    for building in catalog.buildings() {
        for tech in catalog.gating_technologies(&building.key) {
            if tech.age > building.age {
                late_gates.push(format!("{} <- {}", building.key, tech.key));
            }
        }
    }
    results.push(TestResult::check(
        "gates_precede_buildings",
        late_gates.is_empty(),
        if late_gates.is_empty() {
            "every gate is reachable in time".to_string()
        } else {
            late_gates.join(", ")
        },
    ));

    let roundtrip = catalog
        .to_json()
        .and_then(|json| Catalog::from_json(&json))
        .map(|loaded| loaded == *catalog);
    results.push(TestResult::check(
        "catalog_json_roundtrip",
        matches!(roundtrip, Ok(true)),
        format!("{:?}", roundtrip.map_err(|e| e.to_string())),
    ));

    if verbose {
        for building in catalog.buildings() {
            println!(
                "  {:<12} age={:<6} build={:>4.0}s slots={} housing={}",
                building.key,
                building.age.name(),
                building.build_time,
                building.work_slots,
                building.housing_capacity
            );
        }
    }
    results
}

// ── 2. Scripted run ─────────────────────────────────────────────────────

const BUILD_PLAN: &[&str] = &[
    "campfire",
    "hut",
    "farm_plot",
    "hut",
    "lumber_camp",
    "storage_pit",
    "farm_plot",
    "quarry",
    "longhouse",
    "shrine",
    "granary",
    "mine",
    "workshop",
];

fn run_scripted(catalog: Catalog, config: SimConfig, opts: &Options) -> (Civilization, Vec<TestResult>) {
    println!("--- Scripted run ({}s, seed {:?}) ---", opts.seconds, config.seed);
    let mut results = Vec::new();

    let placed = Rc::new(Cell::new(0));
    let hosts = Hosts::default()
        .with_world(FlatWorld {
            placed: Rc::clone(&placed),
        })
        .with_notifier(ConsoleNotifier {
            verbose: opts.verbose,
        });
    log::info!("Harness run: seed {:?}, {} seconds", config.seed, opts.seconds);
    let mut civ = Civilization::new(catalog, config).with_hosts(hosts);
    let home = civ.found_settlement("Ashford", Vec3::ZERO, 40.0);
    let mut second = None;
    let mut posted_work = false;

    let mut plan = BUILD_PLAN.iter().peekable();
    let mut slot = 0u32;
    let mut violations: Vec<String> = Vec::new();
    let mut completed = 0usize;

    for t in 0..opts.seconds {
        if t % 5 == 0 {
            // Queue the next planned building once it is buildable
            if let Some(&&key) = plan.peek() {
                if civ.catalog().building(key).is_none() {
                    plan.next();
                } else if civ.can_build_building(key) {
                    let position = Vec3::new((slot % 4) as f32 * 8.0, 0.0, (slot / 4) as f32 * 8.0);
                    if civ.queue_building(home, key, position).is_ok() {
                        slot += 1;
                        plan.next();
                    }
                }
            }

            let affordable: Vec<String> = civ
                .available_technologies()
                .into_iter()
                .filter(|t| t.cost <= civ.research_points())
                .map(|t| t.key.clone())
                .collect();
            for key in affordable {
                let _ = civ.unlock_technology(&key);
            }
        }

        if !posted_work && civ.is_feature_unlocked("work_orders") {
            log::info!("Work orders unlocked at t={}", t);
            civ.post_work_order(WorkOrder::new("clear_brush", 1, civ.sim_time()).with_work_time(5.0));
            posted_work = true;
        }

        if second.is_none() && civ.population() >= 6 {
            second = Some(civ.found_settlement("Birchmere", Vec3::new(120.0, 0.0, 40.0), 30.0));
        }

        civ.update(1.0);
        completed += civ
            .drain_events()
            .iter()
            .filter(|e| matches!(e, CivEvent::BuildingCompleted { .. }))
            .count();

        // Invariants
        if let Some((kind, amount)) = civ.stockpile().iter().find(|(_, a)| *a < 0.0) {
            violations.push(format!("t={} {} = {}", t, kind.name(), amount));
        }
        let happiness = civ.happiness();
        if !(0.0..=100.0).contains(&happiness) {
            violations.push(format!("t={} happiness = {}", t, happiness));
        }
        let rostered: usize = civ.settlements().map(|s| s.population()).sum();
        if rostered != civ.population() as usize {
            violations.push(format!(
                "t={} population {} != rostered {}",
                t,
                civ.population(),
                rostered
            ));
        }
    }

    results.push(TestResult::check(
        "invariants_hold",
        violations.is_empty(),
        if violations.is_empty() {
            format!("{} seconds checked", opts.seconds)
        } else {
            violations.into_iter().take(5).collect::<Vec<_>>().join("; ")
        },
    ));

    let built: usize = civ.settlements().map(|s| s.buildings.len()).sum();
    results.push(TestResult::check(
        "buildings_completed",
        built > 0 && built == completed,
        format!("{} built, {} completion events", built, completed),
    ));

    results.push(TestResult::check(
        "footprints_placed",
        placed.get() > 0 || built == 0,
        format!("{} blocks placed", placed.get()),
    ));

    let first = civ.stats();
    let again = civ.stats();
    results.push(TestResult::check(
        "stats_idempotent",
        first == again,
        format!(
            "population {}, happiness {}, storage {:.0}",
            first.population, first.happiness, first.storage_capacity
        ),
    ));

    results.push(TestResult::check(
        "food_tracked",
        civ.stockpile().get(ResourceKind::Food) >= 0.0,
        format!("{:.1} food", civ.stockpile().get(ResourceKind::Food)),
    ));

    if opts.verbose {
        for settlement in civ.settlements() {
            println!(
                "  {} `{}`: {} villagers, {} buildings, {} queued",
                settlement.id,
                settlement.name,
                settlement.population(),
                settlement.buildings.len(),
                settlement.build_queue.len()
            );
        }
        if let Some(id) = second {
            if let Ok(roster) = civ.roster(id) {
                for v in roster {
                    println!("    {} - {}", v.name, v.profession.name());
                }
            }
        }
    }

    (civ, results)
}

// ── 3. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(civ: &Civilization, opts: &Options) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();
    let snapshot = civ.serialize();

    let mut bytes = Vec::new();
    let bincode_ok = civ.save(&mut bytes).and_then(|_| {
        let mut restored = Civilization::new(civ.catalog().clone(), civ.config().clone());
        restored.load(&bytes[..])?;
        Ok(restored.serialize() == snapshot && restored.stats() == civ.stats())
    });
    results.push(TestResult::check(
        "bincode_roundtrip",
        matches!(bincode_ok, Ok(true)),
        format!("{} bytes, {:?}", bytes.len(), bincode_ok.map_err(|e| e.to_string())),
    ));

    let json_ok = snapshot
        .to_json()
        .and_then(|json| SaveData::from_json(&json))
        .map(|data| data == snapshot);
    results.push(TestResult::check(
        "json_roundtrip",
        matches!(json_ok, Ok(true)),
        format!("{:?}", json_ok.map_err(|e| e.to_string())),
    ));

    if let Some(path) = &opts.save {
        let written = std::fs::File::create(path)
            .map_err(civsim_core::persistence::SaveError::from)
            .and_then(|file| civ.save(std::io::BufWriter::new(file)));
        results.push(TestResult::check(
            "save_file",
            written.is_ok(),
            match written {
                Ok(()) => format!("wrote {}", path),
                Err(e) => e.to_string(),
            },
        ));
    }

    results
}
