//! # ARENA Soak Run
//!
//! Headless stress run: mover threads walk single-dot objects around a
//! shared world while an observer counts the events it sees.
//!
//! ```bash
//! # Defaults: 100x100 area, 8 movers, 5 seconds
//! RUST_LOG=debug ./arena_soak
//!
//! # Custom config, movers and duration
//! ./arena_soak arena.toml 32 30
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use arena::core::{StopHandle, StopSignal};
use arena::shared::{Direction, Location};
use arena::{EventKind, World, WorldConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Object walked around by one mover thread.
#[derive(Debug)]
struct Walker {
    #[allow(dead_code)]
    id: usize,
}

/// Per-mover outcome counters.
#[derive(Default)]
struct MoverStats {
    moves: AtomicU64,
    blocked: AtomicU64,
}

#[allow(clippy::cast_precision_loss)]
fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => WorldConfig::from_toml_file(path),
        None => Ok(WorldConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ FATAL: {e}");
            std::process::exit(1);
        }
    };
    let movers: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(8);
    let seconds: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(5);

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                        ARENA SOAK v0.1.0");
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Area:     {}x{}", config.width, config.height);
    println!("  Shards:   {}", config.playground.shard_count);
    println!("  Movers:   {movers}");
    println!("  Duration: {seconds}s");
    println!();

    let world: Arc<World<Walker>> = match World::new(&config) {
        Ok(world) => Arc::new(world),
        Err(e) => {
            eprintln!("✗ FATAL: {e}");
            std::process::exit(1);
        }
    };

    let (handle, stop) = StopHandle::new();
    world.start(&stop);

    let observer = spawn_observer(&world, &stop);
    let stats = Arc::new(MoverStats::default());
    let workers: Vec<_> = (0..movers)
        .map(|id| {
            let world = Arc::clone(&world);
            let stats = Arc::clone(&stats);
            let stop = stop.clone();
            thread::spawn(move || run_mover(id, &world, &stats, &stop))
        })
        .collect();

    let started = Instant::now();
    thread::sleep(Duration::from_secs(seconds));
    handle.stop();

    for (id, worker) in workers.into_iter().enumerate() {
        if worker.join().is_err() {
            tracing::warn!(mover = id, "mover thread panicked");
        }
    }
    let seen = observer.join().unwrap_or_else(|_| {
        tracing::warn!("observer thread panicked");
        HashMap::new()
    });
    let elapsed = started.elapsed().as_secs_f64();

    let moves = stats.moves.load(Ordering::Relaxed);
    let blocked = stats.blocked.load(Ordering::Relaxed);
    let world_stats = world.stats();

    println!("  Moves:    {moves} ({:.0}/s)", moves as f64 / elapsed);
    println!("  Blocked:  {blocked}");
    println!("  Objects:  {}", world_stats.objects);
    println!("  Occupied: {}", world_stats.occupied_dots);
    for kind in [
        EventKind::Created,
        EventKind::Updated,
        EventKind::Deleted,
        EventKind::Checked,
        EventKind::Error,
    ] {
        println!("  {kind:?}: {}", seen.get(&kind).copied().unwrap_or(0));
    }

    if world_stats.objects != world_stats.occupied_dots {
        eprintln!("✗ registry and occupancy disagree after shutdown");
        std::process::exit(1);
    }
    println!("✓ soak finished");
}

/// Counts events by kind until the subscription ends.
fn spawn_observer(
    world: &Arc<World<Walker>>,
    stop: &StopSignal,
) -> thread::JoinHandle<HashMap<EventKind, u64>> {
    let events = world.events(stop, 1024);
    thread::spawn(move || {
        let mut seen = HashMap::new();
        for event in events {
            *seen.entry(event.kind()).or_insert(0) += 1;
        }
        seen
    })
}

/// Walks one object until `stop` fires, turning when blocked.
fn run_mover(id: usize, world: &World<Walker>, stats: &MoverStats, stop: &StopSignal) {
    let walker = Arc::new(Walker { id });
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);

    let Ok(mut location) = world.create_object_random_dot(&walker) else {
        tracing::warn!(mover = id, "no free dot to start on");
        return;
    };
    let mut direction = Direction::random(&mut rng);

    while !stop.is_stopped() {
        let Some(head) = location.dot(0) else {
            break;
        };
        let Ok(next) = world.navigate(head, direction, 1) else {
            break;
        };
        let target = Location::from(next);

        if world.update_object(&walker, &location, &target).is_ok() {
            location = target;
            stats.moves.fetch_add(1, Ordering::Relaxed);
        } else {
            direction = Direction::random(&mut rng);
            stats.blocked.fetch_add(1, Ordering::Relaxed);
        }
    }

    if let Err(err) = world.delete_object(&walker, &location) {
        tracing::warn!(mover = id, %err, "failed to remove walker");
    }
}
