//! Frame cost with a fully populated world

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use deep_feast::simulation::InputEvent;
use deep_feast::{GameConfig, Simulation};

fn warmed_up(seed: u64) -> Simulation {
    let mut sim = Simulation::new(GameConfig { seed, ..GameConfig::default() });
    sim.start();
    sim.handle_input(InputEvent::KeyDown("KeyW".into()));
    for _ in 0..120 {
        sim.tick(1.0 / 60.0);
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut sim = warmed_up(7);
    c.bench_function("tick_60hz", |b| {
        b.iter(|| {
            if !sim.store().is_playing() {
                sim.start();
            }
            black_box(sim.tick(black_box(1.0 / 60.0)))
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let sim = warmed_up(8);
    c.bench_function("render_snapshot", |b| b.iter(|| black_box(sim.snapshot())));
}

criterion_group!(benches, bench_tick, bench_snapshot);
criterion_main!(benches);
