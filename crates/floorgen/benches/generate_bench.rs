//! Criterion benches for the search.
//!
//! - One annealed layout for cycles of 4 and 6 rooms.
//! - Two rooms joined by a corridor.
//!
//! Sample counts are kept low; a single generation runs thousands of
//! annealing proposals.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use floorgen::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn cycle_map(rooms: usize) -> MapDescription {
    let mut map = MapDescription::new();
    for i in 0..rooms {
        map.add_room(i).unwrap();
    }
    for i in 0..rooms {
        map.add_passage(i, (i + 1) % rooms).unwrap();
    }
    let mode = DoorMode::overlap(1, 1).unwrap();
    map.add_room_shapes(RoomTemplate::new(Polygon::square(8).unwrap(), mode.clone()), true, 1.0)
        .unwrap();
    map.add_room_shapes(RoomTemplate::new(Polygon::rectangle(6, 10).unwrap(), mode), true, 1.0)
        .unwrap();
    map
}

fn corridor_map() -> MapDescription {
    let mut map = MapDescription::new();
    map.add_room(0).unwrap();
    map.add_room(1).unwrap();
    map.add_corridor_room(2).unwrap();
    map.add_passage(0, 2).unwrap();
    map.add_passage(2, 1).unwrap();
    map.add_room_shapes(
        RoomTemplate::new(Polygon::square(6).unwrap(), DoorMode::overlap(1, 1).unwrap()),
        true,
        1.0,
    )
    .unwrap();
    map.add_corridor_shapes(
        RoomTemplate::new(Polygon::square(2).unwrap(), DoorMode::overlap(1, 0).unwrap()),
        true,
        1.0,
    )
    .unwrap();
    map.set_corridor_offsets(vec![2]).unwrap();
    map
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sample_size(10);
    let cfg = GeneratorCfg {
        anneal: AnnealCfg {
            cycles: 20,
            trials_per_cycle: 200,
            ..AnnealCfg::default()
        },
        ..GeneratorCfg::default()
    };

    for rooms in [4usize, 6] {
        let generator = LayoutGenerator::new(&cycle_map(rooms), cfg.clone()).unwrap();
        group.bench_with_input(BenchmarkId::new("cycle", rooms), &rooms, |b, _| {
            let mut seed = 0u64;
            b.iter_batched(
                || {
                    seed += 1;
                    StdRng::seed_from_u64(seed)
                },
                |mut rng| generator.generate_layouts(1, &mut rng).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }

    let generator = LayoutGenerator::new(&corridor_map(), cfg).unwrap();
    group.bench_function(BenchmarkId::new("corridor", "2+1"), |b| {
        let mut seed = 0u64;
        b.iter_batched(
            || {
                seed += 1;
                StdRng::seed_from_u64(seed)
            },
            |mut rng| generator.generate_layouts(1, &mut rng).unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("generator_new");
    for rooms in [4usize, 8] {
        let map = cycle_map(rooms);
        group.bench_with_input(BenchmarkId::new("cycle", rooms), &map, |b, map| {
            b.iter(|| LayoutGenerator::new(map, GeneratorCfg::default()).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_setup);
criterion_main!(benches);
