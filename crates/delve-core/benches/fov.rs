use criterion::{black_box, criterion_group, criterion_main, Criterion};

use delve_core::components::Point;
use delve_core::config::GameConfig;
use delve_core::generation::{MapBuilder, RoomsAndCorridors};
use delve_core::grid::Grid;
use delve_core::systems::fov;

fn open_grid(width: i32, height: i32) -> Grid {
    let mut grid = Grid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            grid.set_cell_properties(x, y, true, true).unwrap();
        }
    }
    grid
}

fn bench_open_map(c: &mut Criterion) {
    let grid = open_grid(80, 48);
    c.bench_function("fov_open_80x48_r15", |b| {
        b.iter(|| fov::visible_cells(black_box(&grid), black_box(Point::new(40, 24)), 15))
    });
}

fn bench_generated_map(c: &mut Criterion) {
    let config = GameConfig::default();
    let map = RoomsAndCorridors::new(config, 42).build(1).unwrap();
    let origin = map.stairs_up.position;
    c.bench_function("fov_generated_r15", |b| {
        b.iter(|| fov::visible_cells(black_box(map.grid()), black_box(origin), 15))
    });

    let mut grid = map.grid().clone();
    c.bench_function("grid_compute_fov_generated_r15", |b| {
        b.iter(|| grid.compute_field_of_view(origin.x, origin.y, 15).unwrap())
    });
}

criterion_group!(benches, bench_open_map, bench_generated_map);
criterion_main!(benches);
