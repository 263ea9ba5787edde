use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use mazes3d::{
    generators::{self, MazeGenerator},
    maze::{LevelDimensions, Maze3D},
    units::{ColumnsCount, RowsCount},
};

fn maze_4_levels_32() -> Maze3D {
    Maze3D::new(vec![LevelDimensions::new(RowsCount(32), ColumnsCount(32)); 4])
}

fn bench_prim_maze_4x32x32(c: &mut Criterion) {
    let mut maze = maze_4_levels_32();
    let mut generator = generators::PrimGenerator::new(StdRng::seed_from_u64(1));
    c.bench_function("prim_maze_4x32x32", move |b| {
        b.iter(|| generator.generate_maze(&mut maze))
    });
}

fn bench_wilson_maze_4x32x32(c: &mut Criterion) {
    let mut maze = maze_4_levels_32();
    let mut generator = generators::WilsonGenerator::new(StdRng::seed_from_u64(1));
    c.bench_function("wilson_maze_4x32x32", move |b| {
        b.iter(|| generator.generate_maze(&mut maze))
    });
}

fn bench_recursive_backtracker_maze_4x32x32(c: &mut Criterion) {
    let mut maze = maze_4_levels_32();
    let mut generator = generators::RecursiveBacktrackerGenerator::new(StdRng::seed_from_u64(1));
    c.bench_function("recursive_backtracker_maze_4x32x32", move |b| {
        b.iter(|| generator.generate_maze(&mut maze))
    });
}

fn bench_recursive_backtracker_maze_6x120x120(c: &mut Criterion) {
    let mut maze = Maze3D::new(vec![LevelDimensions::new(RowsCount(120), ColumnsCount(120)); 6]);
    let mut generator = generators::RecursiveBacktrackerGenerator::new(StdRng::seed_from_u64(1));
    let mut group = c.benchmark_group("large");
    group.sample_size(10);
    group.bench_function("recursive_backtracker_maze_6x120x120", move |b| {
        b.iter(|| generator.generate_maze(&mut maze))
    });
    group.finish();
}

fn bench_kruskal_maze_4x32x32(c: &mut Criterion) {
    let mut maze = maze_4_levels_32();
    let mut generator = generators::KruskalGenerator::new(StdRng::seed_from_u64(1));
    c.bench_function("kruskal_maze_4x32x32", move |b| {
        b.iter(|| generator.generate_maze(&mut maze))
    });
}

fn bench_pledge_shaped_maze_4x32x32(c: &mut Criterion) {
    let mut maze = maze_4_levels_32();
    let mut generator = generators::TaskDGenerator::new("pledge", StdRng::seed_from_u64(1));
    c.bench_function("pledge_shaped_maze_4x32x32", move |b| {
        b.iter(|| generator.generate_maze(&mut maze))
    });
}

criterion_group!(
    benches,
    bench_prim_maze_4x32x32,
    bench_wilson_maze_4x32x32,
    bench_recursive_backtracker_maze_4x32x32,
    bench_recursive_backtracker_maze_6x120x120,
    bench_kruskal_maze_4x32x32,
    bench_pledge_shaped_maze_4x32x32
);
criterion_main!(benches);
