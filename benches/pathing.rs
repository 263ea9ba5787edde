use criterion::{
    Criterion,
    criterion_group,
    criterion_main
};
use rand::{rngs::StdRng, SeedableRng};
use mazes3d::cells::Coordinate3D;
use mazes3d::generators::{MazeGenerator, RecursiveBacktrackerGenerator};
use mazes3d::maze::{LevelDimensions, Maze3D};
use mazes3d::pathing;
use mazes3d::selectors;
use mazes3d::units::{ColumnsCount, RowsCount};

fn large_maze() -> Maze3D {
    let mut maze = Maze3D::new(vec![LevelDimensions::new(RowsCount(120), ColumnsCount(120)); 6]);
    maze.add_entrance(Coordinate3D::new(0, -1, 0)).unwrap();
    maze.add_exit(Coordinate3D::new(5, 120, 119)).unwrap();
    RecursiveBacktrackerGenerator::new(StdRng::seed_from_u64(1))
        .generate_maze(&mut maze)
        .unwrap();
    maze
}

fn bench_distances(c: &mut Criterion) {
    c.bench_function("distances", |b| {
        let maze = large_maze();
        let start_coord = Coordinate3D::new(2, 60, 60);
        b.iter(|| pathing::Distances::new(&maze, start_coord))
    });
}

fn bench_shortest_path(c: &mut Criterion) {
    c.bench_function("shortest_path", |b| {
        let maze = large_maze();
        let distances = pathing::Distances::new(&maze, Coordinate3D::new(2, 60, 60)).unwrap();
        let end_coord = Coordinate3D::new(0, 0, 0);
        b.iter(|| pathing::shortest_path(&distances, end_coord))
    });
}

fn bench_solvers(c: &mut Criterion) {
    let maze = large_maze();
    for name in selectors::SOLVER_NAMES.iter() {
        let mut solver = selectors::construct_solver(name, 1).unwrap();
        c.bench_function(&format!("{}_solver", name), |b| {
            b.iter(|| solver.solve_maze(&maze, Coordinate3D::new(0, -1, 0)))
        });
    }
}

criterion_group!(benches,
    bench_distances,
    bench_shortest_path,
    bench_solvers
);
criterion_main!(benches);
