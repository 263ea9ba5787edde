//! Construction of generators and solvers by name, each with its own seeded random source.

use rand::{rngs::StdRng, SeedableRng};

use crate::generators::{KruskalGenerator, MazeGenerator, PrimGenerator, RecursiveBacktrackerGenerator,
                        TaskDGenerator, WilsonGenerator};
use crate::solvers::{MazeSolver, NearestPairSolver, PledgeSolver, RecursiveBacktrackSolver,
                     WallFollowingSolver};

pub const GENERATOR_NAMES: [&str; 5] = ["prim", "wilson", "recur", "kruskal", "taskd"];
pub const SOLVER_NAMES: [&str; 4] = ["recur", "wall", "pledge", "taskC"];

/// The named generator, None for an unknown name. `taskd` targets the nearest pair solver,
/// use `match_generator` to target another.
pub fn construct_generator(name: &str, seed: u64) -> Option<Box<dyn MazeGenerator>> {
    let rng = StdRng::seed_from_u64(seed);
    let generator: Box<dyn MazeGenerator> = match name {
        "prim" => Box::new(PrimGenerator::new(rng)),
        "wilson" => Box::new(WilsonGenerator::new(rng)),
        "recur" => Box::new(RecursiveBacktrackerGenerator::new(rng)),
        "kruskal" => Box::new(KruskalGenerator::new(rng)),
        "taskd" => Box::new(TaskDGenerator::new("taskC", rng)),
        _ => return None,
    };
    Some(generator)
}

/// A task D generator shaping its mazes for the named solver.
pub fn match_generator(solver_name: &str, seed: u64) -> Box<dyn MazeGenerator> {
    Box::new(TaskDGenerator::new(solver_name, StdRng::seed_from_u64(seed)))
}

/// The named solver, None for an unknown name.
pub fn construct_solver(name: &str, seed: u64) -> Option<Box<dyn MazeSolver>> {
    let solver: Box<dyn MazeSolver> = match name {
        "recur" => Box::new(RecursiveBacktrackSolver::new(StdRng::seed_from_u64(seed))),
        "wall" => Box::new(WallFollowingSolver::new()),
        "pledge" => Box::new(PledgeSolver::new(StdRng::seed_from_u64(seed))),
        "taskC" => Box::new(NearestPairSolver::new()),
        _ => return None,
    };
    Some(solver)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::cells::Coordinate3D;
    use crate::maze::{LevelDimensions, Maze3D};
    use crate::units::{ColumnsCount, RowsCount};

    fn maze() -> Maze3D {
        let mut maze = Maze3D::new(vec![LevelDimensions::new(RowsCount(4), ColumnsCount(4)),
                                        LevelDimensions::new(RowsCount(3), ColumnsCount(5))]);
        maze.add_entrance(Coordinate3D::new(0, -1, 0)).unwrap();
        maze.add_exit(Coordinate3D::new(1, 3, 4)).unwrap();
        maze
    }

    #[test]
    fn every_named_generator_exists() {
        for name in GENERATOR_NAMES.iter() {
            let generator = construct_generator(name, 7).expect("unknown generator");
            assert_eq!(generator.name(), *name);
        }
        assert!(construct_generator("aldous-broder", 7).is_none());
    }

    #[test]
    fn every_named_solver_exists() {
        for name in SOLVER_NAMES.iter() {
            let solver = construct_solver(name, 7).expect("unknown solver");
            assert_eq!(solver.name(), *name);
        }
        assert!(construct_solver("dead-end-filler", 7).is_none());
    }

    #[test]
    fn matched_generators_make_solvable_mazes() {
        for name in SOLVER_NAMES.iter() {
            for seed in 0..5 {
                let mut maze = maze();
                let mut generator = match_generator(name, seed);
                generator.generate_maze(&mut maze).expect("generation failed");
                assert!(generator.is_maze_generated());

                let mut solver = construct_solver(name, seed).expect("unknown solver");
                solver.solve_maze(&maze, Coordinate3D::new(0, -1, 0));
                assert!(solver.is_solved(), "{} seed {}", name, seed);
            }
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let passages = |seed| {
            let mut maze = maze();
            construct_generator("wilson", seed).unwrap().generate_maze(&mut maze).unwrap();
            let mut passages = maze.iter_passages().collect::<Vec<_>>();
            passages.sort();
            passages
        };
        assert_eq!(passages(3), passages(3));
    }
}
