use log::{debug, info, warn};
use rand::Rng;

use crate::cells::{Coordinate3D, CoordinateSmallVec, Direction};
use crate::maze::Maze3D;
use crate::pathing::{self, Distances, PathStep, SolverRecord};
use crate::utils;

/// Common capability of every maze solver.
///
/// A solve never mutates the maze, its outcome is kept in a `SolverRecord` that is reset by the
/// next solve. An invalid or blocked entrance leaves an unsolved record holding just the entrance.
pub trait MazeSolver {
    fn name(&self) -> &'static str;
    fn solve_maze(&mut self, maze: &Maze3D, entrance: Coordinate3D);
    fn record(&self) -> &SolverRecord;

    fn solver_path(&self) -> &[PathStep] {
        self.record().path()
    }

    fn cells_explored(&self) -> usize {
        self.record().explored()
    }

    fn entrance_used(&self) -> Option<Coordinate3D> {
        self.record().entrance()
    }

    fn exit_used(&self) -> Option<Coordinate3D> {
        self.record().exit()
    }

    fn is_solved(&self) -> bool {
        self.record().is_solved()
    }
}

/// Depth first search through open passages, neighbour order picked at random.
#[derive(Debug)]
pub struct RecursiveBacktrackSolver<R: Rng> {
    rng: R,
    record: SolverRecord,
}

impl<R: Rng> RecursiveBacktrackSolver<R> {
    pub fn new(rng: R) -> RecursiveBacktrackSolver<R> {
        RecursiveBacktrackSolver { rng, record: SolverRecord::new() }
    }
}

impl<R: Rng> MazeSolver for RecursiveBacktrackSolver<R> {
    fn name(&self) -> &'static str {
        "recur"
    }

    fn solve_maze(&mut self, maze: &Maze3D, entrance: Coordinate3D) {
        self.record.reset();
        self.record.start_at(entrance);
        if !maze.has_cell(entrance) {
            warn!("entrance {} is not a cell of the maze", entrance);
            return;
        }

        let mut visited = utils::fnv_hashset(maze.total_cells());
        visited.insert(entrance);
        let mut stack = vec![entrance];

        while let Some(&current) = stack.last() {
            if current != entrance && maze.exits().contains(&current) {
                self.record.mark_solved(current);
                break;
            }

            let unvisited = maze.neighbours(current)
                .into_iter()
                .filter(|next| !visited.contains(next) && pathing::is_passable(maze, current, *next))
                .collect::<CoordinateSmallVec>();

            if let Some(next) = utils::random_choice(&mut self.rng, &unvisited) {
                visited.insert(next);
                stack.push(next);
                self.record.push(PathStep::forward(next));
            } else {
                stack.pop();
                if let Some(&back) = stack.last() {
                    self.record.push(PathStep::retreat(back));
                }
            }
        }

        self.record.add_explored(visited.len());
        if self.record.is_solved() {
            info!("Recursive Backtrack solver reached an exit");
        } else {
            warn!("Recursive Backtrack solver found no exit from {}", entrance);
        }
    }

    fn record(&self) -> &SolverRecord {
        &self.record
    }
}

/// Why a walking solver gave up and finished by breadth first search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// A walk state came round again.
    Repeated,
    /// The move or state budget ran out.
    OutOfMoves,
    /// A full rotation in place found no way on.
    ClosedIn,
}

/// Right hand wall follower over the six direction turn cycle.
///
/// Revisiting a `(cell, facing)` state means the walk is circling, the remaining route is then
/// found by breadth first search. So is seeing more distinct states than the limit,
/// `6 * total_cells` unless set by `with_state_limit`.
#[derive(Debug, Default)]
pub struct WallFollowingSolver {
    record: SolverRecord,
    state_limit: Option<usize>,
    fallback: Option<Fallback>,
}

impl WallFollowingSolver {
    pub fn new() -> WallFollowingSolver {
        WallFollowingSolver::default()
    }

    pub fn with_state_limit(state_limit: usize) -> WallFollowingSolver {
        WallFollowingSolver { state_limit: Some(state_limit), ..WallFollowingSolver::default() }
    }

    /// Did the last solve need the breadth first search fallback.
    #[inline]
    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }

    #[inline]
    pub fn fallback(&self) -> Option<Fallback> {
        self.fallback
    }
}

impl MazeSolver for WallFollowingSolver {
    fn name(&self) -> &'static str {
        "wall"
    }

    fn solve_maze(&mut self, maze: &Maze3D, entrance: Coordinate3D) {
        self.record.reset();
        self.fallback = None;
        self.record.start_at(entrance);

        let (mut cell, mut facing) = match pathing::enter_maze(maze, entrance) {
            Some(entered) => entered,
            None => {
                warn!("no way into the maze from {}", entrance);
                return;
            }
        };
        let mut walk = Walk::new(maze, &mut self.record, cell);

        let seen_limit = self.state_limit.unwrap_or(6 * maze.total_cells());
        let mut seen = utils::fnv_hashset(seen_limit);
        loop {
            if maze.exits().contains(&cell) {
                walk.record.mark_solved(cell);
                break;
            }
            let fallback = if !seen.insert((cell, facing)) {
                Some(Fallback::Repeated)
            } else if seen.len() >= seen_limit {
                Some(Fallback::OutOfMoves)
            } else {
                None
            };
            if let Some(reason) = fallback {
                self.fallback = fallback;
                walk.finish_by_search(cell, reason);
                break;
            }

            let ahead = [facing.turn_right(), facing, facing.turn_left()]
                .iter()
                .find_map(|dir| pathing::try_move(maze, cell, *dir).map(|next| (*dir, next)));
            match ahead {
                Some((dir, next)) => {
                    facing = dir;
                    cell = next;
                    walk.step(next);
                }
                None => facing = facing.turn_left().turn_left(),
            }
        }

        walk.finish();
        info!("Wall follower solver finished, solved: {}", self.record.is_solved());
    }

    fn record(&self) -> &SolverRecord {
        &self.record
    }
}

/// Pledge's algorithm: head in one preferred direction, following walls while the sum of turns
/// made is not zero.
///
/// The preferred heading is picked at random from the directions open at the first cell. A walk
/// that repeats a `(cell, facing, angle)` state or uses up its move budget, `3/2 * total_cells`
/// by default, finishes by breadth first search. So does a full turn in place.
#[derive(Debug)]
pub struct PledgeSolver<R: Rng> {
    rng: R,
    record: SolverRecord,
    move_budget: Option<usize>,
    fallback: Option<Fallback>,
}

impl<R: Rng> PledgeSolver<R> {
    pub fn new(rng: R) -> PledgeSolver<R> {
        PledgeSolver { rng, record: SolverRecord::new(), move_budget: None, fallback: None }
    }

    pub fn with_move_budget(rng: R, move_budget: usize) -> PledgeSolver<R> {
        PledgeSolver { move_budget: Some(move_budget), ..PledgeSolver::new(rng) }
    }

    #[inline]
    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }

    #[inline]
    pub fn fallback(&self) -> Option<Fallback> {
        self.fallback
    }
}

impl<R: Rng> MazeSolver for PledgeSolver<R> {
    fn name(&self) -> &'static str {
        "pledge"
    }

    fn solve_maze(&mut self, maze: &Maze3D, entrance: Coordinate3D) {
        self.record.reset();
        self.fallback = None;
        self.record.start_at(entrance);

        let (mut cell, mut facing) = match pathing::enter_maze(maze, entrance) {
            Some(entered) => entered,
            None => {
                warn!("no way into the maze from {}", entrance);
                return;
            }
        };

        let headings = Direction::CYCLE.iter()
            .cloned()
            .filter(|dir| pathing::try_move(maze, cell, *dir).map_or(false, |next| next != entrance))
            .collect::<Vec<_>>();
        let preferred = utils::random_choice(&mut self.rng, &headings).unwrap_or(facing);
        debug!("pledge solver heading {:?}", preferred);

        let mut walk = Walk::new(maze, &mut self.record, cell);
        let max_moves = self.move_budget.unwrap_or(maze.total_cells() * 3 / 2);
        let mut seen = utils::fnv_hashset(maze.total_cells());
        let (mut angle, mut moves, mut turns_in_place) = (0i32, 0usize, 0usize);

        loop {
            if maze.exits().contains(&cell) {
                walk.record.mark_solved(cell);
                break;
            }
            let fallback = if !seen.insert((cell, facing, angle)) {
                Some(Fallback::Repeated)
            } else if moves >= max_moves {
                Some(Fallback::OutOfMoves)
            } else if turns_in_place >= 6 {
                Some(Fallback::ClosedIn)
            } else {
                None
            };
            if let Some(reason) = fallback {
                self.fallback = fallback;
                walk.finish_by_search(cell, reason);
                break;
            }

            let next = if angle == 0 {
                facing = preferred;
                pathing::try_move(maze, cell, facing)
            } else if let Some(to_right) = pathing::try_move(maze, cell, facing.turn_right()) {
                facing = facing.turn_right();
                angle += 1;
                Some(to_right)
            } else {
                pathing::try_move(maze, cell, facing)
            };

            match next {
                Some(to) => {
                    cell = to;
                    moves += 1;
                    turns_in_place = 0;
                    walk.step(to);
                }
                None => {
                    facing = facing.turn_left();
                    angle -= 1;
                    turns_in_place += 1;
                }
            }
        }

        walk.finish();
        info!("Pledge solver finished after {} moves, solved: {}", moves, self.record.is_solved());
    }

    fn record(&self) -> &SolverRecord {
        &self.record
    }
}

/// Finds the entrance and exit pair cheapest to solve, cost being the path length plus the
/// cells a breadth first search from the entrance had to explore.
#[derive(Debug, Default)]
pub struct NearestPairSolver {
    record: SolverRecord,
    distance: Option<usize>,
}

impl NearestPairSolver {
    pub fn new() -> NearestPairSolver {
        NearestPairSolver::default()
    }

    /// Steps between the chosen entrance and exit, None until a pair has been solved.
    #[inline]
    pub fn distance(&self) -> Option<usize> {
        self.distance
    }

    pub fn solve_nearest(&mut self, maze: &Maze3D) {
        self.record.reset();
        self.distance = None;

        let mut cheapest: Option<(usize, Vec<Coordinate3D>)> = None;
        for &entrance in maze.entrances() {
            let distances = match Distances::explore(maze, entrance, maze.exits(), pathing::through_passage) {
                Some(distances) => distances,
                None => continue,
            };
            self.record.add_explored(distances.cells_explored());

            for &exit in maze.exits() {
                if let Some(path) = pathing::shortest_path(&distances, exit) {
                    let cost = path.len() + distances.cells_explored();
                    debug!("{} to {} costs {}", entrance, exit, cost);
                    if cheapest.as_ref().map_or(true, |(best, _)| cost < *best) {
                        cheapest = Some((cost, path));
                    }
                }
            }
        }

        match cheapest {
            Some((_, path)) => {
                if let (Some(&entrance), Some(&exit)) = (path.first(), path.last()) {
                    self.record.start_at(entrance);
                    for cell in &path[1..] {
                        self.record.push(PathStep::forward(*cell));
                    }
                    self.record.mark_solved(exit);
                    self.distance = Some(path.len() - 1);
                    info!("nearest pair {} to {}, distance {}", entrance, exit, path.len() - 1);
                }
            }
            None => warn!("no exit is reachable from any entrance"),
        }
    }
}

impl MazeSolver for NearestPairSolver {
    fn name(&self) -> &'static str {
        "taskC"
    }

    /// Every declared entrance is tried, `entrance` is ignored.
    fn solve_maze(&mut self, maze: &Maze3D, _entrance: Coordinate3D) {
        self.solve_nearest(maze);
    }

    fn record(&self) -> &SolverRecord {
        &self.record
    }
}

/// Path bookkeeping shared by the wall follower and Pledge's.
struct Walk<'a> {
    maze: &'a Maze3D,
    record: &'a mut SolverRecord,
    visited: utils::FnvHashSet<Coordinate3D>,
}

impl<'a> Walk<'a> {
    fn new(maze: &'a Maze3D, record: &'a mut SolverRecord, first_cell: Coordinate3D) -> Walk<'a> {
        let mut visited = utils::fnv_hashset(maze.total_cells());
        visited.insert(first_cell);
        record.push(PathStep::forward(first_cell));
        Walk { maze, record, visited }
    }

    fn step(&mut self, cell: Coordinate3D) {
        self.visited.insert(cell);
        self.record.push(PathStep::forward(cell));
    }

    /// Append the breadth first route from `cell` to the nearest exit.
    fn finish_by_search(&mut self, cell: Coordinate3D, reason: Fallback) {
        debug!("{:?} at {}, falling back to breadth first search", reason, cell);
        let route = pathing::bfs_to_exit(self.maze, cell);
        if let Some(&exit) = route.last() {
            for next in route.iter().skip(1) {
                self.step(*next);
            }
            self.record.mark_solved(exit);
        } else {
            warn!("no exit reachable from {}", cell);
        }
    }

    fn finish(self) {
        self.record.add_explored(self.visited.len());
    }
}
