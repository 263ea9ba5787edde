use std::collections::VecDeque;

use crate::cells::{Coordinate3D, Direction};
use crate::maze::Maze3D;
use crate::utils::{self, FnvHashMap, FnvHashSet};

/// One cell of a solver's route. Retreats over already visited cells are flagged.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct PathStep {
    pub coordinate: Coordinate3D,
    pub backtrack: bool,
}

impl PathStep {
    pub fn forward(coordinate: Coordinate3D) -> PathStep {
        PathStep { coordinate, backtrack: false }
    }

    pub fn retreat(coordinate: Coordinate3D) -> PathStep {
        PathStep { coordinate, backtrack: true }
    }
}

/// Instrumentation of one solve. Reset at the start of every solve.
#[derive(Default, Clone, Debug)]
pub struct SolverRecord {
    path: Vec<PathStep>,
    explored: usize,
    entrance: Option<Coordinate3D>,
    exit: Option<Coordinate3D>,
    solved: bool,
}

impl SolverRecord {
    pub fn new() -> SolverRecord {
        SolverRecord::default()
    }

    pub fn reset(&mut self) {
        *self = SolverRecord::default();
    }

    pub fn start_at(&mut self, entrance: Coordinate3D) {
        self.entrance = Some(entrance);
        self.push(PathStep::forward(entrance));
    }

    #[inline]
    pub fn push(&mut self, step: PathStep) {
        self.path.push(step);
    }

    #[inline]
    pub fn add_explored(&mut self, cells_count: usize) {
        self.explored += cells_count;
    }

    pub fn mark_solved(&mut self, exit: Coordinate3D) {
        self.exit = Some(exit);
        self.solved = true;
    }

    #[inline]
    pub fn path(&self) -> &[PathStep] {
        &self.path
    }

    #[inline]
    pub fn explored(&self) -> usize {
        self.explored
    }

    #[inline]
    pub fn entrance(&self) -> Option<Coordinate3D> {
        self.entrance
    }

    #[inline]
    pub fn exit(&self) -> Option<Coordinate3D> {
        self.exit
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.solved
    }
}

/// Breadth first floodfill from a start cell, keeping step counts and the parent of every
/// reached cell.
#[derive(Debug, Clone)]
pub struct Distances {
    start: Coordinate3D,
    distances: FnvHashMap<Coordinate3D, u32>,
    parents: FnvHashMap<Coordinate3D, Coordinate3D>,
    explored: usize,
    max_distance: u32,
}

impl Distances {
    /// Floodfill every cell reachable through passages, boundary cells included.
    pub fn new(maze: &Maze3D, start: Coordinate3D) -> Option<Distances> {
        Distances::explore(maze, start, &[], through_passage)
    }

    /// Floodfill from `start`, stepping only where `passable(maze, from, to)` allows.
    ///
    /// With no targets the whole reachable region is filled, otherwise the search stops as soon
    /// as every target has been dequeued. Returns None if `start` is not a cell of the maze.
    pub fn explore<F>(maze: &Maze3D,
                      start: Coordinate3D,
                      targets: &[Coordinate3D],
                      passable: F)
                      -> Option<Distances>
        where F: Fn(&Maze3D, Coordinate3D, Coordinate3D) -> bool
    {
        if !maze.has_cell(start) {
            return None;
        }

        let mut remaining: FnvHashSet<Coordinate3D> = targets.iter().cloned().collect();
        let mut distances = utils::fnv_hashmap(maze.total_cells());
        let mut parents = utils::fnv_hashmap(maze.total_cells());
        distances.insert(start, 0);

        let mut explored = 0;
        let mut max_distance = 0;
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            explored += 1;
            let distance_to_cell = distances.get(&cell).cloned().unwrap_or(0);
            max_distance = max_distance.max(distance_to_cell);

            if !targets.is_empty() {
                let _ = remaining.remove(&cell);
                if remaining.is_empty() {
                    break;
                }
            }

            for neighbour in maze.neighbours(cell) {
                if !distances.contains_key(&neighbour) && passable(maze, cell, neighbour) {
                    distances.insert(neighbour, distance_to_cell + 1);
                    parents.insert(neighbour, cell);
                    queue.push_back(neighbour);
                }
            }
        }

        Some(Distances {
            start,
            distances,
            parents,
            explored,
            max_distance,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Coordinate3D {
        self.start
    }

    /// Largest step count of any dequeued cell.
    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    /// Cells dequeued by the search.
    #[inline(always)]
    pub fn cells_explored(&self) -> usize {
        self.explored
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: Coordinate3D) -> Option<u32> {
        self.distances.get(&coord).cloned()
    }
}

/// Route from the floodfill start to `end_point`, both included, by walking parent links back.
/// None if `end_point` was never reached.
pub fn shortest_path(distances_from_start: &Distances, end_point: Coordinate3D) -> Option<Vec<Coordinate3D>> {

    distances_from_start.distance_from_start_to(end_point)?;

    let mut path = vec![end_point];
    let mut current_coord = end_point;
    while current_coord != distances_from_start.start() {
        current_coord = *distances_from_start.parents.get(&current_coord)?;
        path.push(current_coord);
    }

    path.reverse();
    Some(path)
}

/// Shortest route from `from` to the nearest declared exit, both ends included.
/// Empty when no exit can be reached.
pub fn bfs_to_exit(maze: &Maze3D, from: Coordinate3D) -> Vec<Coordinate3D> {

    let distances = match Distances::explore(maze, from, maze.exits(), is_passable) {
        Some(distances) => distances,
        None => return vec![],
    };

    // Earlier declared exits win ties.
    let nearest = maze.exits()
        .iter()
        .filter_map(|exit| distances.distance_from_start_to(*exit).map(|d| (d, *exit)))
        .min_by_key(|&(distance, _)| distance);

    nearest.and_then(|(_, exit)| shortest_path(&distances, exit)).unwrap_or_default()
}

/// Can a solver walk from `from` to `to`: an open passage leading into the maze or out of
/// a declared exit.
pub fn is_passable(maze: &Maze3D, from: Coordinate3D, to: Coordinate3D) -> bool {
    !maze.has_wall(from, to) && (maze.is_interior(to) || maze.exits().contains(&to))
}

/// Any open passage, boundary cells included.
pub fn through_passage(maze: &Maze3D, from: Coordinate3D, to: Coordinate3D) -> bool {
    maze.has_cell(to) && !maze.has_wall(from, to)
}

/// The cell one step from `cell` towards `dir`, if a solver may move there.
#[inline]
pub fn try_move(maze: &Maze3D, cell: Coordinate3D, dir: Direction) -> Option<Coordinate3D> {
    let next = cell.offset(dir);
    if is_passable(maze, cell, next) {
        Some(next)
    } else {
        None
    }
}

/// The first interior cell behind an entrance and the direction stepped to reach it.
pub fn enter_maze(maze: &Maze3D, entrance: Coordinate3D) -> Option<(Coordinate3D, Direction)> {
    maze.open_neighbours(entrance)
        .into_iter()
        .find(|cell| maze.is_interior(*cell))
        .and_then(|cell| Direction::between(entrance, cell).map(|dir| (cell, dir)))
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::maze::LevelDimensions;
    use crate::units::{ColumnsCount, RowsCount};

    fn maze_of(dims: &[(usize, usize)]) -> Maze3D {
        Maze3D::new(dims.iter()
            .map(|&(rows, cols)| LevelDimensions::new(RowsCount(rows), ColumnsCount(cols)))
            .collect())
    }

    fn c(level: isize, row: isize, col: isize) -> Coordinate3D {
        Coordinate3D::new(level, row, col)
    }

    #[test]
    fn distances_construction_requires_valid_start_coordinate() {
        let maze = maze_of(&[(3, 3)]);
        assert!(Distances::new(&maze, c(0, 5, 5)).is_none());
        assert!(Distances::new(&maze, c(0, -1, -1)).is_none());
        assert!(Distances::new(&maze, c(0, -1, 1)).is_some());
    }

    #[test]
    fn distances_to_unreachable_cells_is_none() {
        let maze = maze_of(&[(3, 3)]);
        let start = c(0, 0, 0);
        let distances = Distances::new(&maze, start).unwrap();
        assert_eq!(distances.start(), start);
        for coord in maze.iter() {
            if coord == start {
                assert_eq!(distances.distance_from_start_to(coord), Some(0));
            } else {
                assert_eq!(distances.distance_from_start_to(coord), None);
            }
        }
        assert_eq!(distances.cells_explored(), 1);
    }

    #[test]
    fn distances_on_open_levels() {
        let mut maze = maze_of(&[(2, 2), (1, 1)]);
        maze.init_cells(false);
        let distances = Distances::new(&maze, c(0, 0, 0)).unwrap();

        assert_eq!(distances.distance_from_start_to(c(0, 0, 1)), Some(1));
        assert_eq!(distances.distance_from_start_to(c(0, 1, 0)), Some(1));
        assert_eq!(distances.distance_from_start_to(c(0, 1, 1)), Some(2));
        assert_eq!(distances.distance_from_start_to(c(1, 0, 0)), Some(1));
        assert_eq!(distances.max(), 2);
        assert_eq!(distances.cells_explored(), 5);
        assert_eq!(distances.distance_from_start_to(c(0, -1, 0)), None);
    }

    #[test]
    fn shortest_path_climbs_levels() {
        let mut maze = maze_of(&[(1, 3), (1, 3)]);
        maze.remove_wall(c(0, 0, 0), c(1, 0, 0)).unwrap();
        maze.remove_wall(c(1, 0, 0), c(1, 0, 1)).unwrap();
        maze.remove_wall(c(1, 0, 1), c(1, 0, 2)).unwrap();
        maze.remove_wall(c(1, 0, 2), c(0, 0, 2)).unwrap();

        let distances = Distances::new(&maze, c(0, 0, 0)).unwrap();
        assert_eq!(shortest_path(&distances, c(0, 0, 2)),
                   Some(vec![c(0, 0, 0), c(1, 0, 0), c(1, 0, 1), c(1, 0, 2), c(0, 0, 2)]));
        assert_eq!(shortest_path(&distances, c(0, 0, 0)), Some(vec![c(0, 0, 0)]));
        assert_eq!(shortest_path(&distances, c(0, 0, 1)), None);
    }

    #[test]
    fn exploring_stops_when_targets_are_dequeued() {
        let mut maze = maze_of(&[(1, 6)]);
        maze.init_cells(false);
        let distances = Distances::explore(&maze, c(0, 0, 0), &[c(0, 0, 2)], through_passage).unwrap();
        assert_eq!(distances.cells_explored(), 3);

        let unreachable = Distances::explore(&maze, c(0, 0, 0), &[c(0, 0, 7)], through_passage).unwrap();
        assert_eq!(unreachable.cells_explored(), 6);
    }

    #[test]
    fn bfs_to_the_nearest_exit() {
        let mut maze = maze_of(&[(1, 5)]);
        maze.add_exit(c(0, 0, -1)).unwrap();
        maze.add_exit(c(0, 0, 5)).unwrap();
        maze.init_cells(false);

        assert_eq!(bfs_to_exit(&maze, c(0, 0, 3)), vec![c(0, 0, 3), c(0, 0, 4), c(0, 0, 5)]);
        assert_eq!(bfs_to_exit(&maze, c(0, 0, 1)), vec![c(0, 0, 1), c(0, 0, 0), c(0, 0, -1)]);
        // equally near, first declared exit wins
        assert_eq!(bfs_to_exit(&maze, c(0, 0, 2)).last(), Some(&c(0, 0, -1)));

        maze.add_wall(c(0, 0, 0), c(0, 0, -1)).unwrap();
        maze.add_wall(c(0, 0, 4), c(0, 0, 5)).unwrap();
        assert!(bfs_to_exit(&maze, c(0, 0, 2)).is_empty());
    }

    #[test]
    fn moves_only_into_the_maze_or_out_of_exits() {
        let mut maze = maze_of(&[(2, 2)]);
        maze.add_entrance(c(0, -1, 0)).unwrap();
        maze.add_exit(c(0, 2, 1)).unwrap();
        maze.init_cells(false);

        assert_eq!(try_move(&maze, c(0, 0, 0), Direction::East), Some(c(0, 0, 1)));
        assert_eq!(try_move(&maze, c(0, 1, 1), Direction::South), Some(c(0, 2, 1)));
        // back out of the entrance is not allowed, nor through a wall
        assert_eq!(try_move(&maze, c(0, 0, 0), Direction::North), None);
        assert_eq!(try_move(&maze, c(0, 0, 0), Direction::West), None);
        assert_eq!(try_move(&maze, c(0, 0, 0), Direction::NorthEast), None);
    }

    #[test]
    fn entering_the_maze() {
        let mut maze = maze_of(&[(2, 2)]);
        maze.add_entrance(c(0, 0, 2)).unwrap();
        assert_eq!(enter_maze(&maze, c(0, 0, 2)), Some((c(0, 0, 1), Direction::West)));

        maze.add_wall(c(0, 0, 2), c(0, 0, 1)).unwrap();
        assert_eq!(enter_maze(&maze, c(0, 0, 2)), None);
        assert_eq!(enter_maze(&maze, c(0, 9, 9)), None);
    }

    #[test]
    fn record_reset() {
        let mut record = SolverRecord::new();
        record.start_at(c(0, -1, 0));
        record.push(PathStep::forward(c(0, 0, 0)));
        record.add_explored(2);
        record.mark_solved(c(0, 0, 0));
        assert!(record.is_solved());
        assert_eq!(record.path().len(), 2);

        record.reset();
        assert!(!record.is_solved());
        assert!(record.path().is_empty());
        assert_eq!(record.explored(), 0);
        assert_eq!(record.entrance(), None);
        assert_eq!(record.exit(), None);
    }
}
