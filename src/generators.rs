use bit_set::BitSet;
use log::{debug, info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::cells::{Coordinate3D, CoordinateSmallVec};
use crate::maze::{Maze3D, MazeError};
use crate::utils::{self, FnvHashMap};

/// Common capability of every maze generator.
///
/// A generator walls the whole maze and then carves passages into it, in place.
pub trait MazeGenerator {
    fn name(&self) -> &'static str;
    fn generate_maze(&mut self, maze: &mut Maze3D) -> Result<(), MazeError>;
    fn is_maze_generated(&self) -> bool;
}

macro_rules! spanning_tree_generator {
    ($(#[$doc:meta])* $generator:ident, $label:expr, $algorithm:path) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $generator<R: Rng> {
            rng: R,
            generated: bool,
        }

        impl<R: Rng> $generator<R> {
            pub fn new(rng: R) -> $generator<R> {
                $generator { rng, generated: false }
            }
        }

        impl<R: Rng> MazeGenerator for $generator<R> {
            fn name(&self) -> &'static str {
                $label
            }

            fn generate_maze(&mut self, maze: &mut Maze3D) -> Result<(), MazeError> {
                self.generated = false;
                maze.init_cells(true);
                let _ = $algorithm(maze, &mut self.rng)?;
                self.generated = true;
                info!("{} maze generator was used", $label);
                Ok(())
            }

            fn is_maze_generated(&self) -> bool {
                self.generated
            }
        }
    }
}

spanning_tree_generator!(
    /// Randomised Prim's: grows one tree from a random cell, frontier picked uniformly.
    PrimGenerator, "prim", prim);
spanning_tree_generator!(
    /// Wilson's loop erased random walks, uniform over all spanning trees.
    WilsonGenerator, "wilson", wilson);
spanning_tree_generator!(
    /// Depth first carving with an explicit stack.
    RecursiveBacktrackerGenerator, "recur", recursive_backtracker);
spanning_tree_generator!(
    /// Kruskal's over shuffled walls.
    KruskalGenerator, "kruskal", kruskal);

/// Apply randomised Prim's algorithm to an all walled maze.
///
/// The frontier maps each unvisited cell bordering the tree to the tree cell that discovered it,
/// each step connects a uniformly random frontier cell back to its discoverer. Boundary cells
/// never enter the frontier.
pub fn prim<R: Rng>(maze: &mut Maze3D, rng: &mut R) -> Result<(), MazeError> {

    let start = match maze.random_cell(rng) {
        Some(cell) => cell,
        None => return Ok(()),
    };

    let mut visited = BitSet::with_capacity(maze.total_cells());
    let mut frontier = Frontier::with_capacity(maze.total_cells());
    visited.insert(dense_index(maze, start)?);
    extend_frontier(maze, start, &visited, &mut frontier);

    while let Some((cell, discovered_by)) = frontier.take_random(rng) {
        maze.remove_wall(cell, discovered_by)?;
        visited.insert(dense_index(maze, cell)?);
        extend_frontier(maze, cell, &visited, &mut frontier);
    }

    all_visited(maze, &visited)
}

fn extend_frontier(maze: &Maze3D, cell: Coordinate3D, visited: &BitSet, frontier: &mut Frontier) {
    for neighbour in interior_neighbours(maze, cell) {
        let is_visited = maze.cell_index(neighbour).map_or(true, |i| visited.contains(i));
        if !is_visited && !frontier.contains(neighbour) {
            frontier.insert(neighbour, cell);
        }
    }
}

/// Frontier cells with O(1) uniform random removal.
#[derive(Debug)]
struct Frontier {
    cells: Vec<Coordinate3D>,
    entries: FnvHashMap<Coordinate3D, (usize, Coordinate3D)>,
}

impl Frontier {
    fn with_capacity(capacity: usize) -> Frontier {
        Frontier {
            cells: Vec::with_capacity(capacity),
            entries: utils::fnv_hashmap(capacity),
        }
    }

    fn contains(&self, cell: Coordinate3D) -> bool {
        self.entries.contains_key(&cell)
    }

    fn insert(&mut self, cell: Coordinate3D, discovered_by: Coordinate3D) {
        self.entries.insert(cell, (self.cells.len(), discovered_by));
        self.cells.push(cell);
    }

    fn take_random<R: Rng>(&mut self, rng: &mut R) -> Option<(Coordinate3D, Coordinate3D)> {
        if self.cells.is_empty() {
            return None;
        }
        let position = rng.gen_range(0..self.cells.len());
        let cell = self.cells.swap_remove(position);
        let (_, discovered_by) = self.entries.remove(&cell)?;
        if let Some(moved) = self.cells.get(position) {
            if let Some(entry) = self.entries.get_mut(moved) {
                entry.0 = position;
            }
        }
        Some((cell, discovered_by))
    }
}

/// Apply Wilson's algorithm to an all walled maze.
///
/// Starting from a single finalized cell, every remaining cell is joined by a loop erased random
/// walk that ends on the finalized part of the maze.
pub fn wilson<R: Rng>(maze: &mut Maze3D, rng: &mut R) -> Result<(), MazeError> {

    let start = match maze.random_cell(rng) {
        Some(cell) => cell,
        None => return Ok(()),
    };
    // A walk inside a part of the maze cut off from every finalized cell would never end.
    if flood_count(maze, start, |m, a, b| m.is_interior(a) && m.is_interior(b)) < maze.total_cells() {
        return Err(MazeError::Disconnected);
    }

    let mut finalized = BitSet::with_capacity(maze.total_cells());
    finalized.insert(dense_index(maze, start)?);
    let mut unfinalized = maze.iter().filter(|cell| *cell != start).collect::<Vec<_>>();

    while !unfinalized.is_empty() {
        // Finalized cells are dropped lazily when picked.
        let position = rng.gen_range(0..unfinalized.len());
        let walk_start = unfinalized[position];
        if finalized.contains(dense_index(maze, walk_start)?) {
            unfinalized.swap_remove(position);
            continue;
        }

        let path = loop_erased_walk(maze, walk_start, &finalized, rng)?;
        debug!("wilson carving a path of {} cells from {}", path.len(), walk_start);
        for step in path.windows(2) {
            maze.remove_wall(step[0], step[1])?;
            finalized.insert(dense_index(maze, step[0])?);
        }
    }

    Ok(())
}

/// Random walk from `start` until a finalized cell is hit. Whenever the walk crosses its own
/// path, the loop is erased, so the returned path never repeats a cell. The last cell of the path
/// is the finalized cell that was hit.
fn loop_erased_walk<R: Rng>(maze: &Maze3D,
                            start: Coordinate3D,
                            finalized: &BitSet,
                            rng: &mut R)
                            -> Result<Vec<Coordinate3D>, MazeError> {
    let mut path = vec![start];
    let mut positions = utils::fnv_hashmap(maze.total_cells());
    positions.insert(start, 0);

    let mut walk_cell = start;
    while !finalized.contains(dense_index(maze, walk_cell)?) {
        let neighbours = interior_neighbours(maze, walk_cell);
        let next = utils::random_choice(rng, &neighbours).ok_or(MazeError::Disconnected)?;

        if let Some(&loop_start) = positions.get(&next) {
            for erased in path.drain(loop_start + 1..) {
                positions.remove(&erased);
            }
        } else {
            positions.insert(next, path.len());
            path.push(next);
        }
        walk_cell = next;
    }

    Ok(path)
}

/// Apply the recursive backtracker (randomised depth first search) to an all walled maze.
pub fn recursive_backtracker<R: Rng>(maze: &mut Maze3D, rng: &mut R) -> Result<(), MazeError> {

    let start = match maze.random_cell(rng) {
        Some(cell) => cell,
        None => return Ok(()),
    };

    let cells_count = maze.total_cells();
    let mut visited = BitSet::with_capacity(cells_count);
    visited.insert(dense_index(maze, start)?);
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let unvisited = unvisited_neighbours(maze, current, &visited);

        if let Some(next) = utils::random_choice(rng, &unvisited) {
            maze.remove_wall(current, next)?;
            visited.insert(dense_index(maze, next)?);
            stack.push(next);
        } else {
            stack.pop();
        }
    }

    all_visited(maze, &visited)
}

/// Grow a tree from the first cell of the maze, `(0, 0, 0)` for a non empty bottom level.
///
/// Any active cell may be extended, chosen at random; a cell with no unvisited neighbours
/// retires from the active list.
pub fn growing_tree<R: Rng>(maze: &mut Maze3D, rng: &mut R) -> Result<(), MazeError> {

    let start = match maze.cell_at(0) {
        Some(cell) => cell,
        None => return Ok(()),
    };

    let mut visited = BitSet::with_capacity(maze.total_cells());
    visited.insert(dense_index(maze, start)?);
    let mut active = vec![start];

    while !active.is_empty() {
        let position = rng.gen_range(0..active.len());
        let current = active[position];
        let candidates = unvisited_neighbours(maze, current, &visited)
            .into_iter()
            .filter(|cell| maze.check_coordinates(*cell))
            .collect::<CoordinateSmallVec>();

        if let Some(next) = utils::random_choice(rng, &candidates) {
            maze.remove_wall(current, next)?;
            visited.insert(dense_index(maze, next)?);
            active.push(next);
        } else {
            active.swap_remove(position);
        }
    }

    all_visited(maze, &visited)
}

/// Union-find over the dense cell indices of one maze.
#[derive(Debug, Clone)]
pub struct DisjointCells {
    parents: Vec<usize>,
    sizes: Vec<usize>,
    components: usize,
}

impl DisjointCells {
    pub fn new(cells_count: usize) -> DisjointCells {
        DisjointCells {
            parents: (0..cells_count).collect(),
            sizes: vec![1; cells_count],
            components: cells_count,
        }
    }

    pub fn find(&mut self, cell: usize) -> usize {
        if self.parents[cell] != cell {
            let root = self.find(self.parents[cell]);
            self.parents[cell] = root;
        }
        self.parents[cell]
    }

    /// Merge the components of two cells. False if they were already one component.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return false;
        }
        if self.sizes[a] < self.sizes[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parents[b] = a;
        self.sizes[a] += self.sizes[b];
        self.components -= 1;
        true
    }

    #[inline]
    pub fn components_count(&self) -> usize {
        self.components
    }
}

/// Apply randomised Kruskal's algorithm to the walls currently standing between interior cells.
///
/// Every wall is considered once in random order and removed only when it separates two
/// different components, so no cycle is ever carved. Returns the final components.
pub fn kruskal<R: Rng>(maze: &mut Maze3D, rng: &mut R) -> Result<DisjointCells, MazeError> {

    let mut edges = vec![];
    for cell in maze.iter() {
        for neighbour in interior_neighbours(maze, cell) {
            if cell < neighbour && maze.has_wall(cell, neighbour) {
                edges.push((cell, neighbour));
            }
        }
    }
    edges.shuffle(rng);

    let mut components = DisjointCells::new(maze.total_cells());
    while let Some((a, b)) = edges.pop() {
        if !maze.check_coordinates(a) || !maze.check_coordinates(b) ||
           !maze.is_interior(a) || !maze.is_interior(b) {
            continue;
        }
        if components.union(dense_index(maze, a)?, dense_index(maze, b)?) {
            maze.remove_wall(a, b)?;
        }
    }

    if components.components_count() > 1 {
        warn!("kruskal left {} separate components", components.components_count());
        return Err(MazeError::Disconnected);
    }
    Ok(components)
}

/// Wall off some dead ends again, making the maze imperfect.
///
/// Samples `rows * columns / 6` random cells per level; a sampled cell with exactly one passage
/// to another interior cell has that passage walled, unless the cell borders an entrance or exit.
/// Returns the number of walls added.
pub fn rewall_dead_ends<R: Rng>(maze: &mut Maze3D, rng: &mut R) -> Result<usize, MazeError> {

    let mut rewalled = 0;
    for level in 0..maze.level_num() {
        let (rows, cols) = (maze.row_num(level), maze.col_num(level));
        for _ in 0..(rows * cols / 6) {
            let cell = Coordinate3D::new(level as isize,
                                         rng.gen_range(0..rows) as isize,
                                         rng.gen_range(0..cols) as isize);
            if maze.neighbours(cell).iter().any(|n| maze.is_opening(*n)) {
                continue;
            }
            let passages = maze.open_neighbours(cell)
                .into_iter()
                .filter(|n| maze.is_interior(*n))
                .collect::<CoordinateSmallVec>();
            if passages.len() == 1 && maze.add_wall(cell, passages[0])? {
                rewalled += 1;
            }
        }
    }

    debug!("rewalled {} dead ends", rewalled);
    Ok(rewalled)
}

/// Wall every level's four sides, leaving declared entrances and exits open.
pub fn seal_boundaries(maze: &mut Maze3D) -> Result<(), MazeError> {

    for level in 0..maze.level_num() {
        let (rows, cols) = (maze.row_num(level) as isize, maze.col_num(level) as isize);
        let l = level as isize;
        let mut sides = Vec::with_capacity(2 * (rows + cols) as usize);
        for row in 0..rows {
            sides.push((Coordinate3D::new(l, row, -1), Coordinate3D::new(l, row, 0)));
            sides.push((Coordinate3D::new(l, row, cols), Coordinate3D::new(l, row, cols - 1)));
        }
        for col in 0..cols {
            sides.push((Coordinate3D::new(l, -1, col), Coordinate3D::new(l, 0, col)));
            sides.push((Coordinate3D::new(l, rows, col), Coordinate3D::new(l, rows - 1, col)));
        }

        for (outside, inside) in sides {
            if !maze.is_opening(outside) {
                let _ = maze.add_wall(outside, inside)?;
            }
        }
    }

    Ok(())
}

/// Maze shapes for the solver a task D maze is generated against.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum TaskDVariant {
    RecursiveBacktrack,
    WallFollowing,
    Pledge,
    NearestPair,
}

impl TaskDVariant {
    /// Unknown solver names get the nearest pair (plain Kruskal) shape.
    pub fn for_solver(solver_name: &str) -> TaskDVariant {
        match solver_name {
            "recur" => TaskDVariant::RecursiveBacktrack,
            "wall" => TaskDVariant::WallFollowing,
            "pledge" => TaskDVariant::Pledge,
            _ => TaskDVariant::NearestPair,
        }
    }
}

/// Generator picked to match a particular solver.
#[derive(Debug)]
pub struct TaskDGenerator<R: Rng> {
    variant: TaskDVariant,
    rng: R,
    generated: bool,
    rewalled: usize,
}

impl<R: Rng> TaskDGenerator<R> {
    pub fn new(solver_name: &str, rng: R) -> TaskDGenerator<R> {
        TaskDGenerator {
            variant: TaskDVariant::for_solver(solver_name),
            rng,
            generated: false,
            rewalled: 0,
        }
    }

    #[inline]
    pub fn variant(&self) -> TaskDVariant {
        self.variant
    }

    /// Walls added back by the dead end pass of the last pledge shaped generation.
    #[inline]
    pub fn rewalled_dead_ends(&self) -> usize {
        self.rewalled
    }
}

impl<R: Rng> MazeGenerator for TaskDGenerator<R> {
    fn name(&self) -> &'static str {
        "taskd"
    }

    fn generate_maze(&mut self, maze: &mut Maze3D) -> Result<(), MazeError> {
        self.generated = false;
        self.rewalled = 0;
        maze.init_cells(true);

        match self.variant() {
            TaskDVariant::RecursiveBacktrack => {
                recursive_backtracker(maze, &mut self.rng)?;
                info!("Recursive Backtrack maze generator was used");
            }
            TaskDVariant::WallFollowing => {
                growing_tree(maze, &mut self.rng)?;
                info!("Wall follower maze generator was used");
            }
            TaskDVariant::Pledge => {
                let _ = kruskal(maze, &mut self.rng)?;
                self.rewalled = rewall_dead_ends(maze, &mut self.rng)?;
                info!("Pledge maze generator was used");
            }
            TaskDVariant::NearestPair => {
                let _ = kruskal(maze, &mut self.rng)?;
                info!("TaskC maze generator was used");
            }
        }

        seal_boundaries(maze)?;
        self.generated = true;
        Ok(())
    }

    fn is_maze_generated(&self) -> bool {
        self.generated
    }
}

/// Count the cells reachable from `start` where `passable(maze, from, to)` allows each step.
pub fn flood_count<F>(maze: &Maze3D, start: Coordinate3D, passable: F) -> usize
    where F: Fn(&Maze3D, Coordinate3D, Coordinate3D) -> bool
{
    let mut seen = utils::fnv_hashset(maze.total_cells());
    seen.insert(start);
    let mut frontier = vec![start];
    while let Some(cell) = frontier.pop() {
        for neighbour in maze.neighbours(cell) {
            if passable(maze, cell, neighbour) && seen.insert(neighbour) {
                frontier.push(neighbour);
            }
        }
    }
    seen.len()
}

fn interior_neighbours(maze: &Maze3D, cell: Coordinate3D) -> CoordinateSmallVec {
    maze.neighbours(cell)
        .into_iter()
        .filter(|neighbour| maze.is_interior(*neighbour))
        .collect()
}

fn unvisited_neighbours(maze: &Maze3D, cell: Coordinate3D, visited: &BitSet) -> CoordinateSmallVec {
    interior_neighbours(maze, cell)
        .into_iter()
        .filter(|neighbour| maze.cell_index(*neighbour).map_or(false, |i| !visited.contains(i)))
        .collect()
}

#[inline]
fn dense_index(maze: &Maze3D, cell: Coordinate3D) -> Result<usize, MazeError> {
    maze.cell_index(cell).ok_or(MazeError::InvalidCoordinate)
}

fn all_visited(maze: &Maze3D, visited: &BitSet) -> Result<(), MazeError> {
    if visited.len() == maze.total_cells() {
        Ok(())
    } else {
        Err(MazeError::Disconnected)
    }
}
