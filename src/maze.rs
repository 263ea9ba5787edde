use std::error;
use std::fmt;

use petgraph::{Graph, Undirected};
use petgraph::graph;
use petgraph::visit::EdgeRef;
use rand::Rng;

use crate::cells::{Coordinate3D, CoordinateSmallVec, Direction};
use crate::units::{ColumnsCount, EdgesCount, NodesCount, RowsCount};

/// Size of one level of the maze, in interior cells.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct LevelDimensions {
    rows: RowsCount,
    columns: ColumnsCount,
}

impl LevelDimensions {
    pub fn new(rows: RowsCount, columns: ColumnsCount) -> LevelDimensions {
        LevelDimensions { rows, columns }
    }

    #[inline(always)]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    #[inline(always)]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.rows.0 * self.columns.0
    }

    /// Cells including the boundary ring, corners too even though they are never addressable.
    #[inline(always)]
    fn ringed_size(&self) -> usize {
        (self.rows.0 + 2) * (self.columns.0 + 2)
    }
}

/// Node count, including boundary rings, and a passages capacity hint.
fn graph_size(levels: &[LevelDimensions]) -> (NodesCount, EdgesCount) {
    let nodes = levels.iter().map(LevelDimensions::ringed_size).sum();
    let cells: usize = levels.iter().map(LevelDimensions::size).sum();
    // Up to three passages per cell (east, south, up) in a fully open maze.
    (NodesCount(nodes), EdgesCount(3 * cells))
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum MazeError {
    InvalidCoordinate,
    NotAdjacent,
    NotBoundary,
    /// Some interior cells cannot be reached from the others through any wall slot.
    Disconnected,
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match *self {
            MazeError::InvalidCoordinate => "coordinate is not a cell of the maze",
            MazeError::NotAdjacent => "cells do not share a wall",
            MazeError::NotBoundary => "openings must be on a level boundary",
            MazeError::Disconnected => "maze cells are not all connected",
        };
        write!(f, "{}", msg)
    }
}

impl error::Error for MazeError {}

/// A stack of rectangular levels, each ringed by boundary cells.
///
/// Every adjacent pair of cells where at least one is an interior cell is separated by a wall
/// slot. Removing the wall adds a passage, an undirected edge of the underlying graph. Adjacent
/// levels connect only where the (row, column) exists in both of them.
pub struct Maze3D {
    graph: Graph<(), (), Undirected, u32>,
    levels: Vec<LevelDimensions>,
    node_offsets: Vec<usize>,
    cell_offsets: Vec<usize>,
    total_cells: usize,
    entrances: Vec<Coordinate3D>,
    exits: Vec<Coordinate3D>,
}

impl fmt::Debug for Maze3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Maze3D :: graph: {:?}, levels: {:?}, entrances: {:?}, exits: {:?}",
               self.graph, self.levels, self.entrances, self.exits)
    }
}

impl Maze3D {
    /// A fully walled maze with one level per entry of `levels`, bottom level first.
    pub fn new(levels: Vec<LevelDimensions>) -> Maze3D {

        let mut node_offsets = Vec::with_capacity(levels.len());
        let mut cell_offsets = Vec::with_capacity(levels.len());
        let (mut nodes_seen, mut cells) = (0, 0);
        for level in &levels {
            node_offsets.push(nodes_seen);
            cell_offsets.push(cells);
            nodes_seen += level.ringed_size();
            cells += level.size();
        }

        let (NodesCount(nodes), EdgesCount(edges)) = graph_size(&levels);
        let mut graph = Graph::with_capacity(nodes, edges);
        for _ in 0..nodes {
            let _ = graph.add_node(());
        }

        Maze3D {
            graph,
            levels,
            node_offsets,
            cell_offsets,
            total_cells: cells,
            entrances: vec![],
            exits: vec![],
        }
    }

    #[inline]
    pub fn level_num(&self) -> usize {
        self.levels.len()
    }

    /// Interior rows on a level, zero for levels that do not exist.
    #[inline]
    pub fn row_num(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, |dims| dims.rows.0)
    }

    #[inline]
    pub fn col_num(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, |dims| dims.columns.0)
    }

    /// Count of interior cells over all levels.
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.total_cells
    }

    #[inline]
    pub fn passages_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_interior(&self, coord: Coordinate3D) -> bool {
        self.level_dimensions(coord.level).map_or(false, |dims| {
            coord.row >= 0 && coord.col >= 0 &&
            (coord.row as usize) < dims.rows.0 && (coord.col as usize) < dims.columns.0
        })
    }

    /// Is the coordinate in the ring of cells just outside a level's interior (corners excluded).
    pub fn is_boundary(&self, coord: Coordinate3D) -> bool {
        self.level_dimensions(coord.level).map_or(false, |dims| {
            let (rows, cols) = (dims.rows.0 as isize, dims.columns.0 as isize);
            let row_in_range = coord.row >= 0 && coord.row < rows;
            let col_in_range = coord.col >= 0 && coord.col < cols;
            ((coord.row == -1 || coord.row == rows) && col_in_range) ||
            ((coord.col == -1 || coord.col == cols) && row_in_range)
        })
    }

    /// Interior and boundary cells both count as cells of the maze.
    #[inline]
    pub fn has_cell(&self, coord: Coordinate3D) -> bool {
        self.is_interior(coord) || self.is_boundary(coord)
    }

    /// Bounds validity of a coordinate, the range includes the boundary ring.
    #[inline]
    pub fn check_coordinates(&self, coord: Coordinate3D) -> bool {
        self.has_cell(coord)
    }

    /// Cells that share a wall slot with `coord`, whether or not the wall is present.
    /// Ordered as `Direction::CYCLE`.
    pub fn neighbours(&self, coord: Coordinate3D) -> CoordinateSmallVec {
        if !self.has_cell(coord) {
            return CoordinateSmallVec::new();
        }
        coord.adjacent()
            .into_iter()
            .filter(|adjacent| self.is_wall_slot(coord, *adjacent))
            .collect()
    }

    /// Neighbours reachable through a passage.
    pub fn open_neighbours(&self, coord: Coordinate3D) -> CoordinateSmallVec {
        self.neighbours(coord)
            .iter()
            .cloned()
            .filter(|neighbour| !self.has_wall(coord, *neighbour))
            .collect()
    }

    /// Is there a wall between two cells? Cells that cannot have a passage always have a wall.
    pub fn has_wall(&self, a: Coordinate3D, b: Coordinate3D) -> bool {
        if !self.is_wall_slot(a, b) {
            return true;
        }
        match (self.node_index(a), self.node_index(b)) {
            (Some(a_index), Some(b_index)) => self.graph.find_edge(a_index, b_index).is_none(),
            _ => true,
        }
    }

    /// Carve a passage between two adjacent cells. Removing an absent wall is a no-op.
    pub fn remove_wall(&mut self, a: Coordinate3D, b: Coordinate3D) -> Result<(), MazeError> {
        let (a_index, b_index) = self.wall_slot_indices(a, b)?;
        let _ = self.graph.update_edge(a_index, b_index, ());
        Ok(())
    }

    /// Close the passage between two adjacent cells.
    /// Returns true if there was a passage to close.
    pub fn add_wall(&mut self, a: Coordinate3D, b: Coordinate3D) -> Result<bool, MazeError> {
        let (a_index, b_index) = self.wall_slot_indices(a, b)?;
        if let Some(edge_index) = self.graph.find_edge(a_index, b_index) {
            // Invalidates the last edge index in the graph, edge indices are never kept.
            self.graph.remove_edge(edge_index);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Reset every wall slot. With `add_walls` all slots are walled, otherwise every interior
    /// slot is opened. Either way the boundary is walled except at declared entrances and exits.
    pub fn init_cells(&mut self, add_walls: bool) {
        self.graph.clear_edges();

        if !add_walls {
            for cell in self.all_cells() {
                for dir in &[Direction::East, Direction::South, Direction::NorthEast] {
                    let adjacent = cell.offset(*dir);
                    if self.is_interior(adjacent) {
                        let _ = self.remove_wall(cell, adjacent);
                    }
                }
            }
        }

        let openings = self.entrances.iter().chain(self.exits.iter()).cloned().collect::<Vec<_>>();
        for opening in openings {
            self.open_boundary(opening);
        }
    }

    pub fn iter(&self) -> CellIter<'_> {
        CellIter {
            maze: self,
            next_index: 0,
        }
    }

    /// Interior cells ordered by level, row then column.
    pub fn all_cells(&self) -> Vec<Coordinate3D> {
        self.iter().collect()
    }

    /// Dense index in `0..total_cells()` of an interior cell.
    pub fn cell_index(&self, coord: Coordinate3D) -> Option<usize> {
        if self.is_interior(coord) {
            let level = coord.level as usize;
            let cols = self.levels[level].columns.0;
            Some(self.cell_offsets[level] + coord.row as usize * cols + coord.col as usize)
        } else {
            None
        }
    }

    /// Inverse of `cell_index`.
    pub fn cell_at(&self, index: usize) -> Option<Coordinate3D> {
        if index >= self.total_cells {
            return None;
        }
        let level = match self.cell_offsets.binary_search(&index) {
            Ok(exact) => self.last_level_starting_at(exact),
            Err(insert_at) => insert_at - 1,
        };
        let local = index - self.cell_offsets[level];
        let cols = self.levels[level].columns.0;
        Some(Coordinate3D::new(level as isize, (local / cols) as isize, (local % cols) as isize))
    }

    /// Uniformly random interior cell, None for a maze without cells.
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coordinate3D> {
        if self.total_cells == 0 {
            None
        } else {
            self.cell_at(rng.gen_range(0..self.total_cells))
        }
    }

    /// Declare an entrance on a level boundary and open the wall leading into the maze.
    pub fn add_entrance(&mut self, coord: Coordinate3D) -> Result<(), MazeError> {
        self.check_opening(coord)?;
        if !self.entrances.contains(&coord) {
            self.entrances.push(coord);
        }
        self.open_boundary(coord);
        Ok(())
    }

    /// Declare an exit on a level boundary and open the wall leading into the maze.
    pub fn add_exit(&mut self, coord: Coordinate3D) -> Result<(), MazeError> {
        self.check_opening(coord)?;
        if !self.exits.contains(&coord) {
            self.exits.push(coord);
        }
        self.open_boundary(coord);
        Ok(())
    }

    #[inline]
    pub fn entrances(&self) -> &[Coordinate3D] {
        &self.entrances
    }

    #[inline]
    pub fn exits(&self) -> &[Coordinate3D] {
        &self.exits
    }

    /// Is the coordinate a declared entrance or exit.
    pub fn is_opening(&self, coord: Coordinate3D) -> bool {
        self.entrances.contains(&coord) || self.exits.contains(&coord)
    }

    pub fn iter_passages(&self) -> PassagesIter<'_> {
        PassagesIter {
            graph_edge_iter: self.graph.edge_references(),
            maze: self,
        }
    }

    fn level_dimensions(&self, level: isize) -> Option<&LevelDimensions> {
        if level < 0 {
            None
        } else {
            self.levels.get(level as usize)
        }
    }

    fn is_wall_slot(&self, a: Coordinate3D, b: Coordinate3D) -> bool {
        match Direction::between(a, b) {
            Some(dir) => {
                let (a_interior, b_interior) = (self.is_interior(a), self.is_interior(b));
                if dir.is_vertical() {
                    a_interior && b_interior
                } else {
                    (a_interior && self.has_cell(b)) || (b_interior && self.has_cell(a))
                }
            }
            None => false,
        }
    }

    fn wall_slot_indices(&self, a: Coordinate3D, b: Coordinate3D)
                         -> Result<(graph::NodeIndex<u32>, graph::NodeIndex<u32>), MazeError> {
        match (self.node_index(a), self.node_index(b)) {
            (Some(a_index), Some(b_index)) => {
                if self.is_wall_slot(a, b) {
                    Ok((a_index, b_index))
                } else {
                    Err(MazeError::NotAdjacent)
                }
            }
            _ => Err(MazeError::InvalidCoordinate),
        }
    }

    fn check_opening(&self, coord: Coordinate3D) -> Result<(), MazeError> {
        if self.is_boundary(coord) {
            Ok(())
        } else if self.is_interior(coord) {
            Err(MazeError::NotBoundary)
        } else {
            Err(MazeError::InvalidCoordinate)
        }
    }

    fn open_boundary(&mut self, coord: Coordinate3D) {
        // A boundary cell has exactly one interior neighbour.
        if let Some(&inside) = self.neighbours(coord).first() {
            let _ = self.remove_wall(coord, inside);
        }
    }

    /// Levels can have zero cells, several levels then share one cell offset.
    fn last_level_starting_at(&self, level: usize) -> usize {
        let offset = self.cell_offsets[level];
        let mut last = level;
        while last + 1 < self.cell_offsets.len() && self.cell_offsets[last + 1] == offset {
            last += 1;
        }
        last
    }

    /// Convert a maze cell coordinate into a petgraph node index.
    /// Returns None if the coordinate is not an interior or boundary cell.
    #[inline]
    fn node_index(&self, coord: Coordinate3D) -> Option<graph::NodeIndex<u32>> {
        if !self.has_cell(coord) {
            return None;
        }
        let level = coord.level as usize;
        let ringed_cols = self.levels[level].columns.0 + 2;
        let local = (coord.row + 1) as usize * ringed_cols + (coord.col + 1) as usize;
        Some(graph::NodeIndex::new(self.node_offsets[level] + local))
    }

    fn node_coordinate(&self, index: graph::NodeIndex<u32>) -> Coordinate3D {
        let raw = index.index();
        let level = self.node_offsets.iter().rposition(|offset| *offset <= raw).unwrap_or(0);
        let local = raw - self.node_offsets[level];
        let ringed_cols = self.levels[level].columns.0 + 2;
        Coordinate3D::new(level as isize,
                          (local / ringed_cols) as isize - 1,
                          (local % ringed_cols) as isize - 1)
    }
}

#[derive(Clone)]
pub struct CellIter<'a> {
    maze: &'a Maze3D,
    next_index: usize,
}

impl<'a> fmt::Debug for CellIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CellIter :: next_index: {:?}, cells_count: {:?}",
               self.next_index, self.maze.total_cells())
    }
}

impl<'a> Iterator for CellIter<'a> {
    type Item = Coordinate3D;

    fn next(&mut self) -> Option<Self::Item> {
        let coord = self.maze.cell_at(self.next_index);
        if coord.is_some() {
            self.next_index += 1;
        }
        coord
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.maze.total_cells() - self.next_index;
        (remaining, Some(remaining))
    }
}
impl<'a> ExactSizeIterator for CellIter<'a> {} // default impl using size_hint()

pub struct PassagesIter<'a> {
    graph_edge_iter: graph::EdgeReferences<'a, (), u32>,
    maze: &'a Maze3D,
}

impl<'a> Iterator for PassagesIter<'a> {
    type Item = (Coordinate3D, Coordinate3D);

    fn next(&mut self) -> Option<Self::Item> {
        self.graph_edge_iter.next().map(|edge| {
            (self.maze.node_coordinate(edge.source()), self.maze.node_coordinate(edge.target()))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}

impl<'a> fmt::Debug for PassagesIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PassagesIter :: passages: {:?}", self.maze.passages_count())
    }
}
