use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

pub type CoordinateSmallVec = SmallVec<[Coordinate3D; 6]>;

/// A cell position in a multi level maze.
///
/// Rows and columns are signed so that the boundary ring around a level can be addressed,
/// e.g. an entrance on the north side of level 0 sits at `(0, -1, col)`.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Coordinate3D {
    pub level: isize,
    pub row: isize,
    pub col: isize,
}

impl Coordinate3D {
    pub fn new(level: isize, row: isize, col: isize) -> Coordinate3D {
        Coordinate3D { level, row, col }
    }

    /// The coordinate one step away in `dir`. Not necessarily a cell of any maze.
    #[inline]
    pub fn offset(&self, dir: Direction) -> Coordinate3D {
        let (dcol, drow, dlevel) = dir.offset();
        Coordinate3D::new(self.level + dlevel, self.row + drow, self.col + dcol)
    }

    /// All six adjacent coordinates in `Direction::CYCLE` order.
    pub fn adjacent(&self) -> CoordinateSmallVec {
        Direction::CYCLE.iter().map(|dir| self.offset(*dir)).collect()
    }
}

impl fmt::Display for Coordinate3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.level, self.row, self.col)
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct ParseCoordinateError;

impl fmt::Display for ParseCoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected a coordinate formatted as level,row,col")
    }
}

impl std::error::Error for ParseCoordinateError {}

/// Parses `"level,row,col"`, e.g. `"0,-1,2"`.
impl FromStr for Coordinate3D {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(',')
            .map(|part| part.trim().parse::<isize>().map_err(|_| ParseCoordinateError))
            .collect::<Result<SmallVec<[isize; 3]>, _>>()?;
        match parts.as_slice() {
            &[level, row, col] => Ok(Coordinate3D::new(level, row, col)),
            _ => Err(ParseCoordinateError),
        }
    }
}

/// Movement directions, listed in right hand turning order.
///
/// The four compass points share the turn cycle with the two level changes: `NorthEast` climbs
/// one level and `SouthWest` descends one, giving a hexagonal turn order
/// N -> NE -> E -> S -> SW -> W -> N.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum Direction {
    North,
    NorthEast,
    East,
    South,
    SouthWest,
    West,
}

impl Direction {
    pub const CYCLE: [Direction; 6] = [Direction::North,
                                       Direction::NorthEast,
                                       Direction::East,
                                       Direction::South,
                                       Direction::SouthWest,
                                       Direction::West];

    /// `(column, row, level)` deltas for one step.
    #[inline]
    pub fn offset(self) -> (isize, isize, isize) {
        match self {
            Direction::North => (0, -1, 0),
            Direction::NorthEast => (0, 0, 1),
            Direction::East => (1, 0, 0),
            Direction::South => (0, 1, 0),
            Direction::SouthWest => (0, 0, -1),
            Direction::West => (-1, 0, 0),
        }
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        self == Direction::NorthEast || self == Direction::SouthWest
    }

    pub fn turn_right(self) -> Direction {
        Direction::CYCLE[(self.cycle_index() + 1) % 6]
    }

    pub fn turn_left(self) -> Direction {
        Direction::CYCLE[(self.cycle_index() + 5) % 6]
    }

    /// The direction taking `from` to the adjacent coordinate `to`, if they are adjacent.
    pub fn between(from: Coordinate3D, to: Coordinate3D) -> Option<Direction> {
        Direction::CYCLE.iter().cloned().find(|dir| from.offset(*dir) == to)
    }

    fn cycle_index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 1,
            Direction::East => 2,
            Direction::South => 3,
            Direction::SouthWest => 4,
            Direction::West => 5,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn turning_right_walks_the_whole_cycle() {
        let mut dir = Direction::North;
        let mut seen = vec![];
        for _ in 0..6 {
            seen.push(dir);
            dir = dir.turn_right();
        }
        assert_eq!(dir, Direction::North);
        assert_eq!(seen, Direction::CYCLE.to_vec());
    }

    #[test]
    fn left_undoes_right() {
        for dir in Direction::CYCLE.iter() {
            assert_eq!(dir.turn_right().turn_left(), *dir);
            assert_eq!(dir.turn_left().turn_right(), *dir);
        }
        assert_eq!(Direction::North.turn_left(), Direction::West);
        assert_eq!(Direction::North.turn_right(), Direction::NorthEast);
        assert_eq!(Direction::South.turn_right(), Direction::SouthWest);
    }

    #[test]
    fn offsets() {
        let c = Coordinate3D::new(1, 2, 3);
        assert_eq!(c.offset(Direction::North), Coordinate3D::new(1, 1, 3));
        assert_eq!(c.offset(Direction::South), Coordinate3D::new(1, 3, 3));
        assert_eq!(c.offset(Direction::East), Coordinate3D::new(1, 2, 4));
        assert_eq!(c.offset(Direction::West), Coordinate3D::new(1, 2, 2));
        assert_eq!(c.offset(Direction::NorthEast), Coordinate3D::new(2, 2, 3));
        assert_eq!(c.offset(Direction::SouthWest), Coordinate3D::new(0, 2, 3));
        assert_eq!(c.adjacent().len(), 6);
        assert_eq!(c.adjacent()[1], c.offset(Direction::NorthEast));
        assert!(c.adjacent().iter().all(|adjacent| Direction::between(c, *adjacent).is_some()));
    }

    #[test]
    fn direction_between_adjacent_coordinates() {
        let c = Coordinate3D::new(0, 0, 0);
        for dir in Direction::CYCLE.iter() {
            assert_eq!(Direction::between(c, c.offset(*dir)), Some(*dir));
        }
        assert_eq!(Direction::between(c, Coordinate3D::new(0, 1, 1)), None);
        assert_eq!(Direction::between(c, c), None);
    }

    #[test]
    fn parse_coordinates() {
        assert_eq!("0,-1,2".parse::<Coordinate3D>(), Ok(Coordinate3D::new(0, -1, 2)));
        assert_eq!(" 1, 2 ,3".parse::<Coordinate3D>(), Ok(Coordinate3D::new(1, 2, 3)));
        assert_eq!("1,2".parse::<Coordinate3D>(), Err(ParseCoordinateError));
        assert_eq!("1,2,3,4".parse::<Coordinate3D>(), Err(ParseCoordinateError));
        assert_eq!("a,b,c".parse::<Coordinate3D>(), Err(ParseCoordinateError));
    }
}
