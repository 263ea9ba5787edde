//! **mazes3d** generates and solves mazes built from a stack of rectangular levels.

pub mod cells;
pub mod generators;
pub mod maze;
pub mod pathing;
pub mod selectors;
pub mod solvers;
pub mod units;
pub mod utils;
