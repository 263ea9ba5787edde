use docopt::Docopt;
use log::info;
use serde_derive::Deserialize;
use mazes3d::{
    cells::Coordinate3D,
    maze::{LevelDimensions, Maze3D},
    selectors,
    units::{ColumnsCount, RowsCount},
};

const USAGE: &str = "Mazes3D

Usage:
    mazes3d_driver -h | --help
    mazes3d_driver [--level=<RxC>...] [--generator=<name>] [--solver=<name>] [--entrance=<coord>...] [--exit=<coord>...] [--seed=<n>]

Options:
    -h --help             Show this screen.
    --level=<RxC>         Rows and columns of one level, repeated once per level from the bottom up [default: 5x5].
    --generator=<name>    prim, wilson, recur, kruskal or taskd. A taskd maze is shaped for the chosen solver [default: prim].
    --solver=<name>       recur, wall, pledge or taskC [default: wall].
    --entrance=<coord>    Entrance on a level boundary, e.g. 0,-1,0 is north of the first cell. Defaults to 0,-1,0.
    --exit=<coord>        Exit on a level boundary. Defaults to the south side of the top level's last column.
    --seed=<n>            Seed for the generator and solver random sources, random if not given.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_level: Vec<String>,
    flag_generator: String,
    flag_solver: String,
    flag_entrance: Vec<String>,
    flag_exit: Vec<String>,
    flag_seed: Option<u64>,
}

mod errors {
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            MazeFailure(::mazes3d::maze::MazeError);
            CoordinateFailure(::mazes3d::cells::ParseCoordinateError);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    env_logger::init();
    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let levels = args.flag_level
        .iter()
        .map(|level| parse_level(level))
        .collect::<Result<Vec<_>>>()?;
    let mut maze = Maze3D::new(levels);

    let entrances = parse_coordinates(&args.flag_entrance)?;
    let entrances = if entrances.is_empty() { vec![Coordinate3D::new(0, -1, 0)] } else { entrances };
    let exits = parse_coordinates(&args.flag_exit)?;
    let exits = if exits.is_empty() { vec![default_exit(&maze)?] } else { exits };
    for entrance in &entrances {
        maze.add_entrance(*entrance).chain_err(|| format!("Invalid entrance {}", entrance))?;
    }
    for exit in &exits {
        maze.add_exit(*exit).chain_err(|| format!("Invalid exit {}", exit))?;
    }

    let seed = args.flag_seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);

    let mut generator = if args.flag_generator == "taskd" {
        selectors::match_generator(&args.flag_solver, seed)
    } else {
        selectors::construct_generator(&args.flag_generator, seed)
            .ok_or_else(|| format!("Unknown generator {}", args.flag_generator))?
    };
    let mut solver = selectors::construct_solver(&args.flag_solver, seed.wrapping_add(1))
        .ok_or_else(|| format!("Unknown solver {}", args.flag_solver))?;

    generator.generate_maze(&mut maze).chain_err(|| "Maze generation failed")?;
    solver.solve_maze(&maze, entrances[0]);

    let exit_used = solver.exit_used()
        .map(|exit| exit.to_string())
        .unwrap_or_else(|| String::from("none"));
    println!("{} maze, {} cells, {} passages. {} solver solved: {}, exit: {}, path steps: {}, cells explored: {}",
             generator.name(),
             maze.total_cells(),
             maze.passages_count(),
             solver.name(),
             solver.is_solved(),
             exit_used,
             solver.solver_path().len(),
             solver.cells_explored());

    Ok(())
}

/// Parse `"<rows>x<columns>"`.
fn parse_level(level: &str) -> Result<LevelDimensions> {
    let mut sizes = level.split('x').map(|size| size.trim().parse::<usize>());
    match (sizes.next(), sizes.next(), sizes.next()) {
        (Some(Ok(rows)), Some(Ok(cols)), None) => Ok(LevelDimensions::new(RowsCount(rows), ColumnsCount(cols))),
        _ => Err(format!("Level size {} should be given as <rows>x<columns>", level).into()),
    }
}

fn parse_coordinates(coordinates: &[String]) -> Result<Vec<Coordinate3D>> {
    coordinates.iter()
        .map(|coordinate| {
            coordinate.parse::<Coordinate3D>()
                .chain_err(|| format!("Cannot read coordinate {}", coordinate))
        })
        .collect()
}

/// Below the last column of the top level.
fn default_exit(maze: &Maze3D) -> Result<Coordinate3D> {
    let top = maze.level_num().checked_sub(1).ok_or("The maze needs at least one level")?;
    let (rows, cols) = (maze.row_num(top), maze.col_num(top));
    if cols == 0 {
        return Err("The top level has no cells for a default exit".into());
    }
    Ok(Coordinate3D::new(top as isize, rows as isize, cols as isize - 1))
}
