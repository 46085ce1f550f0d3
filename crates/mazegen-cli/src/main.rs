use clap::{Parser, Subcommand};
use hypermaze::{
    DimensionConfig, GenerationConfig, Maze, RandomSource, ViewScales, Viewport, AXIS_Z,
    DEFAULT_MAX_CELLS,
};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "mazegen-cli",
    about = "Generate multidimensional mazes and print 2D slices"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one 2D slice of a freshly generated maze as text
    Render {
        /// Comma-separated dimension sizes, e.g. 4,4,3
        #[arg(long, value_delimiter = ',', conflicts_with = "config")]
        dims: Option<Vec<i32>>,
        /// JSON generation config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Derive sizes from a cell budget instead of explicit sizes
        #[arg(long, conflicts_with_all = ["dims", "config"])]
        max_cells: Option<i32>,
        /// Dimension count to use with --max-cells
        #[arg(long, requires = "max_cells")]
        dim_count: Option<usize>,
        /// RNG seed; omit for a different maze every run
        #[arg(long)]
        seed: Option<u64>,
        /// Layer along the Z axis to display (defaults to the entrance layer)
        #[arg(long)]
        layer: Option<i32>,
        /// The three displayed axes as dimension indices: X Y Z
        #[arg(long, num_args = 3)]
        axes: Option<Vec<usize>>,
        #[arg(long, default_value_t = 5)]
        interior_scale: i32,
        #[arg(long, default_value_t = 1)]
        bound_scale: i32,
        #[arg(long, default_value_t = 2)]
        opening_scale: i32,
    },
    /// Print summary information about a generated maze
    Stats {
        /// Comma-separated dimension sizes, e.g. 4,4,3
        #[arg(long, value_delimiter = ',', conflicts_with = "config")]
        dims: Option<Vec<i32>>,
        /// JSON generation config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// RNG seed; omit for a different maze every run
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn load_generation_config(path: &Path) -> io::Result<GenerationConfig> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}

struct Request {
    config: DimensionConfig,
    seed: Option<u64>,
    scales: Option<ViewScales>,
}

fn resolve_request(
    dims: Option<Vec<i32>>,
    config_path: Option<&Path>,
    max_cells: Option<i32>,
    dim_count: Option<usize>,
    seed: Option<u64>,
) -> Result<Request, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        let file = load_generation_config(path)?;
        return Ok(Request {
            config: DimensionConfig::new(&file.dimensions)?,
            seed: seed.or(file.seed),
            scales: Some(ViewScales::new(
                file.interior_scale,
                file.bound_scale,
                file.opening_scale,
            )),
        });
    }
    if let Some(dims) = dims {
        return Ok(Request {
            config: DimensionConfig::new(&dims)?,
            seed,
            scales: None,
        });
    }
    let budget = max_cells.unwrap_or(DEFAULT_MAX_CELLS);
    let mut rng = match seed {
        Some(seed) => RandomSource::from_seed(seed),
        None => RandomSource::from_entropy(),
    };
    Ok(Request {
        config: DimensionConfig::from_cell_budget(budget, dim_count, &mut rng)?,
        seed,
        scales: None,
    })
}

/// Expand the viewport's classification grid into a character canvas using
/// the per-value geometry: walls fill `#`, layer openings mark `+` (up) and
/// `-` (down).
fn render_slice(maze: &Maze, viewport: &Viewport) -> Vec<String> {
    let scales = viewport.scales();
    let size_x = maze.size(viewport.axes()[0]);
    let size_y = maze.size(viewport.axes()[1]);
    let canvas_w = (size_x * scales.cell_span() + scales.bound()) as usize;
    let canvas_h = (size_y * scales.cell_span() + scales.bound()) as usize;
    let mut canvas = vec![vec![' '; canvas_w]; canvas_h];

    let mut fill = |rect: hypermaze::OpeningRect, glyph: char| {
        for y in (rect.center_y - rect.height / 2)..=(rect.center_y + rect.height / 2) {
            for x in (rect.center_x - rect.width / 2)..=(rect.center_x + rect.width / 2) {
                if x >= 0 && (x as usize) < canvas_w && y >= 0 && (y as usize) < canvas_h {
                    canvas[y as usize][x as usize] = glyph;
                }
            }
        }
    };

    for gy in 0..viewport.height() {
        for gx in 0..viewport.width() {
            let value = viewport.value(gx, gy);
            let view = [gx as i32, gy as i32];
            if value.is_bound() {
                for rect in viewport.bound_geometry(view, value) {
                    fill(rect, '#');
                }
            } else {
                let [ascending, descending] = viewport.interior_geometry(view, value);
                if let Some(rect) = ascending {
                    fill(rect, '+');
                }
                if let Some(rect) = descending {
                    fill(rect, '-');
                }
            }
        }
    }

    canvas.into_iter().map(|row| row.into_iter().collect()).collect()
}

fn print_summary(maze: &Maze) {
    let dims = maze.dims();
    println!("Dimensions: {:?}", maze.sizes());
    println!("Cells:      {}", maze.cell_count());
    println!("Entrance:   {:?}", &maze.entrance()[..dims]);
    println!("Exit:       {:?}", &maze.exit()[..dims]);
    println!("Axes:       {:?}", maze.initial_axes());
    let reachable = maze.grid().reachable_from(maze.entrance());
    println!(
        "Connected:  {} ({reachable}/{} cells reachable from the entrance)",
        reachable == maze.cell_count(),
        maze.cell_count()
    );
}

fn run_render(
    request: Request,
    layer: Option<i32>,
    axes: Option<Vec<usize>>,
    interior_scale: i32,
    bound_scale: i32,
    opening_scale: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let scales = request
        .scales
        .unwrap_or_else(|| ViewScales::new(interior_scale, bound_scale, opening_scale));
    let maze = Maze::generate(request.config, request.seed)?;
    let mut viewport = Viewport::new(&maze, scales);

    if let Some(axes) = axes {
        let triple: [usize; 3] = axes
            .try_into()
            .map_err(|_| "expected exactly three axes")?;
        if triple.iter().any(|&a| a >= maze.dims())
            || triple[0] == triple[1]
            || triple[0] == triple[2]
            || triple[1] == triple[2]
        {
            return Err(format!("invalid axes {triple:?} for {} dimensions", maze.dims()).into());
        }
        viewport.set_axes(triple);
    }
    if let Some(layer) = layer {
        let z = viewport.axes()[AXIS_Z];
        if layer < 0 || layer >= maze.size(z) {
            return Err(format!("layer {layer} out of range for dimension {z}").into());
        }
        viewport.set_layer(layer);
    }
    viewport.refresh(&maze);
    log::info!(
        "rendering axes {:?} at layer {}",
        viewport.axes(),
        viewport.center()[viewport.axes()[AXIS_Z]]
    );

    for line in render_slice(&maze, &viewport) {
        println!("{line}");
    }
    println!();
    print_summary(&maze);
    Ok(())
}

fn run_stats(request: Request) -> Result<(), Box<dyn std::error::Error>> {
    let maze = Maze::generate(request.config, request.seed)?;
    print_summary(&maze);
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Render {
            dims,
            config,
            max_cells,
            dim_count,
            seed,
            layer,
            axes,
            interior_scale,
            bound_scale,
            opening_scale,
        } => resolve_request(dims, config.as_deref(), max_cells, dim_count, seed).and_then(
            |request| {
                run_render(
                    request,
                    layer,
                    axes,
                    interior_scale,
                    bound_scale,
                    opening_scale,
                )
            },
        ),
        Command::Stats { dims, config, seed } => {
            resolve_request(dims, config.as_deref(), None, None, seed).and_then(run_stats)
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
