//! Isomesh CLI - remeshing of the built-in test surfaces.
//!
//! Usage: isomesh <COMMAND> --shape <SHAPE> [OPTIONS]
//!
//! Run `isomesh --help` for available commands. Set `RUST_LOG=debug` for
//! per-iteration logging.

use std::io::Write;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};

use isomesh::algo::remesh::{
    self, out_of_band_fraction, total_valence_excess, valence_excess, RemeshOptions, TargetBand,
};
use isomesh::algo::{Progress, RemeshStage};
use isomesh::mesh::{shapes, HalfEdgeMesh};

#[derive(Parser)]
#[command(name = "isomesh")]
#[command(author, version, about = "Isotropic remeshing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        #[command(flatten)]
        input: ShapeArgs,
    },

    /// Remesh a built-in shape
    Remesh {
        #[command(flatten)]
        input: ShapeArgs,

        /// Number of iterations
        #[arg(short, long, default_value = "5")]
        iterations: usize,

        /// Lower band bound as a multiple of the mean edge length
        #[arg(long, default_value = "0.8")]
        min_ratio: f64,

        /// Upper band bound as a multiple of the mean edge length
        #[arg(long, default_value_t = 4.0 / 3.0)]
        max_ratio: f64,

        /// Relaxation damping factor (0.0 to 1.0)
        #[arg(short, long, default_value = "0.2")]
        damping: f64,

        /// Compute relaxation and projection on the thread pool
        #[arg(long)]
        parallel: bool,
    },
}

#[derive(Args)]
struct ShapeArgs {
    /// Surface to operate on
    #[arg(short, long, value_enum, default_value = "cube")]
    shape: Shape,

    /// Cells per side (grid only)
    #[arg(short, long, default_value = "8")]
    resolution: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Unit square made of two triangles
    Quad,
    /// Unit cube made of twelve triangles
    Cube,
    /// Planar patch with two interior vertices of valence 6
    HexPatch,
    /// Rhombus split along its long diagonal
    Diamond,
    /// Regular square grid of side 1
    Grid,
    /// Regular octahedron
    Octahedron,
    /// Triangular bipyramid
    Bipyramid,
}

impl ShapeArgs {
    fn build(&self) -> isomesh::error::Result<HalfEdgeMesh> {
        match self.shape {
            Shape::Quad => shapes::unit_quad(),
            Shape::Cube => shapes::unit_cube(),
            Shape::HexPatch => shapes::hex_patch(),
            Shape::Diamond => shapes::diamond(),
            Shape::Grid => shapes::grid(self.resolution, 1.0),
            Shape::Octahedron => shapes::octahedron(),
            Shape::Bipyramid => shapes::bipyramid(),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Remesh {
            input,
            iterations,
            min_ratio,
            max_ratio,
            damping,
            parallel,
        } => {
            let options = RemeshOptions::default()
                .with_iterations(iterations)
                .with_band_ratios(min_ratio, max_ratio)
                .with_damping(damping)
                .with_parallel(parallel);
            cmd_remesh(&input, &options)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that redraws a single status line on stderr.
fn create_progress() -> Progress {
    Progress::new(|event| {
        let percent = (event.fraction() * 100.0).round() as usize;

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        if event.stage == RemeshStage::Done {
            eprintln!("\r[{}{}] {:3}% {:<24}", bar, space, percent, event.stage);
            return;
        }

        eprint!(
            "\r[{}{}] {:3}% iteration {}/{}: {:<16}",
            bar,
            space,
            percent,
            event.iteration + 1,
            event.iterations,
            event.stage
        );
        let _ = std::io::stderr().flush();
    })
}

fn print_summary(mesh: &HalfEdgeMesh) {
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());

    let boundary_vertices = mesh
        .vertex_ids()
        .filter(|&v| mesh.is_boundary_vertex(v))
        .count();
    let boundary_edges = mesh
        .edge_ids()
        .filter(|&e| mesh.is_boundary_edge(e))
        .count();
    if boundary_vertices == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!(
            "Topology: Open ({} boundary vertices, {} boundary edges)",
            boundary_vertices, boundary_edges
        );
    }

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: [{:.3}, {:.3}, {:.3}] - [{:.3}, {:.3}, {:.3}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    println!("Surface area: {:.6}", mesh.surface_area());
    println!("Average edge length: {:.6}", mesh.average_edge_length());
    println!(
        "Valence excess: {} interior, {} total",
        valence_excess(mesh),
        total_valence_excess(mesh)
    );
}

fn cmd_info(input: &ShapeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = input.build()?;

    print_summary(&mesh);

    let band = TargetBand::from_mean_edge_length(
        mesh.average_edge_length(),
        &RemeshOptions::default(),
    );
    println!("Default band: [{:.6}, {:.6}]", band.min, band.max);
    println!(
        "Out of band: {:.1}% of interior edges",
        out_of_band_fraction(&mesh, &band) * 100.0
    );

    Ok(())
}

fn cmd_remesh(input: &ShapeArgs, options: &RemeshOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = input.build()?;

    println!("Loaded: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let mode = if options.parallel { "parallel" } else { "sequential" };
    println!(
        "Applying isotropic remeshing ({} iterations, damping={}, {})...",
        options.iterations, options.damping, mode
    );

    let progress = create_progress();
    let start = Instant::now();
    let stats = remesh::isotropic_remesh_with_progress(&mut mesh, options, &progress)?;
    let elapsed = start.elapsed();

    println!("Band: [{:.6}, {:.6}]", stats.band.min, stats.band.max);
    println!(
        "{:>4} {:>7} {:>9} {:>6} {:>8} {:>9} {:>12}",
        "iter",
        "splits",
        "collapses",
        "flips",
        "relaxed",
        "projected",
        "out of band"
    );
    for (i, it) in stats.iterations.iter().enumerate() {
        println!(
            "{:>4} {:>7} {:>9} {:>6} {:>8} {:>9} {:>11.1}%",
            i + 1,
            it.splits,
            it.collapses,
            it.flips,
            it.relaxed,
            it.projected,
            it.out_of_band_fraction * 100.0
        );
    }

    println!();
    print_summary(&mesh);
    println!("Done in {:.2?}", elapsed);

    Ok(())
}
