//! Gumline CLI - gum surface reconstruction on a synthetic arch.
//!
//! Usage: gumline <COMMAND> [OPTIONS]
//!
//! Run `gumline --help` for available commands.

mod arch;

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use gumline::algo::anchors::find_control_points;
use gumline::algo::curve::{create_offset_curve, CatmullRomCurve};
use gumline::algo::Progress;
use gumline::mesh::TriMesh;
use gumline::pipeline::{reconstruct, ReconstructionInput, ReconstructionOptions};

#[derive(Parser)]
#[command(name = "gumline")]
#[command(author, version, about = "Gum surface reconstruction CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct the gum surface of a synthetic arch and print statistics
    Demo {
        /// Number of gingival margin points
        #[arg(short, long, default_value = "24")]
        gingival: usize,

        /// Search and falloff distance D
        #[arg(short = 'D', long, default_value = "2.0")]
        distance: f64,

        /// Falloff sharpness alpha
        #[arg(short, long, default_value = "1.0")]
        alpha: f64,

        /// Lowest gingival point height
        #[arg(long, default_value = "6.0")]
        min_height: f64,

        /// Highest gingival point height
        #[arg(long, default_value = "12.0")]
        max_height: f64,

        /// Distance from the guiding curve to the outer curve
        #[arg(short, long, default_value = "5.0")]
        offset: f64,

        /// Points per line of the flat base
        #[arg(long, default_value = "30")]
        points_per_line: usize,

        /// Points inserted between deformed points
        #[arg(long, default_value = "5")]
        subdivisions: usize,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Print the guiding and outer curves of a synthetic arch as CSV
    Curve {
        /// Which curve to print
        #[arg(short, long, value_enum, default_value = "guide")]
        which: CurveKind,

        /// Number of curve divisions
        #[arg(short, long, default_value = "100")]
        samples: usize,

        /// Distance from the guiding curve to the outer curve
        #[arg(short, long, default_value = "5.0")]
        offset: f64,

        /// Vertical lift of the guiding curve
        #[arg(long, default_value = "0.0")]
        display_offset: f64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CurveKind {
    /// Catmull-Rom curve through the control points
    Guide,
    /// Guiding curve offset sideways
    Outer,
    /// The five control points
    Control,
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
        Commands::Demo {
            gingival,
            distance,
            alpha,
            min_height,
            max_height,
            offset,
            points_per_line,
            subdivisions,
            sequential,
        } => {
            let options = ReconstructionOptions::default()
                .with_distance(distance)
                .with_alpha(alpha)
                .with_lateral_offset(offset)
                .with_points_per_line(points_per_line)
                .with_subdivisions(subdivisions)
                .with_parallel(!sequential);
            cmd_demo(gingival, min_height, max_height, options, sequential)?;
        }

        Commands::Curve {
            which,
            samples,
            offset,
            display_offset,
        } => {
            cmd_curve(which, samples, offset, display_offset)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Parallel stages report out of order; only ever move forward
        let percent = max_percent.fetch_max(raw_percent, Ordering::Relaxed).max(raw_percent);
        if percent != raw_percent && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        // Pad so a shorter message fully overwrites a longer one
        eprint!("\r[{}{}] {:3}% {:<32}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn print_mesh_stats(name: &str, mesh: &TriMesh) {
    println!("{}:", name);
    println!("  Vertices: {}", mesh.num_vertices());
    println!("  Faces: {}", mesh.num_faces());
    println!("  Surface area: {:.3}", mesh.surface_area());
    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "  Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    println!(
        "  Topology: {}",
        if mesh.is_closed() { "Closed" } else { "Open" }
    );
}

fn cmd_demo(
    gingival: usize,
    min_height: f64,
    max_height: f64,
    options: ReconstructionOptions,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let arch = arch::generate(gingival, min_height, max_height);
    println!(
        "Synthetic arch: {} boundary points, {} gingival points, {} mesh vertices",
        arch.boundary.len(),
        arch.gingival.len(),
        arch.vertices.len()
    );

    let mode = if sequential { "sequential" } else { "parallel" };
    println!(
        "Reconstructing (D={}, alpha={}, {})...",
        options.profile.distance, options.profile.alpha, mode
    );

    let input = ReconstructionInput::new(&arch.boundary, &arch.gingival, &arch.heights, &arch.vertices);
    let options = options.with_progress(create_progress());

    let start = Instant::now();
    let output = reconstruct(&input, &options)?;
    let elapsed = start.elapsed();

    println!("Control points:");
    for p in output.control_points.as_slice() {
        println!("  ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
    }

    let min_y = output.deformed.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = output.deformed.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    println!(
        "Deformed points: {} (height range [{:.3}, {:.3}])",
        output.deformed.len(),
        min_y,
        max_y
    );

    print_mesh_stats("Gum cap", &output.gum);
    print_mesh_stats("Base", &output.base);
    println!("Done ({:.2?})", elapsed);

    Ok(())
}

fn cmd_curve(
    which: CurveKind,
    samples: usize,
    offset: f64,
    display_offset: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let arch = arch::generate(0, 0.0, 0.0);
    let control = find_control_points(&arch.boundary)?;

    let points = match which {
        CurveKind::Control => control.as_slice().to_vec(),
        CurveKind::Guide => CatmullRomCurve::new(control.as_slice(), display_offset)?.points(samples),
        CurveKind::Outer => {
            let guide = CatmullRomCurve::new(control.as_slice(), display_offset)?.points(samples);
            create_offset_curve(&guide, offset)
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "x,y,z")?;
    for p in &points {
        writeln!(out, "{:.6},{:.6},{:.6}", p.x, p.y, p.z)?;
    }

    Ok(())
}
