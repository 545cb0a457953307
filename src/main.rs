use std::path::PathBuf;

use clap::{Parser, Subcommand};
use zorder_core::{
    analysis::{carry_free, AdditivityGrid},
    AdditivityChecker, CurveConfig, LocalityAnalyzer, MortonCodec,
};

#[derive(Parser, Debug)]
#[command(name = "zorder", about = "Morton (Z-order) curve codec and analysis CLI")]
struct Cli {
    /// Path to config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the key width in bits
    #[arg(long, global = true)]
    bits: Option<u32>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Map a key to its coordinates.
    Encode {
        /// Key to encode
        #[arg(long)]
        key: u64,
    },

    /// Map coordinates (axis 0 first) back to a key.
    Decode {
        /// One value per axis
        coords: Vec<u64>,
    },

    /// Print the coordinate sequence for a run of consecutive keys.
    Curve {
        /// First key
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// Number of keys
        #[arg(long, default_value_t = 16)]
        count: usize,
    },

    /// Step-distance statistics over a key range (JSON).
    Locality {
        /// First key of the range
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// Last key of the range (inclusive)
        #[arg(long)]
        end: u64,
    },

    /// Additivity grid over [0, n]^2.
    Additivity {
        /// Largest operand
        #[arg(long, default_value_t = 15)]
        n: u64,
        /// Print each axis plane as ASCII
        #[arg(long)]
        render: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CurveConfig::load(path)?,
        None => CurveConfig::default(),
    };
    if let Some(bits) = cli.bits {
        config.bits = bits;
    }
    config.validate()?;
    tracing::debug!("Using config: {:?}", config);

    match config.dims {
        2 => run::<2>(&config, cli.command),
        3 => run::<3>(&config, cli.command),
        d => anyhow::bail!("unsupported dimension count {} (CLI handles 2 or 3)", d),
    }
}

fn run<const D: usize>(config: &CurveConfig, command: Commands) -> anyhow::Result<()> {
    let codec = MortonCodec::<D>::from_config(config)?;

    match command {
        Commands::Encode { key } => {
            let coords = codec.encode(key)?;
            println!("{} -> {:?}", key, coords);
        }
        Commands::Decode { coords } => {
            let point: [u64; D] = coords.as_slice().try_into().map_err(|_| {
                anyhow::anyhow!("expected {} coordinates, got {}", D, coords.len())
            })?;
            println!("{:?} -> {}", point, codec.decode(&point)?);
        }
        Commands::Curve { start, count } => {
            let mut points = vec![[0u64; D]; count];
            codec.encode_range_into(start, &mut points)?;
            for (i, p) in points.iter().enumerate() {
                println!("{}\t{:?}", start + i as u64, p);
            }
        }
        Commands::Locality { start, end } => {
            let analyzer = LocalityAnalyzer::new(&codec);
            let summary = analyzer.summarize(start..=end, &config.percentiles, config.top_spikes)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Additivity { n, render } => {
            let grid = AdditivityChecker::new(&codec).check(n)?;
            report_additivity(&grid, render);
        }
    }

    Ok(())
}

fn report_additivity<const D: usize>(grid: &AdditivityGrid<D>, render: bool) {
    let side = grid.side();
    let cells = side * side;
    println!("=== Additivity over [0, {}]^2 ===", grid.max_operand());

    for axis in 0..D {
        let held = grid.plane(axis).iter().filter(|&&h| h).count();
        println!(
            "  axis {}: {} / {} cells additive ({:.1}%)",
            axis,
            held,
            cells,
            100.0 * held as f64 / cells as f64
        );
    }

    let all_axes = (0..cells)
        .filter(|&i| (0..D).all(|axis| grid.plane(axis)[i]))
        .count();
    let carry_free_cells = (0..side as u64)
        .flat_map(|a| (0..side as u64).map(move |b| (a, b)))
        .filter(|&(a, b)| carry_free(a, b))
        .count();
    println!(
        "  all axes: {} cells (carry-free pairs: {})",
        all_axes, carry_free_cells
    );

    if render {
        for axis in 0..D {
            println!("\n  axis {} (rows a, columns b):", axis);
            for row in grid.plane(axis).chunks(side) {
                let line: String = row.iter().map(|&h| if h { '#' } else { '.' }).collect();
                println!("  {}", line);
            }
        }
    }
}
