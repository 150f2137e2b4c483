use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use organic_growth::{
    FieldKind, GrowthConfig, GrowthSession, KernelLibrary, RuleBook, SeedStrategy,
    domain::Execution,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "organic-growth")]
#[command(about = "Grow coral, lichen, mycelium and crystal patterns on a torus")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a grid and grow it, printing active-cell counts
    Run {
        /// Path to config file (JSON); flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rule name, e.g. coral, lichen, mycelium, crystal
        #[arg(long)]
        pattern: Option<String>,

        /// Grid extents, e.g. 100,100 or 30,30,30
        #[arg(long, value_delimiter = ',')]
        shape: Option<Vec<usize>>,

        /// Seeding: random, center or line
        #[arg(long)]
        seed_with: Option<String>,

        /// Density for random seeding
        #[arg(long, default_value_t = 0.3)]
        density: f64,

        /// Radius for center seeding
        #[arg(long, default_value_t = 10.0)]
        radius: f64,

        #[arg(long)]
        generations: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Environment applied after growth: moisture, light or none
        #[arg(long)]
        environment: Option<String>,

        /// Compute neighbor fields on one thread
        #[arg(long)]
        serial: bool,
    },
    /// List the preset rules for 2D and 3D grids
    Patterns,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn parse_seed_strategy(name: &str, density: f64, radius: f64) -> Result<SeedStrategy> {
    match name {
        "random" => Ok(SeedStrategy::Random { density }),
        "center" => Ok(SeedStrategy::Center { radius }),
        "line" => Ok(SeedStrategy::Line),
        other => anyhow::bail!("unknown seeding strategy {other:?} (expected random, center or line)"),
    }
}

fn print_patterns() -> Result<()> {
    let library = KernelLibrary::new();
    for dimensionality in [2, 3] {
        let book = RuleBook::for_dimensionality(&library, dimensionality)?;
        println!("{dimensionality}D patterns:");
        for rule in book.iter() {
            println!(
                "  {:<10} kernel={:<12} survive={}-{} birth={}-{} noise={} colors={}",
                rule.name(),
                rule.kernel().shape().name(),
                rule.survive().low(),
                rule.survive().high(),
                rule.birth().low(),
                rule.birth().high(),
                rule.noise().map_or("-".to_string(), |n| n.to_string()),
                rule.colors().join(","),
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("organic_growth=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            pattern,
            shape,
            seed_with,
            density,
            radius,
            generations,
            seed,
            environment,
            serial,
        } => {
            let mut cfg = match config {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read config {}", path.display()))?;
                    serde_json::from_str::<GrowthConfig>(&text)
                        .with_context(|| format!("Failed to parse config {}", path.display()))?
                }
                None => GrowthConfig::default(),
            };
            if let Some(pattern) = pattern {
                cfg.pattern = pattern;
            }
            if let Some(shape) = shape {
                cfg.shape = shape;
            }
            if let Some(name) = seed_with {
                cfg.seed_strategy = parse_seed_strategy(&name, density, radius)?;
            }
            if let Some(generations) = generations {
                cfg.generations = generations;
            }
            if let Some(seed) = seed {
                cfg.seed = seed;
            }
            if let Some(env) = environment {
                cfg.environment = match env.as_str() {
                    "none" => None,
                    name => Some(name.parse::<FieldKind>()?),
                };
            }
            if serial {
                cfg.execution = Execution::Serial;
            }

            let mut session = GrowthSession::new(cfg).context("Failed to set up growth session")?;
            let summary = session.run()?;

            for (generation, active) in summary.active_counts.iter().enumerate() {
                println!("generation {generation:>4}: {active} active cells");
            }
            if summary.extinct {
                println!("Pattern died out after {} generations", summary.generations_run());
            } else {
                println!(
                    "{} grew for {} generations, {} active cells{}",
                    summary.pattern,
                    summary.generations_run(),
                    summary.final_active(),
                    if summary.environment_applied { " (environment applied)" } else { "" },
                );
            }
        }
        Commands::Patterns => print_patterns()?,
        Commands::DumpDefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&GrowthConfig::default())?);
        }
    }

    Ok(())
}
