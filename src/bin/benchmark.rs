//! Performance benchmark comparing serial and parallel neighbor fields

use std::time::Instant;
use organic_growth::domain::{
    Execution, GrowthEngine, GrowthResult, KernelLibrary, RuleBook, SeedStrategy,
};

fn benchmark(
    shape: &[usize],
    rules: &RuleBook,
    pattern: &str,
    execution: Execution,
    iterations: usize,
) -> GrowthResult<f64> {
    let rule = rules.get(pattern)?;
    let mut engine = GrowthEngine::seeded(shape, SeedStrategy::Random { density: 0.3 }, 7)?
        .with_execution(execution);

    let start = Instant::now();
    engine.grow(rule, iterations)?;
    Ok(start.elapsed().as_secs_f64() * 1000.0 / iterations as f64)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("organic_growth=warn")
        .init();

    let library = KernelLibrary::new();
    let planar = RuleBook::planar(&library)?;
    let volumetric = RuleBook::volumetric(&library)?;

    println!("=== Organic Growth Performance Benchmark ===\n");
    println!("{:>14} {:>10} {:>12} {:>12} {:>10}", "Shape", "Pattern", "Serial", "Parallel", "Speedup");
    println!("{:-<62}", "");

    let iterations = 10;
    let cases = vec![
        (vec![100, 100], &planar, "coral"),
        (vec![500, 500], &planar, "lichen"),
        (vec![1000, 1000], &planar, "mycelium"),
        (vec![30, 30, 30], &volumetric, "coral"),
        (vec![64, 64, 64], &volumetric, "mycelium"),
        (vec![64, 64, 64], &volumetric, "crystal"),
    ];

    for (shape, rules, pattern) in cases {
        let serial_ms = benchmark(&shape, rules, pattern, Execution::Serial, iterations)?;
        let parallel_ms = benchmark(&shape, rules, pattern, Execution::Parallel, iterations)?;
        let label = shape.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("x");

        println!(
            "{:>14} {:>10} {:>10.2}ms {:>10.2}ms {:>9.1}x",
            label,
            pattern,
            serial_ms,
            parallel_ms,
            serial_ms / parallel_ms
        );
    }

    Ok(())
}
