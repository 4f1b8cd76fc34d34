use std::collections::BTreeMap;

use anyhow::Context;
use clap::Parser;

use ripple::Simulator;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit description file.
    filename: String,

    /// Define an input sequence, eg `-i B=1011`. Can be given multiple times.
    #[arg(short, long, value_name = "SIGNAL=BITS")]
    input: Vec<String>,

    /// Only display these signals. If not given, all outputs are shown.
    #[arg(short, long, value_name = "SIGNAL")]
    output: Vec<String>,

    /// Number of simulation steps. Defaults to the longest input sequence.
    #[arg(short, long)]
    steps: Option<usize>,

    /// Emit the outputs and per-step history as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose)?;

    let mut inputs: BTreeMap<String, String> = BTreeMap::new();
    for spec in &args.input {
        let (name, bits) = spec
            .split_once('=')
            .with_context(|| format!("Invalid input `{spec}`: expected SIGNAL=BITS"))?;
        inputs.insert(name.to_string(), bits.to_string());
    }

    let steps = args
        .steps
        .unwrap_or_else(|| inputs.values().map(|bits| bits.len()).max().unwrap_or(0));
    if steps == 0 {
        println!("No steps to simulate (no inputs given and --steps not set).");
        return Ok(());
    }

    let text = std::fs::read_to_string(&args.filename)
        .with_context(|| format!("Couldn't read circuit file: {}", args.filename))?;

    let circuit = ripple::parse(&text)?;
    let sim = Simulator::new(&circuit)?;
    let result = sim.run(&inputs, steps)?;

    if args.json {
        let json = serde_json::json!({
            "outputs": result.outputs,
            "history": result.history,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("{}", "=".repeat(30));
    println!("      SIMULATION RESULTS");
    println!("{}", "=".repeat(30));

    if !inputs.is_empty() {
        println!();
        println!("--- Inputs ---");
        for (name, bits) in &inputs {
            println!("  {:<6} {bits}", format!("{name}:"));
        }
    }

    println!();
    println!("--- Outputs ---");
    for (name, bits) in &result.outputs {
        if !args.output.is_empty() && !args.output.contains(name) {
            continue;
        }
        println!("  {:<6} {bits}", format!("{name}:"));
    }
    println!();
    println!("{}", "=".repeat(30));

    Ok(())
}

fn init_logger(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
