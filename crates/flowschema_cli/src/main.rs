//! The flowschema command-line entry point.

use bumpalo::Bump;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use flowschema_graph::Collector;

/// Derive a JSON Schema from Flow-typed JavaScript entry files.
#[derive(Parser, Debug)]
#[command(name = "flowschema", version, about)]
struct Cli {
    /// Entry files to collect.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,

    /// Print the raw resolved type array instead of the schema document.
    #[arg(long)]
    dump_types: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    let arena = Bump::new();
    let mut collector = Collector::new(&arena);
    for file in &cli.files {
        collector.collect(file)?;
    }
    let fund = collector.finish();

    let document = if cli.dump_types {
        serde_json::to_value(fund.take_all().collect::<Vec<_>>())?
    } else {
        flowschema_render::render(&fund)
    };
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(rendered)
}
