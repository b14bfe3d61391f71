use clap::{CommandFactory, Parser, Subcommand};

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[cfg(feature = "jemalloc")]
use jemallocator::Jemalloc;
#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;
use simstat_core::cli::writers::json::JsonWrite;
use simstat_core::{
    normalize_files, parse_extra, OutputLayout, Result, SimulatorKind, StatisticsAssembler,
    TypedValue,
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Simulator statistics normalizer
#[derive(Parser, Debug)]
#[command(version, about = "Normalizes gem5, zsim and Sniper statistics dumps into one canonical JSON document", long_about = None)]
struct Cmds {
    #[command(subcommand)]
    pub commands: SubCommands,
}

#[derive(Subcommand, Debug)]
enum SubCommands {
    /// Normalize one or more statistics dumps
    Parse(Parse),
    /// Print the mapping table of a simulator
    Table(Table),
}

#[derive(Parser, Debug)]
struct Parse {
    // stats.txt, zsim.out or sim.out
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    // simulator that produced the dumps
    #[arg(long, short)]
    simulator: SimulatorKind,
    // destination file, single input only
    #[arg(long, short)]
    output: Option<PathBuf>,
    // destination directory
    #[arg(long, short = 'd', default_value = ".")]
    output_dir: PathBuf,
    // host wall-clock duration measured by the caller
    #[arg(long)]
    host_nanoseconds: Option<i64>,
    // extra scalar, `"Key" : value`
    #[arg(long, short)]
    extra: Vec<String>,
    // keep dotted keys instead of nested groups
    #[arg(long, action, default_value_t = false)]
    flat: bool,
    // also print the document
    #[arg(long, action, default_value_t = false)]
    echo: bool,
}

#[derive(Parser, Debug)]
struct Table {
    #[arg(long, short)]
    simulator: SimulatorKind,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cmds = Cmds::parse();
    let result = match cmds.commands {
        SubCommands::Parse(ref args) => {
            if args.output.is_some() && args.inputs.len() > 1 {
                Cmds::command()
                    .error(
                        clap::error::ErrorKind::ArgumentConflict,
                        "--output takes a single input, use --output-dir for several",
                    )
                    .exit();
            }
            parse(args)
        }
        SubCommands::Table(ref args) => {
            print!("{}", args.simulator.profile().table);
            Ok(true)
        }
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Normalizes every input; returns whether all of them were saved.
fn parse(args: &Parse) -> Result<bool> {
    let now = Instant::now();
    let mut extras: Vec<(String, TypedValue)> = args
        .extra
        .iter()
        .map(String::as_str)
        .map(parse_extra)
        .collect::<Result<_>>()?;
    if let Some(ns) = args.host_nanoseconds {
        extras.push(("HostNanoseconds".to_owned(), TypedValue::Integer(ns)));
    }

    // Default SIMSTAT_MAX_THREADS=one per input
    let max_threads: usize = env::var("SIMSTAT_MAX_THREADS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(args.inputs.len());
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(max_threads)
        .build_global()
    {
        debug!("keeping existing thread pool: {e}");
    }

    let profile = args.simulator.profile();
    let layout = match args.flat {
        true => OutputLayout::Flat,
        false => OutputLayout::Nested,
    };
    let assembler = StatisticsAssembler::new(profile)
        .extras(extras)
        .layout(layout);

    let mut failed: usize = 0;
    let docs = normalize_files(profile, &args.inputs);
    for ((input, path), doc) in args.inputs.iter().zip(destinations(args)).zip(docs) {
        let outcome = doc
            .and_then(|doc| assembler.assemble(doc))
            .and_then(|text| {
                text.write_json(&path)?;
                if args.echo {
                    println!("---------- outputStats ----------");
                    println!("{text}");
                    println!("---------- outputStats ----------");
                }
                println!("simstat: statistics saved to {:?}", path.display().to_string());
                Ok(())
            });
        if let Err(e) = outcome {
            error!(input = %input.display(), "{e}");
            failed += 1;
        }
    }

    println!(
        "simstat: {} statistics processing completed in {:#?}",
        args.simulator,
        now.elapsed()
    );
    Ok(failed == 0)
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stats".to_owned())
}

/// One distinct output path per input, in input order.
///
/// Several inputs are named after their file stem. Inputs sharing a stem are
/// prefixed with their parent directory name, and any name still taken gets
/// the input's index appended.
fn destinations(args: &Parse) -> Vec<PathBuf> {
    if let Some(output) = &args.output {
        return vec![output.clone()];
    }
    if args.inputs.len() == 1 {
        return vec![args.output_dir.join(args.simulator.output_file_name())];
    }

    let stems: Vec<String> = args.inputs.iter().map(|input| file_stem(input)).collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(stems.len());
    args.inputs
        .iter()
        .zip(&stems)
        .enumerate()
        .map(|(idx, (input, stem))| {
            let shared = stems.iter().filter(|s| *s == stem).count() > 1;
            let parent = input
                .parent()
                .and_then(Path::file_name)
                .map(|dir| dir.to_string_lossy().into_owned());
            let mut name = match (shared, parent) {
                (true, Some(dir)) => format!("{dir}-{stem}"),
                _ => stem.clone(),
            };
            let mut suffix = idx;
            while !taken.insert(name.clone()) {
                name = format!("{stem}-{suffix}");
                suffix += 1;
            }
            args.output_dir.join(format!("{name}.json"))
        })
        .collect()
}
