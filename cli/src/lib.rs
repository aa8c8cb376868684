use anyhow::{anyhow, Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use linkedquad::config::Config;
use linkedquad::doctor::audit;
use linkedquad::util::{init_logging, load_file, remove_file_quads, write_tree, write_tree_to_file};
use linkedquad::{PrefixMap, QuadTree, QuadTreeBuilder};
use log::info;
use oxigraph::io::RdfFormat;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "linkedquad")]
#[command(about = "Inspect, convert and compare RDF datasets with a linked quad tree")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
    /// JSON configuration file with `prefixes` and `strict`
    #[clap(long, short, global = true)]
    config: Option<PathBuf>,
    /// Prefix used to compact IRIs, as NAME=IRI. Repeatable; overrides the config file
    #[clap(long = "prefix", short, global = true)]
    prefixes: Vec<String>,
    /// Strict mode - abort at the first statement that fails to parse
    #[clap(long, action, default_value = "false", global = true)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Trig,
    Nquads,
}

impl From<OutputFormat> for RdfFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Trig => RdfFormat::TriG,
            OutputFormat::Nquads => RdfFormat::NQuads,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print quad, graph, subject, predicate and object counts
    Stat {
        /// RDF files to load (.trig, .nq, .ttl, .nt)
        #[clap(required = true)]
        inputs: Vec<PathBuf>,
        /// Print the counts as a JSON object
        #[clap(long, action, default_value = "false")]
        json: bool,
    },
    /// Merge the inputs and write them out as one dataset
    Convert {
        #[clap(required = true)]
        inputs: Vec<PathBuf>,
        /// Destination file
        #[clap(long, short)]
        output: PathBuf,
        /// Output format, defaults to the one implied by the output extension
        #[clap(long, short, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Report whether two datasets hold the same quads; exits non-zero if they differ
    Compare { left: PathBuf, right: PathBuf },
    /// Delete the quads listed in another file and write the remainder
    Subtract {
        input: PathBuf,
        /// File whose quads are removed from the input
        #[clap(long, short)]
        remove: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
    },
    /// Load the inputs and audit every maintained counter
    Check {
        #[clap(required = true)]
        inputs: Vec<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

fn parse_prefix(entry: &str) -> Result<(String, String)> {
    let (name, iri) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid prefix {entry:?}, expected NAME=IRI"))?;
    Ok((name.to_string(), iri.to_string()))
}

fn build_config(cmd: &Cli) -> Result<Config> {
    let base = match &cmd.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut prefixes: PrefixMap = base.prefixes;
    for entry in &cmd.prefixes {
        let (name, iri) = parse_prefix(entry)?;
        prefixes.insert(name, iri);
    }
    let config = Config::builder()
        .prefixes(prefixes)
        .strict(base.strict || cmd.strict)
        .build()?;
    Ok(config)
}

fn load_inputs(inputs: &[PathBuf], config: &Config) -> Result<QuadTreeBuilder> {
    let mut builder = QuadTreeBuilder::new(config.prefixes.clone());
    for input in inputs {
        load_file(&mut builder, input, config.parse_mode())?;
    }
    Ok(builder)
}

fn write_output(tree: &QuadTree, path: &Path, format: Option<OutputFormat>) -> Result<()> {
    match format {
        None => write_tree_to_file(tree, path),
        Some(format) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_tree(tree, &mut writer, format.into())?;
            writer.flush()?;
            Ok(())
        }
    }
}

fn execute(cmd: Cli) -> Result<()> {
    // The RUST_LOG env var is set by `init_logging` if LINKEDQUAD_LOG is present.
    // CLI flags for verbosity take precedence. If nothing is set, we default to "warn".
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let config = build_config(&cmd)?;
    if cmd.verbose || cmd.debug {
        config.print();
    }

    match cmd.command {
        Commands::Stat { inputs, json } => {
            let tree = load_inputs(&inputs, &config)?.deliver();
            if json {
                let stats = serde_json::json!({
                    "quads": tree.len(),
                    "graphs": tree.distinct_graph_count(),
                    "subjects": tree.distinct_subject_count(),
                    "predicates": tree.distinct_predicate_count(),
                    "objects": tree.distinct_object_count(),
                });
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Quads: {}", tree.len());
                println!("Graphs: {}", tree.distinct_graph_count());
                println!("Subjects: {}", tree.distinct_subject_count());
                println!("Predicates: {}", tree.distinct_predicate_count());
                println!("Objects: {}", tree.distinct_object_count());
            }
        }
        Commands::Convert {
            inputs,
            output,
            format,
        } => {
            let tree = load_inputs(&inputs, &config)?.deliver();
            write_output(&tree, &output, format)?;
            println!("Wrote {} quads to {}", tree.len(), output.display());
        }
        Commands::Compare { left, right } => {
            let left_tree = load_inputs(std::slice::from_ref(&left), &config)?.deliver();
            let right_tree = load_inputs(std::slice::from_ref(&right), &config)?.deliver();
            if left_tree == right_tree {
                println!("Datasets are equal ({} quads).", left_tree.len());
            } else {
                println!(
                    "Datasets differ: {} has {} quads, {} has {} quads.",
                    left.display(),
                    left_tree.len(),
                    right.display(),
                    right_tree.len()
                );
                return Err(anyhow!("Datasets differ"));
            }
        }
        Commands::Subtract {
            input,
            remove,
            output,
        } => {
            let mut builder = load_inputs(std::slice::from_ref(&input), &config)?;
            let removed = remove_file_quads(&mut builder, &remove, config.parse_mode())?;
            let tree = builder.deliver();
            write_tree_to_file(&tree, &output)?;
            println!("Removed {removed} quads; {} remain.", tree.len());
        }
        Commands::Check { inputs } => {
            let builder = load_inputs(&inputs, &config)?;
            let problems = audit(&builder);
            if problems.is_empty() {
                println!("No issues found.");
            } else {
                println!("Found {} issues:", problems.len());
                for problem in &problems {
                    println!("- {problem}");
                }
                return Err(anyhow!("Counter audit failed"));
            }
            info!("Checked {} quads", builder.len());
        }
    }

    Ok(())
}
