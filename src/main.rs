use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use docxtree::document::{
    build_to_file, extract_document_with, extract_documents, hyperlinks, outline, plain_text,
    read_tree, tree_to_json, write_tree,
};
use docxtree::{Config, DocumentTemplate, engine};

#[derive(Parser)]
#[command(name = "docxtree")]
#[command(about = "Round-trip .docx documents through an editable JSON tree")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract one or more documents to JSON trees
    Extract {
        /// Input .docx files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (one input) or directory (several inputs)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Build a .docx from a JSON tree
    Build {
        /// Input tree (.json)
        tree: PathBuf,

        /// Output .docx file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Extract a document and rebuild it unchanged
    Roundtrip {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Also write the intermediate tree here
        #[arg(long)]
        tree: Option<PathBuf>,
    },
    /// Print the text, outline or hyperlinks of a document or tree
    Inspect {
        /// A .docx file or a .json tree
        input: PathBuf,

        #[arg(long, conflicts_with = "links")]
        outline: bool,

        #[arg(long)]
        links: bool,
    },
    /// Manage the configuration file
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().context("Failed to load configuration")?,
    };

    if let Command::Config { init } = &cli.command {
        return run_config(*init, &config);
    }

    engine::initialize(&config.engine).context("Failed to initialize document engine")?;

    match cli.command {
        Command::Extract {
            inputs,
            output,
            pretty,
        } => run_extract(inputs, output, pretty, &config).await,
        Command::Build { tree, output } => {
            let tree = read_tree(&tree)
                .with_context(|| format!("Failed to read tree {}", tree.display()))?;
            build_to_file(&tree, &output, &config.build)
                .with_context(|| format!("Failed to build {}", output.display()))?;
            println!("Wrote {}", output.display());
            Ok(())
        }
        Command::Roundtrip {
            input,
            output,
            tree,
        } => {
            let template = extract_document_with(&input, &config.extract)
                .with_context(|| format!("Failed to extract {}", input.display()))?;
            if let Some(tree_path) = tree {
                write_tree(&template, &tree_path, true)?;
            }
            build_to_file(&template, &output, &config.build)
                .with_context(|| format!("Failed to build {}", output.display()))?;
            println!("Wrote {}", output.display());
            Ok(())
        }
        Command::Inspect {
            input,
            outline: show_outline,
            links,
        } => {
            let template = load_any(&input, &config)?;
            if show_outline {
                for item in outline(&template) {
                    println!(
                        "{:>3}  {} ({} blocks)",
                        item.section_index, item.title, item.block_count
                    );
                }
            } else if links {
                for (text, url) in hyperlinks(&template) {
                    println!("{text}\t{url}");
                }
            } else {
                println!("{}", plain_text(&template));
            }
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}

async fn run_extract(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    config: &Config,
) -> Result<()> {
    if let [input] = inputs.as_slice() {
        let template = extract_document_with(input, &config.extract)
            .with_context(|| format!("Failed to extract {}", input.display()))?;
        match output {
            Some(path) => write_tree(&template, &path, pretty)?,
            None => println!("{}", tree_to_json(&template, pretty)?),
        }
        return Ok(());
    }

    let out_dir = output.unwrap_or_else(|| PathBuf::from("."));
    if !out_dir.is_dir() {
        bail!("Output {} must be a directory when extracting several files", out_dir.display());
    }

    let results = extract_documents(inputs.clone(), config.extract.clone()).await;
    let mut failures = 0;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(template) => {
                let target = out_dir.join(json_name(input));
                write_tree(&template, &target, pretty)?;
                println!("{} -> {}", input.display(), target.display());
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {e}", input.display());
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} documents failed", inputs.len());
    }
    Ok(())
}

fn run_config(init: bool, config: &Config) -> Result<()> {
    if init {
        Config::init_default()?;
        if let Some(path) = Config::get_config_path() {
            println!("Wrote {}", path.display());
        }
    } else {
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}

fn load_any(input: &Path, config: &Config) -> Result<DocumentTemplate> {
    let is_json = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(read_tree(input)?)
    } else {
        Ok(extract_document_with(input, &config.extract)?)
    }
}

fn json_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    format!("{stem}.json")
}
