use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use texdraft::{Config, DocumentRoot, EditScript};

#[derive(Parser)]
#[command(name = "texdraft")]
#[command(about = "Build LaTeX documents from edit scripts")]
struct Cli {
    /// Config file with document defaults and placeholders
    #[arg(short, long, global = true, default_value = "texdraft.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an edit script to a new document and emit LaTeX
    Render {
        /// Edit script (TOML)
        script: PathBuf,

        /// Output .tex file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply an edit script and print the document outline
    Outline {
        /// Edit script (TOML)
        script: PathBuf,
    },
    /// Emit the LaTeX of an empty document
    New {
        /// Output .tex file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> texdraft::Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Render { script, output } => {
            let doc = build(&script, &config)?;
            write_output(&texdraft::generate(&doc), output.as_deref())
        }
        Commands::Outline { script } => {
            let doc = build(&script, &config)?;
            for entry in doc.outline() {
                println!(
                    "{}{} [{}]",
                    "  ".repeat(entry.depth),
                    entry.node.summary(),
                    entry.node.id
                );
            }
            Ok(())
        }
        Commands::New { output } => {
            let doc = DocumentRoot::from_config(&config);
            write_output(&texdraft::generate(&doc), output.as_deref())
        }
    }
}

fn build(path: &Path, config: &Config) -> texdraft::Result<DocumentRoot> {
    let script = EditScript::from_toml(&fs::read_to_string(path)?)?;
    let mut doc = DocumentRoot::from_config(config);
    let changed = script.apply(&mut doc);
    info!(
        script = %path.display(),
        edits = script.edits.len(),
        changed,
        "applied edit script"
    );
    Ok(doc)
}

fn write_output(latex: &str, output: Option<&Path>) -> texdraft::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, latex)?;
            info!(output = %path.display(), "wrote LaTeX");
            Ok(())
        }
        None => {
            println!("{}", latex);
            Ok(())
        }
    }
}
