//! # Etiketka CLI
//!
//! Command-line interface for the label and shipping-mark generator.
//!
//! ## Usage
//!
//! ```bash
//! # Render all rows of a spreadsheet into ./output
//! etiketka generate Товары.xlsx
//!
//! # Custom resource and output locations, with PNG previews
//! etiketka generate --base-dir ./data --output ./out --previews Товары.xlsx
//!
//! # Run the HTTP shell
//! etiketka serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use etiketka::{
    batch::BatchRunner,
    config::Config,
    observer::ConsoleObserver,
    server::{serve, ServerConfig},
    EtiketkaError,
};

/// Etiketka - label and shipping-mark generator
#[derive(Parser, Debug)]
#[command(name = "etiketka")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render labels and marks from a spreadsheet
    Generate {
        /// Spreadsheet with one product per row (.xlsx)
        spreadsheet: PathBuf,

        /// Directory containing the img/ resource tree
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,

        /// Output directory for labels/ and marks/
        #[arg(long, default_value = "output")]
        output: PathBuf,

        /// Also write PNG previews next to the PDFs
        #[arg(long)]
        previews: bool,

        /// Explicit regular font file (TTF), tried before the system fonts
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Explicit bold font file (TTF)
        #[arg(long, value_name = "FILE")]
        font_bold: Option<PathBuf>,
    },

    /// Run the HTTP shell (zip bundle in, zip of documents out)
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Also write PNG previews next to the PDFs
        #[arg(long)]
        previews: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), EtiketkaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            spreadsheet,
            base_dir,
            output,
            previews,
            font,
            font_bold,
        } => {
            let mut config = Config::new(base_dir, output);
            config.raster_previews = previews;
            config.font_regular = font;
            config.font_bold = font_bold;

            let observer = ConsoleObserver;
            let runner = BatchRunner::new(config, &observer);
            let summary = runner.process(&spreadsheet)?;

            println!(
                "{} labels, {} marks, {} rows skipped",
                summary.labels, summary.marks, summary.skipped
            );
            if !summary.succeeded() {
                return Err(EtiketkaError::Spreadsheet(
                    "no documents were produced".to_string(),
                ));
            }
            Ok(())
        }
        Commands::Serve { listen, previews } => {
            let config = ServerConfig {
                listen_addr: listen,
                raster_previews: previews,
            };
            tokio::runtime::Runtime::new()?.block_on(serve(config))
        }
    }
}
