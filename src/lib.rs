//! # Etiketka - Label and Shipping-Mark Generator
//!
//! Etiketka turns a product spreadsheet plus a conventional `img/`
//! resource tree into printable 40x40mm documents: one label and one
//! shipping mark per row, as vector PDFs with optional PNG previews.
//!
//! ## Quick Start
//!
//! ```no_run
//! use etiketka::{batch::BatchRunner, config::Config, observer::ConsoleObserver};
//!
//! let config = Config::new(".", "output");
//! let observer = ConsoleObserver;
//! let runner = BatchRunner::new(config, &observer);
//! let summary = runner.process("Товары.xlsx".as_ref())?;
//! println!("{} labels, {} marks", summary.labels, summary.marks);
//! # Ok::<(), etiketka::EtiketkaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`sheet`] | Spreadsheet reading and row normalization |
//! | [`resources`] | Image and typeface resolution |
//! | [`doc`] | Document composition (display list, layout, barcode) |
//! | [`render`] | PDF and PNG backends |
//! | [`batch`] | The batch driver |
//! | [`archive`] | Zip bundle unpack/pack |
//! | [`server`] | HTTP shell |
//!
//! Rows are normalized against a Russian-header alias table; the
//! first populated row of a sheet donates its optional fields to rows
//! that left them blank. Missing images and fonts degrade the output
//! instead of failing the batch.

pub mod archive;
pub mod batch;
pub mod config;
pub mod doc;
pub mod error;
pub mod observer;
pub mod render;
pub mod resources;
pub mod server;
pub mod sheet;

// Re-exports for convenience
pub use batch::{BatchRunner, BatchSummary};
pub use config::Config;
pub use error::EtiketkaError;
