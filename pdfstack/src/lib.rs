//! pdfstack - Stack PDFs and images into a single PDF document.
//!
//! A caller hands pdfstack batches of files (PDF, JPEG or PNG), rearranges
//! the selection by removing entries, and asks for a merge. The result is one
//! PDF containing every page of every selected PDF plus one page per image,
//! in selection order, under a session-unique name (`dot.pdf`, `dot(1).pdf`,
//! ...).
//!
//! - [`validation`] classifies incoming files by media type
//! - [`selection`] keeps the ordered list of pending inputs
//! - [`merge`] turns a snapshot of that list into a document
//! - [`session`] ties them together behind one thread-safe handle
//! - [`io`] and [`output`] connect the library to the filesystem and terminal
//!
//! # Examples
//!
//! ## Session
//!
//! ```no_run
//! use pdfstack::config::Config;
//! use pdfstack::session::Session;
//! use pdfstack::validation::FileDescriptor;
//!
//! # async fn example(cover: Vec<u8>, photo: Vec<u8>) -> pdfstack::Result<()> {
//! let session = Session::new(Config::default())?;
//!
//! let outcome = session.add_files(vec![
//!     FileDescriptor::new("cover.pdf", "application/pdf", cover),
//!     FileDescriptor::new("photo.jpg", "image/jpeg", photo),
//! ]);
//! if let Some(err) = outcome.rejection() {
//!     eprintln!("{err}");
//! }
//!
//! let merged = session.merge().await?;
//! println!("{}: {} pages", merged.file_name, merged.statistics.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use pdfstack::io::FileReader;
//! use pdfstack::merge::MergeEngine;
//! use pdfstack::selection::SelectionStore;
//! use pdfstack::validation::InputValidator;
//! use std::path::PathBuf;
//!
//! # async fn example() -> pdfstack::Result<()> {
//! let batch = FileReader::new().read_all(&[PathBuf::from("a.pdf")]).await?;
//!
//! let mut store = SelectionStore::new();
//! store.append(InputValidator::new().classify(batch).accepted);
//!
//! let mut result = MergeEngine::new().merge(&store.snapshot()).await?;
//! let bytes = result.document.to_bytes()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod selection;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{PdfStackError, Result};
pub use session::{MergedDocument, Session};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
