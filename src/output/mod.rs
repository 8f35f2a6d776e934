//! Output formatters for duplicate scan results.
//!
//! - Plain text for people
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupsort::duplicates::DuplicateFinder;
//! use dupsort::output::text::TextOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! print!("{}", TextOutput::new(&sets, &summary.warnings).render());
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
