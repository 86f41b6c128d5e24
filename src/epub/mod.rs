//! EPUB package resolution.
//!
//! Loading a book walks the OCF container the standard way:
//!
//! 1. `META-INF/container.xml` names the package (OPF) document
//! 2. the OPF manifest maps item ids to hrefs
//! 3. the OPF spine lists item ids in reading order
//! 4. each spine id is looked up in the manifest and its href resolved
//!    against the OPF's directory
//!
//! The result is a [`Book`]: chapters in spine order, each with a title,
//! its raw markup and its archive path.

mod book;
pub mod container;
pub mod html;
pub mod package;
pub mod path;
mod xml;

pub use book::{Book, Chapter};
pub use package::{ManifestItem, Metadata, Package, SpineItem};
