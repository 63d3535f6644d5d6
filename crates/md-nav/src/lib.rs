//! Markdown sectionizer and navigation engine.
//!
//! Raw markdown flows through [`section`] (anchored section tree), [`render`]
//! (HTML), [`extract`] (headings recovered from the rendered HTML), [`toc`]
//! (hierarchical table of contents) and [`scroll`] (reading progress and the
//! active heading).

pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod export;
pub mod extract;
pub mod frontmatter;
pub mod heading;
pub mod output;
pub mod render;
pub mod scroll;
pub mod section;
pub mod slug;
pub mod toc;

pub use error::{Error, Result};
