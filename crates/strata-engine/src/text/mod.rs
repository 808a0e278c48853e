//! Font bookkeeping for scene hosts.

mod font_book;

pub use font_book::{FontBook, FontId, FontLoadError, FontName};
