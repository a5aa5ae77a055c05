//! Helper functions shared by the loader, the composer and the commands
//!
//! Dates, URLs and a handful of HTML string utilities.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
