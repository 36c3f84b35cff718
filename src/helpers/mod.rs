//! Helper functions
//!
//! Formatting shared by the views and templates: dates, reading time,
//! URLs, and HTML escaping.

mod date;
mod html;
mod reading;
mod url;

pub use date::*;
pub use html::*;
pub use reading::*;
pub use url::*;
