pub mod aggregate;
pub mod render;

pub use aggregate::{Tier, aggregate, classify};
pub use render::{format_line, render, render_startup};
