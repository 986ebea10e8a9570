mod render;
mod summary;

pub use render::{describe_outcome, render_path};
pub use summary::{write_summary, SummaryContext};
