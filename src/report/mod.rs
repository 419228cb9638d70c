pub mod decode;
pub mod plot;

pub use decode::{predicted_bits, ProgressLine, SeriesComparison, Snapshot, SNAPSHOT_ROWS};
pub use plot::{draw_training_plot, render_training_plot};
