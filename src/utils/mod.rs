pub mod terminal;

pub use terminal::{sanitize_cell, strip_control_sequences, truncate_chars};
