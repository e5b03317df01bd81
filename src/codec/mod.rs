//! Balanced code construction and temporal pattern generation.

mod balanced_code;
mod pattern;
mod sample_grid;

pub use balanced_code::{BalancedCode, CodecError, Codeword};
pub use pattern::PatternSequence;
pub use sample_grid::SampleGrid;
