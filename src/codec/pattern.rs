//! Temporal pattern frames derived from the code book.

use crate::frame::Frame;

use super::{BalancedCode, SampleGrid};

/// Ordered sequence of binary pattern frames for one acquisition run.
///
/// A pure view over the grid and code: frame `t` lights a sample position
/// exactly when bit `t` belongs to the position's codeword, so regenerating
/// the sequence always yields bit-identical frames.
pub struct PatternSequence<'a> {
    grid: &'a SampleGrid,
    code: &'a BalancedCode,
}

impl<'a> PatternSequence<'a> {
    /// The code must hold a word for every sample point of the grid.
    pub fn new(grid: &'a SampleGrid, code: &'a BalancedCode) -> Self {
        assert!(
            code.len() >= grid.len(),
            "code of {} words cannot label {} sample points",
            code.len(),
            grid.len()
        );
        Self { grid, code }
    }

    /// Number of frames, one per codeword bit.
    pub fn frame_count(&self) -> u32 {
        self.code.word_length()
    }

    /// Binary frame for bit `t`; non-sample pixels stay dark.
    pub fn frame(&self, t: u32) -> Frame {
        debug_assert!(t < self.code.word_length());
        let mut frame = Frame::dark(self.grid.width(), self.grid.height());
        let words = self.code.words();
        for (index, (x, y)) in self.grid.positions().enumerate() {
            if words[index].contains(t) {
                frame.set(x, y, 1.0);
            }
        }
        frame
    }

    /// Lazy, restartable iterator over all frames in temporal order.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        (0..self.frame_count()).map(|t| self.frame(t))
    }
}
