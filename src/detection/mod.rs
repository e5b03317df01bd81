//! Acquisition and decode pipeline: the capture state machine, per-pixel
//! observation accumulation, and correspondence resolution.

mod accumulator;
mod resolver;
mod session;

pub use accumulator::ObservationAccumulator;
pub use resolver::{
    CorrespondenceMap, CorrespondenceRecord, CorrespondenceResolver, ResolveStats,
};
pub use session::{DetectionError, DetectionSession, DetectionState};
