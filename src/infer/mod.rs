//! Rack inference: recovers a probability distribution over an opponent's
//! pre-move rack from the move they actually played.

pub mod inference;
pub mod results;

pub use inference::{infer, played_tile_counts, validate, InferenceInput};
pub use results::{InferenceResults, LeaveRackEntry, LeaveRackList};
