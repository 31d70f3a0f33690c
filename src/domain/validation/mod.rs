//! Input screening and advisory output review.

mod input;
mod output;

pub use input::{InputRejection, InputValidator, DEFAULT_MAX_INPUT_CHARS};
pub use output::{OutputFlag, OutputValidator, SPAM_HIT_LIMIT};
