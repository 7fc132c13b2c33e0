//! Prompt assembly: turn a [`PromptInputs`] record into instruction text.

pub mod assembler;
pub mod inputs;

pub use assembler::{
    assemble, assemble_text, flatten, segments, AssembleMode, Assembled, Category, PromptSegment,
    CLOSING_INSTRUCTION,
};
pub use inputs::{Depth, PromptInputs};
