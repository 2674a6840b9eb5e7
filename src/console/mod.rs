//! Console front end: validated prompts and report rendering.

pub mod prompt;
pub mod render;
