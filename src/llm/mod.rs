pub mod client;
pub mod fields;
pub mod json_recovery;
pub mod prompts;

pub use client::*;
pub use json_recovery::*;
pub use prompts::*;
