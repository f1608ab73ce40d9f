pub mod audio;
pub mod input;
pub mod output;

pub use audio::*;
pub use input::*;
pub use output::*;
