pub mod conflict;
pub mod deepgram;
pub mod meeting;
pub mod segment;
pub mod task;

pub use conflict::*;
pub use deepgram::*;
pub use meeting::*;
pub use segment::*;
pub use task::*;
