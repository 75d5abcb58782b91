mod message;
mod thread;

pub use message::*;
pub use thread::*;
