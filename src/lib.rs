//! Ordered JSON-line logging with call-site capture, console level colors
//! and a bounded background writer.

pub mod macros;

pub mod callsite;
pub mod level;
pub mod styles;
pub mod value;
pub mod record;

mod pool;
pub mod assembler;

pub mod sink;
pub mod stream;
pub mod noop_sink;
pub mod async_sink;
pub mod destination;

pub mod env;
pub mod error;
pub mod init;
pub mod logger;
pub mod layer;

pub use level::Level;
pub use logger::Logger;
