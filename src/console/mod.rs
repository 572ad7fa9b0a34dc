pub mod backoff;
pub mod buffer;
pub mod sse;
pub mod stream;

pub use buffer::LogBuffer;
pub use stream::{ConnectionState, LogSource, LogStream, LogStreamOptions};
