//! Record access for searches.
//!
//! The engine never writes. It reads through a [`Session`], which a real
//! backend implements over its own storage; [`MemorySession`] keeps records
//! in memory for tests and the command-line tool.

mod memory;
mod record;
mod result;
mod session;

pub use memory::MemorySession;
pub use record::{Record, RecordKey};
pub use result::ResultSet;
pub use session::Session;
