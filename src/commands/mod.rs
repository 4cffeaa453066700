//! CLI commands implementation

pub mod analytics;
pub mod ingest;
pub mod init;
pub mod quiz;
pub mod search;
pub mod status;

pub use analytics::*;
pub use ingest::*;
pub use init::*;
pub use quiz::*;
pub use search::*;
pub use status::*;
