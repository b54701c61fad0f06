//! Roombook core types and utilities

pub mod booking_time;
pub mod config;
pub mod error;
pub mod pagination;
pub mod routes;
pub mod storage;

pub use booking_time::{TimeRangeBounds, TimeRangeInput};
pub use config::ClientSettings;
pub use error::{CoreError, CoreResult};
pub use pagination::{Page, Paginated};
pub use routes::Route;
pub use storage::{CredentialStore, FileStore, MemoryStore, Session, TokenPair};
