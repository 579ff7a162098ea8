//! Qroom core types: session model, storage and answer cache

pub mod answers;
pub mod error;
pub mod session;
pub mod storage;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use answers::{AnswerCache, CachedAnswer};
pub use error::{CoreError, CoreResult};
pub use session::{Session, SessionStore, UserIdentity};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
