//! scopestack: Stack Based Scoped Contexts
//!
//! Contexts are activated and deactivated in LIFO order on a per-execution-unit
//! stack. Each context carries private block data and checkpoint data that is
//! visible to every active context through nearest-holder lookup.
//!
//! ```
//! use scopestack::storage::{Storage, ThreadLocalStorage};
//!
//! let contexts = ThreadLocalStorage::<i32>::new().bind();
//! let outer = contexts.context();
//! let _outer = outer.enter();
//! contexts.set_checkpoint_value("depth", 1).unwrap();
//! {
//!     let _inner = contexts.context().enter();
//!     contexts.set_checkpoint_value("depth", 2).unwrap();
//!     assert_eq!(contexts.get_checkpoint_value("depth"), Some(2));
//! }
//! assert_eq!(contexts.get_checkpoint_value("depth"), Some(1));
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod stack;
pub mod storage;

pub use context::{ActiveGuard, Binding, Context, ContextId, Value};
pub use error::{ApiError, ContextError};
pub use stack::{CheckpointIndex, ContextStack};
pub use storage::{
    BackendKind, LocalStorage, SharedStack, Storage, TaskLocalStorage, ThreadLocalStorage,
};
