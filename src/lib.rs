#![allow(clippy::module_inception)]
//! An in-memory ordered key-value index built on a skip list, with a plain
//! text snapshot format.
//!
//! ```
//! use skipdb::{Options, SkipList};
//!
//! let list: SkipList<i32, String> = SkipList::new(Options::with_max_level(6));
//! list.insert(1, "a".to_string()).unwrap();
//! list.insert(3, "b".to_string()).unwrap();
//! assert!(list.insert(3, "c".to_string()).unwrap_err().is_duplicate());
//! assert_eq!(list.get(&3).unwrap(), "b");
//! assert_eq!(list.delete(&1).unwrap(), "a");
//! assert_eq!(list.len(), 1);
//! ```
#[macro_use]
extern crate quick_error;

pub use crate::errors::{DError, DResult};
pub use crate::options::{Options, DEFAULT_DELIMITER, DEFAULT_MAX_LEVEL, MAX_LEVEL_LIMIT};
pub use crate::persist::split_entry;
pub use crate::skiplist::{SkipList, SkipListIter};
pub use crate::utils::random::{Random, RandomGenerator};

// export the macros first.
#[macro_use]
mod macros;
mod errors;
pub mod logger;
mod options;
mod persist;
mod skiplist;
mod utils;
