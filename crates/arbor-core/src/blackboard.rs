//! Per-agent working memory.
//!
//! A blackboard is an [`AttributeStore`] keyed by static names. Each agent owns
//! one; longer-lived scopes (squad, team, level) are shared parents that many
//! agents read through.
//!
//! ```
//! use arbor_core::{BbKey, Blackboard};
//!
//! const HEALTH: BbKey<i32> = BbKey::new("health");
//!
//! let team = Blackboard::new().into_shared();
//! team.borrow_mut().set(HEALTH, 5);
//!
//! let mut bb = Blackboard::child_of(&team);
//! assert_eq!(bb.try_get(HEALTH), Some(5));
//! bb.set(HEALTH, 7);
//! assert_eq!(bb.try_get(HEALTH), Some(7));
//! ```

use crate::attributes::{AttributeStore, Key, StoreRef};

pub type Blackboard = AttributeStore<&'static str>;

pub type BbKey<T> = Key<&'static str, T>;

pub type SharedBlackboard = StoreRef<&'static str>;
