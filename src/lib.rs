//! # nestdb - Nested-Set Tree Engine
//!
//! nestdb keeps a hierarchy of records inside a flat, orderable store using
//! the nested-set (left/right interval) encoding: every node owns an integer
//! interval `[left, right]` strictly containing the intervals of all its
//! descendants and disjoint from everyone else's. Ancestry tests, descendant
//! counts, and whole-subtree fetches become interval comparisons — the
//! classic nested-set trade of O(1)-ish reads against O(n) writes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nestdb::{assemble, MemoryStore, TreeEngine, TreeView};
//!
//! let engine = TreeEngine::new(MemoryStore::new());
//!
//! let root = engine.insert(None)?;
//! let child = engine.insert(Some(root.id))?;
//! engine.insert(Some(child.id))?;
//!
//! let rows = engine.store().all_ordered_by_left()?;
//! let forest: Vec<TreeView> = assemble(&rows, |n| TreeView::from(n));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │       Hierarchy Assembler (pure)          │
//! ├───────────────────────────────────────────┤
//! │  Mutation Engine                          │
//! │  insert │ delete │ move │ reparent │      │
//! │         │ rebuild                         │
//! ├───────────────────────────────────────────┤
//! │  Gap Arithmetic (pure shift plans)        │
//! ├───────────────────────────────────────────┤
//! │  NodeStore trait (scans, batches, locks)  │
//! ├───────────────────────────────────────────┤
//! │  MemoryStore │ your transactional backend │
//! └───────────────────────────────────────────┘
//! ```
//!
//! Every mutation validates against a read snapshot first (structural errors
//! never touch a row), computes a pure update plan, and persists it through
//! `save_all` batches. Callers wrap each operation in one transaction; the
//! engine performs no internal threading and the only concurrency primitive
//! it relies on is the store's exclusive row lock, held on a parent for the
//! duration of gap allocation.

pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod node;
pub mod store;

pub use engine::{MoveDirection, TreeEngine};
pub use error::TreeError;
pub use hierarchy::{assemble, Assemble, TreeView};
pub use node::{verify, Node, NodeId};
pub use store::{MemoryStore, NodeStore};
