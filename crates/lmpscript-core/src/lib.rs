//! # lmpscript Core Library
//!
//! A symbolic set-algebra engine for building the atom-group section of
//! molecular-dynamics input scripts.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers with a clear separation of concerns:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Operation`, `Operand`, `Value`),
//!   the operator algebra (`+`, `-`, `*`), deterministic content-addressed naming, and the
//!   keyword vocabulary used to render simulator commands.
//!
//! - **[`engine`]: The Logic Core.** The stateful `GroupRegistry`, an ordered, name-unique
//!   collection of finalized operations, together with the evaluator that lowers an
//!   unevaluated expression into primitive commands and the loader for group definition files.
//!
//! ## Example
//!
//! ```
//! use lmpscript::engine::registry::GroupRegistry;
//!
//! let mut groups = GroupRegistry::new();
//! let o1 = groups.create("o1").unwrap();
//! let o2 = groups.create("o2").unwrap();
//! let o3 = groups.create("o3").unwrap();
//!
//! let mut selection = o1 + o2 - o3;
//! groups.evaluate("s", &mut selection).unwrap();
//!
//! assert!(selection.is_finalized());
//! assert_eq!(groups.len(), 5);
//! assert!(groups.code_of("s").unwrap().starts_with("group s subtract add_"));
//! ```

pub mod core;
pub mod engine;
