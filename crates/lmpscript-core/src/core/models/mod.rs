//! # Core Models Module
//!
//! Data structures that describe atom-group expressions.
//!
//! ## Key Components
//!
//! - [`operation`] - The expression node, its finalization state, and the `+`, `-`, `*` algebra
//! - [`operator`] - Primitive (finalized) and algebraic (unevaluated) operator tags
//! - [`operand`] - Operand slots: literal values, group references, nested expressions
//! - [`value`] - Literal arguments such as atom types, ids, and region names
//! - [`criteria`] - The structured record of parameters a primitive operation was built from
//! - [`ids`] - Arena keys for registered operations
//!
//! ## Usage
//!
//! ```ignore
//! use lmpscript::engine::registry::GroupRegistry;
//!
//! let mut groups = GroupRegistry::new();
//! let water = groups.bytype("water", [1, 2])?;
//! let ions = groups.bytype("ions", [3])?;
//! let mut solvent = water + ions;
//! groups.evaluate("solvent", &mut solvent)?;
//! ```

pub mod criteria;
pub mod ids;
pub mod operand;
pub mod operation;
pub mod operator;
pub mod value;
