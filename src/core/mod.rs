//! Pure roster primitives.
//!
//! Everything in this module is synchronous, deterministic, and total:
//! no I/O, no side effects, identical inputs always produce identical
//! outputs. Tier resolution never fails; unknown values fall back.

pub mod rank;
pub mod tier;

// Re-export core types
pub use rank::Rank;
pub use tier::{icon_url, resolve, resolve_rank};
