//! Rock Em Blocks (workspace facade crate).
//!
//! Re-exports the member crates under `rock_em_blocks::{core,input,term,types}`
//! so the binary, integration tests and benches share one import path.

pub use rock_em_blocks_core as core;
pub use rock_em_blocks_input as input;
pub use rock_em_blocks_term as term;
pub use rock_em_blocks_types as types;
