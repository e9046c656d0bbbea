//! Property-based tests for grove

mod filter_purity;
mod path_normalization;
mod tree_invariants;
