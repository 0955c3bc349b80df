/// Gallery state module
///
/// This module handles all grid and selection state, including:
/// - Shared data structures (data.rs)
/// - The photo grid and its thumbnail states (state.rs)
/// - Selection and exclusion tracking (selection.rs)

pub mod data;
pub mod selection;
pub mod state;
