//! Vector approximation file (VA-File) for exact k-nearest-neighbor search
//! over bounded, fixed-dimensional points.
//!
//! Each point is reduced to a short bit string, its [`Approximation`], built
//! from equi-depth per-dimension [`Partition`]s. Points sharing an
//! approximation live in one box. Queries compute cheap lower and upper
//! distance bounds per box and only scan the raw points of boxes that can
//! still hold one of the `k` nearest neighbors.

mod approximation;
mod bits;
mod bounds;
mod box_index;
mod candidates;
pub mod config;
mod partition;
mod search;
mod types;
pub mod utils;
mod va_file;

pub use approximation::*;
pub use bits::*;
pub use bounds::*;
pub use box_index::*;
pub use candidates::*;
pub use config::*;
pub use partition::*;
pub use search::{Neighbor, SearchResult};
pub use types::*;
pub use va_file::*;
