//! Brute-force one-dimensional cutting-stock search.
//!
//! Every distinct order of the required cuts is packed into the raw stock
//! and the packing with the least offcut is kept. See [`CutSearch`].

pub mod search;
pub mod types;

pub use search::{CutSearch, MemoCache, NoCache, PackingCache};
pub use types::*;
