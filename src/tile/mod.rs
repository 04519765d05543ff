//! Tile entity.
//!
//! A [`Tile`] is the only record in the inventory. [`NewTile`] is the payload
//! accepted on create and full replace; stock adjustments carry a bare signed
//! integer decoded by [`parse_stock_delta`].

mod model;

pub use model::{compare_ids, parse_stock_delta, sort_by_id, NewTile, Tile};
