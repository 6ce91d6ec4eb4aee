//! Aragon Cart
//!
//! Client-side shopping cart aggregation and persistence for the Aragon
//! storefront. The [`store::CartStore`] owns the single cart aggregate,
//! persists it as JSON to a [`slot::DurableSlot`] and exposes mutation
//! operations that recompute derived totals and return the updated
//! snapshot for rendering.

pub mod cart;
pub mod merchandise;
pub mod money;
pub mod slot;
pub mod store;
