//! State module for tracking collection progress
//!
//! # Components
//!
//! - `ResourceState`: the per-resource state machine driven by the collector
//!   (init, fetching the first page, accumulating, flushing, done or failed)

mod resource_state;

pub use resource_state::ResourceState;
