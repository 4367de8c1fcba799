//! Overlay geometry, gesture transform and collection model.
//!
//! Pure and synchronous: nothing in this crate performs I/O. The HTTP store
//! lives in `overlaycast-api`, the optimistic sync layer in
//! `overlaycast-client`.

pub mod error;
pub mod geometry;
pub mod gesture;
pub mod overlay;
pub mod store;
pub mod stream;
pub mod types;
