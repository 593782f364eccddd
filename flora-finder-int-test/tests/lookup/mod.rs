//! Lookup integration tests.
//!
//! These build services from generated layers and check answers against the
//! known layout of the layer.

mod concurrency_test;
mod geojson_test;
mod lookup_test;
