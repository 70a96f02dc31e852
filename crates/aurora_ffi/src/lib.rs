//! Flutter-facing bindings for `aurora_core`.

pub mod api;
