//! Flutter-facing bindings for the notes core.
//!
//! Dart code generation is driven by `flutter_rust_bridge_codegen`; this
//! crate only declares the exported API surface.

pub mod api;
