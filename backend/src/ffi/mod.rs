//! FFI bindings (PyO3)

pub mod pipeline;
pub mod types;
