//! Core primitives shared by every pipeline stage

pub mod time;
