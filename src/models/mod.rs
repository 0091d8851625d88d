// src/models/mod.rs

pub mod common;
pub mod module;
pub mod phase;
pub mod profile;
pub mod progress;
pub mod section;
pub mod user;
