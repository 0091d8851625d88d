// src/handlers/mod.rs

pub mod curriculum;
pub mod dashboard;
pub mod health;
pub mod modules;
pub mod phases;
pub mod progress;
pub mod sections;
