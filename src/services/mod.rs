// src/services/mod.rs

pub mod recorder;
pub mod scoring;
pub mod submission;
