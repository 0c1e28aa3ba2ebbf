//! TICKGRADE: minute-bar equity scanner with rubric grading
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod data;
pub mod llm;
pub mod broker;
pub mod strategy;
pub mod engine;
