//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `conversation` - Messages, fact extraction and workflow step inference
//! - `knowledge` - Framework, sequence and vertical reference tables
//! - `prompt` - Layered instruction document composition
//! - `validation` - Input screening and advisory output review

pub mod conversation;
pub mod knowledge;
pub mod prompt;
pub mod validation;
