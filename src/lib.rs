//! Journey Builder - stateless conversational service for email sequence design.
//!
//! Every chat request carries the full transcript. The service re-reads it to
//! infer the business facts and the current workflow step, composes a layered
//! instruction document and asks an external model for the next reply.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
