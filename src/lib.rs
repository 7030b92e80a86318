//! BetterHeap Setup - Guided analytics setup conversation
//!
//! Before an operator labels page elements for analytics, a short chat asks
//! what they are building, which user actions matter, who their users are and
//! what they want to measure. This crate runs that chat as a step engine and
//! persists each session so the labeling workflow can pick it up.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
