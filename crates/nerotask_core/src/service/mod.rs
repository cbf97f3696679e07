//! Core use-case services.
//!
//! # Responsibility
//! - Funnel every task mutation through one layer that keeps derived
//!   state and persisted state consistent.
//! - Keep UI/embedding layers decoupled from storage details.

pub mod task_service;
