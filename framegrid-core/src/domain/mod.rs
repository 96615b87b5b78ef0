//! Core domain types
//!
//! This module contains the core domain structures used across Framegrid
//! services. These types represent the fundamental business entities and are
//! shared between coordinator (for scheduling and persistence) and worker
//! (for execution).

pub mod job;
pub mod task;
