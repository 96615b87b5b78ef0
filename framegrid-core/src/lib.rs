//! Framegrid Core
//!
//! Core types and abstractions for the Framegrid render farm.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, Task, JobId)
//! - DTOs: Data transfer objects for the coordinator API

pub mod domain;
pub mod dto;
