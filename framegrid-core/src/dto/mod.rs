//! Data Transfer Objects for coordinator API communication
//!
//! This module contains DTOs used for communication between Framegrid
//! services (coordinator, worker, CLI). DTOs are lightweight representations
//! of domain entities optimized for network transfer.

pub mod job;
pub mod task;
