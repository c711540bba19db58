//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, SHA-256 / SHA-1 digests)
//! - Password hashing (Argon2id)
//! - Cookie management and lifetime parsing
//! - Key-value cache abstraction (Redis, in-process)
//! - Best-effort execution of auxiliary side effects

pub mod best_effort;
pub mod cache;
pub mod cookie;
pub mod crypto;
pub mod duration;
pub mod password;
