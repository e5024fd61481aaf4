//! Review-driven content recommendations.
//!
//! Business reviews are turned into fixed-length content profiles (a text
//! embedding plus a sentiment score), cached as named artifacts, and ranked
//! by cosine similarity to a set of seed businesses.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
