//! Timetable generation as a binary constraint satisfaction problem.
//!
//! [`csp`], [`heuristics`], [`propagation`] and [`search`] form a generic
//! backtracking solver; [`scheduler`] specialises it to assigning class
//! lessons to time slots and rooms, and [`server`] exposes it over HTTP.

pub mod config;
pub mod csp;
pub mod data;
pub mod error;
pub mod heuristics;
pub mod propagation;
pub mod scheduler;
pub mod search;
pub mod server;
