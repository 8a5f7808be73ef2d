//! Peerwise - Org-chart and feedback-cycle core for 360-degree feedback
//!
//! Builds reporting hierarchies from flat member lists, validates manager
//! reassignments and CSV member imports, and schedules the recurring
//! occurrences of feedback cycles.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
