//! Cadence — a per-user intervention controller: a phase-structured state
//! machine that schedules and reacts to the conversational components of
//! a multi-week behavioral-change intervention.

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;
