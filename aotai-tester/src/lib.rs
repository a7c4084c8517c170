//! Headless playthrough runner for the Aotai traverse engine.
//!
//! Drives [`aotai_game::GameSession`] with scripted and randomized player
//! policies, checks engine invariants after every command, and renders the
//! results as console, JSON, markdown or CSV reports.

pub mod logic;
