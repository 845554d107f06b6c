//! Citadel AI - reactive rule engine for scripted computer players

pub mod actions;
pub mod ai;
pub mod conditions;
pub mod core;
pub mod game;
pub mod resolver;
pub mod rules;
pub mod script;
pub mod signal;
