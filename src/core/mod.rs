// TalkLog - core/mod.rs
//
// Core logic layer: parsing, windowed pagination and search.
// Dependencies: util, regex, chrono.
// Must NOT depend on: ui, platform, app, or any I/O.

pub mod chat;
pub mod model;
pub mod pagination;
pub mod parser;
pub mod repair;
pub mod search;
