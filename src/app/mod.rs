// TalkLog - app/mod.rs
//
// Application layer: load orchestration, state management, persistence.
// Dependencies: core, platform.
// Must NOT depend on: ui.

pub mod authors;
pub mod loader;
pub mod session;
pub mod state;
