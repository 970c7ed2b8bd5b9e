// TalkLog - ui/panels/mod.rs

pub mod about;
pub mod chat;
pub mod options;
pub mod search;
