//! Contracts between the command core, its collaborators and the host

pub mod command;
pub mod converter;
pub mod frame;
pub mod picker;
