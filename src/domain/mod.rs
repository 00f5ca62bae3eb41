//! Core domain types shared by commands and collaborators

pub mod constant;
pub mod error;
pub mod event;
pub mod outcome;
pub mod parameter;
