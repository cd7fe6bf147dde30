pub mod action;
pub mod badge;
pub mod challenge;
pub mod quiz;
pub mod user;
