// src/handlers/mod.rs

pub mod admin;
pub mod asset;
pub mod auth;
pub mod company;
pub mod content;
pub mod project;
pub mod vulnerability;
