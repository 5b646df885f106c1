// src/models/mod.rs

pub mod asset;
pub mod company;
pub mod project;
pub mod user;
pub mod vulnerability;
