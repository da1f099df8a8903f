// src/models/mod.rs

pub mod enums;
pub mod quiz;
pub mod quiz_result;
pub mod user;
