// src/models/mod.rs

pub mod analytics;
pub mod image_question;
pub mod question;
pub mod quiz_attempt;
pub mod user;
