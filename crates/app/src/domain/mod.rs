//! Orebi Domain Concerns

pub mod orders;
