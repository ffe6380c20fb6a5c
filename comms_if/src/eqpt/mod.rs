//! # Equipment Commands and Records

pub mod arm;
