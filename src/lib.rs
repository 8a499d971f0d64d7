//! sentdb - annotate a sentence with a pretrained NLP pipeline and store the
//! token analysis in SQLite.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod services;
