// HTTP surface over the analysis core

pub mod analyze;
pub mod health;
pub mod routes;
