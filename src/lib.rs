pub mod cli;
pub mod config;
pub mod decimal;
pub mod display;
pub mod insights;
pub mod logging;
pub mod prices;
pub mod service;
pub mod store;
pub mod subgraph;
pub mod tracker;
pub mod types;
