pub mod app;
pub mod config;
pub mod controller;
pub mod generators;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod maze;
