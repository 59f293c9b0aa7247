//! A REST service for keeping track of inventory items.

pub mod api;
pub mod app;
pub mod infra;
