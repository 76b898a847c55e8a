pub mod api;
pub mod auth;
pub mod billing;
pub mod company;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod model;
pub mod models;
pub mod pdf;
pub mod routes;
pub mod store;
pub mod views;
