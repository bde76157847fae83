pub mod cache;
pub mod calendar;
pub mod config;
pub mod model;
pub mod render;
pub mod routes;
pub mod teamsnap;
