pub mod api;
pub mod config;
pub mod control;
pub mod db;
pub mod sensors;
pub mod sunset;
