pub mod app;
pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod fs_util;
pub mod output;
pub mod panelapp;
pub mod reconcile;
pub mod snapshot;
pub mod store;
