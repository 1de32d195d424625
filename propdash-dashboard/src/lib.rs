//! Linked-view dashboard over real-estate transactions.
//!
//! This crate provides:
//! - `controller`: the [`DashboardController`](controller::DashboardController)
//!   that owns the canonical dataset and the filter state and pushes fresh
//!   aggregates to every registered view on each filter change
//! - `chart`: declarative chart specs and the data they derive
//! - `view`: the contract a renderer implements
//! - `options`: dropdown and slider choices computed once at load
//! - `config`: serde-loadable dashboard settings

pub mod chart;
pub mod config;
pub mod controller;
pub mod options;
pub mod view;
