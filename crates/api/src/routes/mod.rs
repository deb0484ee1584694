//! HTTP Route Handlers

pub mod catalog;
pub mod predict;
