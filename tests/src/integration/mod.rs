//! End-to-end scenarios.

pub mod support;

mod correlation;
mod lifecycle;
mod pagination;
