//! Lavacar core types and utilities
//!
//! Everything in here is transport-agnostic: the uniform API error shape,
//! pagination window math, client-side validation, display formatting and
//! configuration loading.

pub mod config;
pub mod error;
pub mod format;
pub mod pagination;
#[cfg(feature = "tracing")]
pub mod telemetry;
pub mod validation;

pub use config::{ClientConfig, RefreshMode};
pub use error::{ApiError, CoreError, CoreResult};
pub use pagination::{PageAction, PageItem, Pagination, PaginationWindow, compute_window};
pub use validation::{Validate, ValidationErrors};
