pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod interfaces;
pub mod observability;
pub mod price_infra;
pub mod types;
pub mod utils;

pub use crate::core::price_service::TokenPriceService;
pub use crate::error::{Error, Result};
