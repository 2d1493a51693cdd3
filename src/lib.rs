// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Validation, query normalization and bulk indexing for a tales index kept
//! in an Elasticsearch-compatible search service.
//!
//! The components are generic over [`services::backend::SearchBackend`];
//! [`services::search::SearchClient`] is the HTTP implementation.

pub mod error;
pub mod models;
pub mod services;

pub use error::{Result, SearchError, ValidationError};

/// Crate version, with the patch segment optionally stamped by `build.rs`
pub const VERSION: &str = env!("CUENTOS_VERSION");
