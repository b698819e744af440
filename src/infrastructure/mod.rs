//! Infrastructure layer - Storage backends, model artifacts, text analysis and services

pub mod analysis;
pub mod lda;
pub mod logging;
pub mod observability;
pub mod services;
pub mod storage;
