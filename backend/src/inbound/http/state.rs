//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::ApplicationIntake;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub intake: Arc<dyn ApplicationIntake>,
}

impl HttpState {
    /// Bundle the intake port for handlers.
    pub fn new(intake: Arc<dyn ApplicationIntake>) -> Self {
        Self { intake }
    }
}
