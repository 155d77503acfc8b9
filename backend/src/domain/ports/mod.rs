//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod application_intake;
mod application_repository;

pub use application_intake::{
    ApplicationIntake, DEFAULT_RECENT_LIMIT, FixtureApplicationIntake, MAX_RECENT_LIMIT,
};
#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{ApplicationRepository, ApplicationRepositoryError};
