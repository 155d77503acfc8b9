//! Shared wiring for application intake integration tests.
//!
//! Builds the same `/api` surface the server binary serves, backed by the
//! in-memory store so tests can inspect writes and simulate outages.

use std::sync::{Arc, Mutex};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use intake_backend::Trace;
use intake_backend::domain::ApplicationIntakeService;
use intake_backend::inbound::http::applications::{
    json_config, list_recent_applications, submit_application,
};
use intake_backend::inbound::http::state::HttpState;
use intake_backend::outbound::memory::InMemoryApplicationRepository;

/// Clock that advances one second every time it is read.
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().expect("clock lock");
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// In-memory store plus the HTTP state wired over it.
pub struct Harness {
    pub store: Arc<InMemoryApplicationRepository>,
    pub state: web::Data<HttpState>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryApplicationRepository::default());
        let service = ApplicationIntakeService::new(
            Arc::clone(&store),
            Arc::new(SteppingClock::starting_at(t0())),
        );
        let state = web::Data::new(HttpState::new(Arc::new(service)));
        Self { store, state }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(json_config())
            .wrap(Trace)
            .service(
                web::scope("/api")
                    .service(submit_application)
                    .service(list_recent_applications),
            )
    }
}
