//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockAuthService, MockFormCatalogue, MockMaintenanceRecords, MockSubmissionWorkflow,
    MockUserDirectory,
};
use crate::domain::{Actor, UserId};

use super::state::HttpState;

/// Bearer header value accepted by [`MockPorts::authenticate_as`].
pub const TEST_BEARER: &str = "Bearer test-access-token";

/// Mocked driving ports; set expectations, then call [`Self::into_state`].
#[derive(Default)]
pub struct MockPorts {
    pub auth: MockAuthService,
    pub users: MockUserDirectory,
    pub forms: MockFormCatalogue,
    pub submissions: MockSubmissionWorkflow,
    pub maintenance: MockMaintenanceRecords,
}

impl MockPorts {
    /// Resolve every bearer token to `actor`.
    pub fn authenticate_as(&mut self, actor: Actor) -> &mut Self {
        self.auth
            .expect_authenticate()
            .returning(move |_| Ok(actor));
        self
    }

    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            auth: Arc::new(self.auth),
            users: Arc::new(self.users),
            forms: Arc::new(self.forms),
            submissions: Arc::new(self.submissions),
            maintenance: Arc::new(self.maintenance),
        })
    }
}

/// A non-staff caller.
pub fn member() -> Actor {
    Actor {
        user_id: UserId::random(),
        is_staff: false,
    }
}

/// A staff caller.
pub fn staff() -> Actor {
    Actor {
        user_id: UserId::random(),
        is_staff: true,
    }
}
