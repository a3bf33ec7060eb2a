//! Shared helpers for provisioning integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use accounts::domain::ports::{
    CreateProfileRequest, CreateProfileResponse, ProfileService, ProfileServiceError,
};
use accounts::domain::{ContactDetails, UserCreationRequest, UserProvisioningService};
use accounts::outbound::memory::InMemoryIdentityStore;
use async_trait::async_trait;
use mockable::DefaultClock;

/// Scripted outcome of a profile call.
#[derive(Debug, Clone)]
pub enum ProfileBehaviour {
    Accept,
    Reject,
    Fail(ProfileServiceError),
}

/// Profile service double recording every request it receives.
pub struct RecordingProfileService {
    behaviour: ProfileBehaviour,
    calls: AtomicUsize,
    requests: Mutex<Vec<CreateProfileRequest>>,
}

impl RecordingProfileService {
    pub fn new(behaviour: ProfileBehaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CreateProfileRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ProfileService for RecordingProfileService {
    async fn create_profile(
        &self,
        request: &CreateProfileRequest,
    ) -> Result<CreateProfileResponse, ProfileServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        match &self.behaviour {
            ProfileBehaviour::Accept => Ok(CreateProfileResponse { succeeded: true }),
            ProfileBehaviour::Reject => Ok(CreateProfileResponse { succeeded: false }),
            ProfileBehaviour::Fail(error) => Err(error.clone()),
        }
    }
}

pub type TestService = UserProvisioningService<InMemoryIdentityStore, RecordingProfileService>;

/// Saga wired to a fresh in-memory store and a scripted profile service.
pub struct Harness {
    pub store: Arc<InMemoryIdentityStore>,
    pub profiles: Arc<RecordingProfileService>,
    pub service: TestService,
}

impl Harness {
    pub fn new(behaviour: ProfileBehaviour) -> Self {
        let store = Arc::new(InMemoryIdentityStore::new(Arc::new(DefaultClock)));
        let profiles = Arc::new(RecordingProfileService::new(behaviour));
        let service = UserProvisioningService::new(Arc::clone(&store), Arc::clone(&profiles));
        Self {
            store,
            profiles,
            service,
        }
    }
}

pub fn creation_request(email: &str) -> UserCreationRequest {
    UserCreationRequest::try_new(
        "Ada",
        "Lovelace",
        email,
        ContactDetails::new(Some("555-0100".to_owned()), None, None, Some("London".to_owned())),
    )
    .expect("valid creation request")
}
