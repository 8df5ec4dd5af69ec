use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use biosession::{
    BiometricSessionManager, Credential, FixedClock, SessionConfig, StorageAdapter,
    services::{
        AppSession, AppSessionStore, AuthBackend, BackendSession, BiometricAuthenticator,
        Capabilities, Notice, Notifier, PromptOutcome, ServiceError,
    },
    storage::{self, MemoryStorage, StorageError},
};

// Re-exported for the test modules
pub use biosession::{EnrollUser, Services, constants::DAY_MILLIS};

/// 2024-01-01 00:00:00 UTC
pub const START_MILLIS: u64 = 1_704_067_200_000;

// ==========================
// COLLABORATOR DOUBLES
// ==========================

/// Scripted biometric hardware. Available, enrolled and passing by default.
pub struct MockBiometrics {
    capabilities: Mutex<Capabilities>,
    outcome: Mutex<PromptOutcome>,
    prompts: Mutex<Vec<String>>,
}

impl Default for MockBiometrics {
    fn default() -> Self {
        Self {
            capabilities: Mutex::new(Capabilities {
                is_available: true,
                is_enrolled: true,
            }),
            outcome: Mutex::new(PromptOutcome::passed()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl MockBiometrics {
    pub fn set_capabilities(&self, is_available: bool, is_enrolled: bool) {
        *self.capabilities.lock().unwrap() = Capabilities {
            is_available,
            is_enrolled,
        };
    }

    pub fn set_outcome(&self, outcome: PromptOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    /// Prompt messages shown so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl BiometricAuthenticator for MockBiometrics {
    async fn check_capabilities(&self) -> Capabilities {
        *self.capabilities.lock().unwrap()
    }

    async fn authenticate(&self, prompt_message: &str) -> PromptOutcome {
        self.prompts
            .lock()
            .unwrap()
            .push(prompt_message.to_string());
        self.outcome.lock().unwrap().clone()
    }
}

/// Backend that accepts a configured set of refresh credentials and counts calls.
#[derive(Default)]
pub struct MockBackend {
    live: Mutex<Option<(String, String)>>,
    /// credential -> (user id, rotated credential)
    accepts: Mutex<HashMap<String, (String, String)>>,
    refresh_calls: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Accept `credential` for `user_id`, handing back the same credential.
    pub fn accept(&self, credential: &str, user_id: &str) {
        self.accept_rotating(credential, user_id, credential);
    }

    /// Accept `credential` for `user_id`, rotating it to `rotated`.
    pub fn accept_rotating(&self, credential: &str, user_id: &str, rotated: &str) {
        self.accepts.lock().unwrap().insert(
            credential.to_string(),
            (user_id.to_string(), rotated.to_string()),
        );
    }

    pub fn set_live(&self, user_id: &str, credential: &str) {
        *self.live.lock().unwrap() = Some((user_id.to_string(), credential.to_string()));
    }

    /// Every credential passed to `refresh_session`, in call order.
    pub fn refresh_calls(&self) -> Vec<String> {
        self.refresh_calls.lock().unwrap().clone()
    }

    pub fn refresh_count_for(&self, credential: &str) -> usize {
        self.refresh_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == credential)
            .count()
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn current_session(&self) -> Result<Option<BackendSession>, ServiceError> {
        Ok(self
            .live
            .lock()
            .unwrap()
            .as_ref()
            .map(|(user_id, credential)| BackendSession {
                user_id: user_id.clone(),
                refresh_credential: Credential::new(credential.as_str()),
            }))
    }

    async fn refresh_session(
        &self,
        credential: &Credential,
    ) -> Result<BackendSession, ServiceError> {
        self.refresh_calls
            .lock()
            .unwrap()
            .push(credential.expose().to_string());
        match self.accepts.lock().unwrap().get(credential.expose()) {
            Some((user_id, rotated)) => Ok(BackendSession {
                user_id: user_id.clone(),
                refresh_credential: Credential::new(rotated.as_str()),
            }),
            None => Err(ServiceError::Rejected {
                reason: "invalid refresh token".to_string(),
            }),
        }
    }
}

/// Application session store holding at most one credential.
#[derive(Default)]
pub struct MockAppSessions(Mutex<Option<String>>);

impl MockAppSessions {
    pub fn set(&self, credential: &str) {
        *self.0.lock().unwrap() = Some(credential.to_string());
    }
}

#[async_trait]
impl AppSessionStore for MockAppSessions {
    async fn current_session(&self) -> Result<Option<AppSession>, ServiceError> {
        Ok(self.0.lock().unwrap().as_ref().map(|credential| AppSession {
            user_id: None,
            refresh_credential: Credential::new(credential.as_str()),
        }))
    }
}

#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<Notice>>);

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

// ==========================
// STORAGE
// ==========================

/// Memory storage whose reads and writes can be made to fail.
#[derive(Default)]
pub struct FailingStorage {
    pub inner: MemoryStorage,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingStorage {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn failure(&self) -> StorageError {
        StorageError::Unavailable {
            backend: "failing",
            reason: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl StorageAdapter for FailingStorage {
    async fn get(&self, key: &str) -> storage::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> storage::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> storage::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        self.inner.delete(key).await
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

// ==========================
// HARNESS
// ==========================

/// A manager wired to doubles, with handles to each of them.
pub struct Harness<S: StorageAdapter + 'static = MemoryStorage> {
    pub storage: Arc<S>,
    pub clock: Arc<FixedClock>,
    pub biometrics: Arc<MockBiometrics>,
    pub backend: Arc<MockBackend>,
    pub app_sessions: Arc<MockAppSessions>,
    pub notifier: Arc<RecordingNotifier>,
    pub manager: BiometricSessionManager,
}

/// Harness over a fresh in-memory store.
pub fn harness() -> Harness {
    harness_with(Arc::new(MemoryStorage::new()))
}

/// Harness over the given store.
pub fn harness_with<S: StorageAdapter + 'static>(storage: Arc<S>) -> Harness<S> {
    let clock = Arc::new(FixedClock::new(START_MILLIS));
    let biometrics = Arc::new(MockBiometrics::default());
    let backend = Arc::new(MockBackend::default());
    let app_sessions = Arc::new(MockAppSessions::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let services = Services::new(biometrics.clone(), backend.clone())
        .with_app_sessions(app_sessions.clone())
        .with_notifier(notifier.clone());
    let manager = BiometricSessionManager::with_config(
        storage.clone(),
        services,
        SessionConfig::default(),
        clock.clone(),
    );

    Harness {
        storage,
        clock,
        biometrics,
        backend,
        app_sessions,
        notifier,
        manager,
    }
}

impl<S: StorageAdapter + 'static> Harness<S> {
    /// Enroll a user with an explicit credential the backend will accept.
    pub async fn enroll_with_credential(&self, user_id: &str, email: &str, credential: &str) {
        self.backend.accept(credential, user_id);
        let user = EnrollUser::new(user_id, email).with_credential(Credential::new(credential));
        assert!(self.manager.enroll_for_user(user, None).await);
    }

    /// Enroll a user with no credential anywhere.
    pub async fn enroll_bare(&self, user_id: &str, email: &str) {
        assert!(
            self.manager
                .enroll_for_user(EnrollUser::new(user_id, email), None)
                .await
        );
    }
}
