use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;

use crate::{
    credential::store::CredentialStore,
    domain::{
        models::{Credential, ShortenedUrl},
        query_state::QueryState,
        repository::ShortenedURLRepository,
    },
};

pub type UrlListState = QueryState<Vec<ShortenedUrl>>;

/// Credential-reactive view of the backend's URL list.
///
/// Every fetch is tagged with a generation; only the most recently started
/// fetch may publish its result, so a slow response for an old credential
/// never overwrites a newer one.
pub struct ResourceQuery<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for ResourceQuery<R> {
    fn clone(&self) -> Self {
        ResourceQuery {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R> {
    repo: R,
    credentials: Arc<CredentialStore>,
    state: watch::Sender<UrlListState>,
    generation: AtomicU64,
    fetched_with: Mutex<Option<Credential>>,
}

impl<R: ShortenedURLRepository> Inner<R> {
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = QueryState::Loading;
        });
        generation
    }

    async fn execute(&self, generation: u64, credential: Credential) {
        let result = self.repo.list(&credential).await;
        let next = match result {
            Ok(urls) => QueryState::Success(urls),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch short URLs");
                QueryState::Error(e.to_string())
            }
        };

        let published = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            *self.fetched_with.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential);
            true
        });
        if !published {
            tracing::debug!(generation, "Discarded response of a superseded fetch");
        }
    }
}

impl<R: ShortenedURLRepository> ResourceQuery<R> {
    /// Builds the query and starts following `credentials`. Fetches right
    /// away when a credential is already present. Needs a tokio runtime.
    pub fn spawn(repo: R, credentials: Arc<CredentialStore>) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        let mut changes = credentials.subscribe();
        let inner = Arc::new(Inner {
            repo,
            credentials,
            state,
            generation: AtomicU64::new(0),
            fetched_with: Mutex::new(None),
        });

        let initial = changes.borrow_and_update().clone();
        if let Some(credential) = initial {
            Self::start(&inner, credential);
        }

        let weak = Arc::downgrade(&inner);
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let credential = changes.borrow_and_update().clone();
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if let Some(credential) = credential {
                    tracing::debug!("Credential changed; refetching");
                    Self::start(&inner, credential);
                }
            }
        });

        ResourceQuery { inner }
    }

    fn start(inner: &Arc<Inner<R>>, credential: Credential) {
        let generation = inner.begin();
        let inner = Arc::clone(inner);
        tokio::spawn(async move { inner.execute(generation, credential).await });
    }

    /// Re-runs the fetch with the current credential and waits for it to
    /// settle. Does nothing while no credential is set.
    pub async fn refetch(&self) {
        let Some(credential) = self.inner.credentials.get() else {
            tracing::debug!("No credential set; skipping fetch");
            return;
        };
        let generation = self.inner.begin();
        self.inner.execute(generation, credential).await;
    }

    /// Waits until the list has settled for a fetch made with `credential`.
    pub async fn settled_for(&self, credential: &Credential) -> UrlListState {
        let mut rx = self.subscribe();
        let result = rx
            .wait_for(|state| {
                state.is_settled()
                    && self
                        .inner
                        .fetched_with
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .as_ref()
                        == Some(credential)
            })
            .await
            .map(|state| state.clone());
        // the sender lives in `inner`, which `self` keeps alive
        result.unwrap_or_else(|_| self.state())
    }

    pub fn state(&self) -> UrlListState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UrlListState> {
        self.inner.state.subscribe()
    }

    pub fn repository(&self) -> &R {
        &self.inner.repo
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.inner.credentials
    }
}
