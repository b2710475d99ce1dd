//! In-memory backend used by the usecase, bindings and console tests.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use thiserror::Error;
use tokio::sync::{oneshot, watch};

use crate::{
    domain::{
        models::{Credential, NewShortenedUrl, ShortenedUrl},
        query_state::QueryState,
        repository::ShortenedURLRepository,
    },
    usecase::query::ResourceQuery,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Create(String, NewShortenedUrl),
    Delete(String, String),
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

pub struct FakeBackend {
    password: String,
    urls: Mutex<Vec<ShortenedUrl>>,
    calls: Mutex<Vec<Call>>,
    call_count: watch::Sender<usize>,
    response_count: watch::Sender<usize>,
    held: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    reject_mutations: AtomicBool,
}

pub fn record(short_url: &str, target_url: &str) -> ShortenedUrl {
    ShortenedUrl {
        short_url: short_url.to_string(),
        target_url: target_url.to_string(),
        comment: String::new(),
    }
}

pub async fn settled<R: ShortenedURLRepository>(
    query: &ResourceQuery<R>,
) -> QueryState<Vec<ShortenedUrl>> {
    query
        .subscribe()
        .wait_for(|s| s.is_settled())
        .await
        .unwrap()
        .clone()
}

impl FakeBackend {
    pub fn new(password: &str, urls: Vec<ShortenedUrl>) -> Arc<Self> {
        Arc::new(FakeBackend {
            password: password.to_string(),
            urls: Mutex::new(urls),
            calls: Mutex::new(Vec::new()),
            call_count: watch::channel(0).0,
            response_count: watch::channel(0).0,
            held: Mutex::new(HashMap::new()),
            reject_mutations: AtomicBool::new(false),
        })
    }

    /// Makes the next list call with `credential` wait until the returned
    /// sender fires.
    pub fn hold_list(&self, credential: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held
            .lock()
            .unwrap()
            .insert(credential.to_string(), rx);
        tx
    }

    pub fn reject_mutations(&self) {
        self.reject_mutations.store(true, Ordering::SeqCst);
    }

    pub fn insert(&self, url: ShortenedUrl) {
        self.urls.lock().unwrap().push(url);
    }

    pub fn urls(&self) -> Vec<ShortenedUrl> {
        self.urls.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_credentials(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(credential) => Some(credential),
                _ => None,
            })
            .collect()
    }

    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.call_count.subscribe();
        rx.wait_for(|count| *count >= n).await.unwrap();
    }

    pub async fn wait_for_responses(&self, n: usize) {
        let mut rx = self.response_count.subscribe();
        rx.wait_for(|count| *count >= n).await.unwrap();
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        self.call_count.send_modify(|count| *count += 1);
    }

    fn authorize(&self, credential: &Credential) -> Result<(), FakeError> {
        if credential.expose() == self.password {
            Ok(())
        } else {
            Err(FakeError("HTTP 401 Unauthorized".to_string()))
        }
    }

    fn check_mutation(&self, credential: &Credential) -> Result<(), FakeError> {
        self.authorize(credential)?;
        if self.reject_mutations.load(Ordering::SeqCst) {
            return Err(FakeError("HTTP 500 Internal Server Error".to_string()));
        }
        Ok(())
    }
}

impl ShortenedURLRepository for Arc<FakeBackend> {
    type Error = FakeError;

    async fn list(&self, credential: &Credential) -> Result<Vec<ShortenedUrl>, FakeError> {
        self.record_call(Call::List(credential.expose().to_string()));
        let held = self.held.lock().unwrap().remove(credential.expose());
        if let Some(release) = held {
            let _ = release.await;
        }

        let result = self.authorize(credential).map(|()| self.urls());
        self.response_count.send_modify(|count| *count += 1);
        result
    }

    async fn create(
        &self,
        credential: &Credential,
        url: &NewShortenedUrl,
    ) -> Result<(), FakeError> {
        self.record_call(Call::Create(credential.expose().to_string(), url.clone()));
        self.check_mutation(credential)?;

        let mut urls = self.urls.lock().unwrap();
        if urls.iter().any(|u| u.short_url == url.short_url) {
            return Err(FakeError("HTTP 409 Conflict".to_string()));
        }
        urls.push(ShortenedUrl {
            short_url: url.short_url.clone(),
            target_url: url.target_url.clone(),
            comment: url.comment.clone(),
        });
        Ok(())
    }

    async fn delete(&self, credential: &Credential, short_url: &str) -> Result<(), FakeError> {
        self.record_call(Call::Delete(
            credential.expose().to_string(),
            short_url.to_string(),
        ));
        self.check_mutation(credential)?;

        self.urls.lock().unwrap().retain(|u| u.short_url != short_url);
        Ok(())
    }
}
