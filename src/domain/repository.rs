use std::future::Future;

use crate::domain::models::{Credential, NewShortenedUrl, ShortenedUrl};

/// The backend contract: list, create and delete short links.
pub trait ShortenedURLRepository: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<ShortenedUrl>, Self::Error>> + Send;

    fn create(
        &self,
        credential: &Credential,
        url: &NewShortenedUrl,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn delete(
        &self,
        credential: &Credential,
        short_url: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
