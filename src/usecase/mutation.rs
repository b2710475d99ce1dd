use crate::{
    domain::{
        models::{InputError, NewShortenedUrl},
        repository::ShortenedURLRepository,
    },
    usecase::query::ResourceQuery,
};

/// Create and delete operations. Both refresh the list once the backend
/// call settles; the list is never patched locally.
///
/// Backend failures are logged but not returned, so the only visible effect
/// of a failed mutation is an unchanged list after the refetch.
pub struct MutationGateway<R> {
    query: ResourceQuery<R>,
}

impl<R: ShortenedURLRepository> MutationGateway<R> {
    pub fn new(query: ResourceQuery<R>) -> Self {
        MutationGateway { query }
    }

    pub async fn create(
        &self,
        short_path: &str,
        target_url: &str,
        comment: &str,
    ) -> Result<(), InputError> {
        let url = NewShortenedUrl::new(short_path, target_url, comment)?;
        let Some(credential) = self.query.credentials().get() else {
            tracing::warn!("No credential set; skipping create");
            return Ok(());
        };

        if let Err(e) = self.query.repository().create(&credential, &url).await {
            tracing::warn!(
                error = %e,
                short_url = url.short_url.as_str(),
                "Failed to create short URL"
            );
        }
        self.query.refetch().await;
        Ok(())
    }

    pub async fn delete(&self, short_path: &str) {
        let Some(credential) = self.query.credentials().get() else {
            tracing::warn!("No credential set; skipping delete");
            return;
        };

        if let Err(e) = self.query.repository().delete(&credential, short_path).await {
            tracing::warn!(error = %e, short_url = short_path, "Failed to delete short URL");
        }
        self.query.refetch().await;
    }
}
