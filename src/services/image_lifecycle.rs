use crate::api::error::AppError;
use crate::services::cleanup::{CleanupEvent, CleanupQueue};
use crate::services::image_store::ImageStore;
use futures::future::try_join_all;
use std::future::Future;
use std::sync::Arc;

pub const MIN_IMAGES: usize = 3;
pub const MAX_IMAGES: usize = 5;

/// Keeps hosted-image side effects consistent with database outcomes.
///
/// Uploads always complete before persistence is attempted. When a
/// persistence step fails after an upload, the uploaded URLs are queued
/// for deletion; the invariant is eventual, not atomic: uploaded images
/// either end up referenced by a persisted entity or queued for cleanup.
/// Creation-time check on raw image sources, before any I/O happens.
pub fn validate_image_sources(images: &[String]) -> Result<(), AppError> {
    if images.len() < MIN_IMAGES {
        return Err(AppError::Validation(format!(
            "At least {MIN_IMAGES} images is required"
        )));
    }
    if images.len() > MAX_IMAGES {
        return Err(AppError::Validation(format!(
            "Please enter {MAX_IMAGES} images only"
        )));
    }
    let unique: std::collections::HashSet<&str> = images.iter().map(String::as_str).collect();
    if unique.len() != images.len() {
        return Err(AppError::Validation("All images must be unique".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ImageLifecycle {
    store: Arc<dyn ImageStore>,
    events: CleanupQueue,
}

impl ImageLifecycle {
    pub fn new(store: Arc<dyn ImageStore>, events: CleanupQueue) -> Self {
        Self { store, events }
    }

    /// Uploads every source, then runs `persist` with the hosted URLs.
    /// An upload failure aborts before anything is persisted; a persist
    /// failure queues all just-uploaded URLs and propagates the error.
    pub async fn upload_then_persist<T, F, Fut>(
        &self,
        sources: &[String],
        persist: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce(Vec<String>) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let uploaded = try_join_all(sources.iter().map(|s| self.store.upload(s))).await?;

        match persist(uploaded.clone()).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.events.publish_urls(uploaded);
                Err(err)
            }
        }
    }

    /// Appends one image to a bounded array. The bound is checked before
    /// the upload, so a rejected add leaves nothing behind in storage.
    pub async fn add_image<T, F, Fut>(
        &self,
        kind: &str,
        source: &str,
        current: &[String],
        save: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce(Vec<String>) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if current.len() + 1 > MAX_IMAGES {
            return Err(AppError::TooManyImages(format!(
                "{kind} should have no more than {MAX_IMAGES} images"
            )));
        }

        let url = self.store.upload(source).await?;
        let mut images = current.to_vec();
        images.push(url.clone());

        match save(images).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.events.publish(CleanupEvent::Single(url));
                Err(err)
            }
        }
    }

    /// Removes one image from a bounded array and queues it for deletion.
    /// Nothing is queued unless the save succeeded: the target URL is
    /// still referenced on every failure path.
    pub async fn remove_image<T, F, Fut>(
        &self,
        kind: &str,
        target: &str,
        current: &[String],
        save: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce(Vec<String>) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if !current.iter().any(|u| u == target) {
            return Err(AppError::ImageNotPresent(format!(
                "This image is not included in this {} images",
                kind.to_lowercase()
            )));
        }
        if current.len() < MIN_IMAGES + 1 {
            return Err(AppError::BelowMinimum(format!(
                "{kind} can not have less than {MIN_IMAGES} images"
            )));
        }

        let remaining: Vec<String> = current.iter().filter(|u| *u != target).cloned().collect();
        let value = save(remaining).await?;

        self.events.publish(CleanupEvent::Single(target.to_string()));
        Ok(value)
    }

    /// Uploads a replacement for a single-image field, if one was given.
    /// The owning service performs the swap and settles cleanup through
    /// `discard`: the new URL on a failed swap, the old URL on a
    /// successful one.
    pub async fn replace_single_image(
        &self,
        source: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        match source {
            Some(src) => Ok(Some(self.store.upload(src).await?)),
            None => Ok(None),
        }
    }

    /// Queues one hosted URL for deletion.
    pub fn discard(&self, url: impl Into<String>) {
        self.events.publish(CleanupEvent::Single(url.into()));
    }

    /// Queues every image an already-deleted entity owned. No event is
    /// published for an entity that owned none.
    pub fn discard_entity_images(&self, urls: Vec<String>) {
        self.events.publish_urls(urls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::image_store::{DeleteOutcome, UploadError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc::UnboundedReceiver;

    struct StubStore {
        uploads: Mutex<Vec<String>>,
        fail_uploads: bool,
    }

    impl StubStore {
        fn new() -> Self {
            Self {
                uploads: Mutex::new(Vec::new()),
                fail_uploads: false,
            }
        }

        fn failing() -> Self {
            Self {
                uploads: Mutex::new(Vec::new()),
                fail_uploads: true,
            }
        }

        fn upload_count(&self) -> usize {
            self.uploads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageStore for StubStore {
        async fn upload(&self, source: &str) -> Result<String, UploadError> {
            if self.fail_uploads {
                return Err(UploadError::BadFormat);
            }
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(source.to_string());
            Ok(format!("https://img.example/hosted/{}", uploads.len()))
        }

        async fn delete(&self, _hosted_url: &str) -> anyhow::Result<DeleteOutcome> {
            Ok(DeleteOutcome::Deleted)
        }
    }

    fn lifecycle(store: StubStore) -> (Arc<StubStore>, ImageLifecycle, UnboundedReceiver<CleanupEvent>) {
        let store = Arc::new(store);
        let (queue, rx) = CleanupQueue::new();
        (store.clone(), ImageLifecycle::new(store, queue), rx)
    }

    fn sources(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://cdn.example/raw/{i}.jpg")).collect()
    }

    #[tokio::test]
    async fn persist_receives_only_hosted_urls() {
        let (store, lifecycle, mut rx) = lifecycle(StubStore::new());

        let persisted = lifecycle
            .upload_then_persist(&sources(3), |urls| async move { Ok(urls) })
            .await
            .unwrap();

        assert_eq!(persisted.len(), 3);
        assert!(persisted.iter().all(|u| u.starts_with("https://img.example/hosted/")));
        assert_eq!(store.upload_count(), 3);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn persist_failure_queues_every_uploaded_url() {
        let (_store, lifecycle, mut rx) = lifecycle(StubStore::new());

        let result: Result<(), AppError> = lifecycle
            .upload_then_persist(&sources(3), |_urls| async move {
                Err(AppError::NotFound("The profile does not exist.".to_string()))
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        match rx.try_recv().unwrap() {
            CleanupEvent::Batch(urls) => assert_eq!(urls.len(), 3),
            other => panic!("expected batch event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_failure_skips_persist_and_cleanup() {
        let (_store, lifecycle, mut rx) = lifecycle(StubStore::failing());
        let persisted = Arc::new(AtomicBool::new(false));
        let flag = persisted.clone();

        let result: Result<(), AppError> = lifecycle
            .upload_then_persist(&sources(3), |_urls| async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(AppError::Upload(_))));
        assert!(!persisted.load(Ordering::SeqCst));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn add_image_checks_bound_before_uploading() {
        let (store, lifecycle, mut rx) = lifecycle(StubStore::new());
        let current = sources(MAX_IMAGES);

        let result: Result<(), AppError> = lifecycle
            .add_image("Activity", "https://cdn.example/raw/extra.jpg", &current, |_| async move {
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(AppError::TooManyImages(_))));
        assert_eq!(store.upload_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn add_image_save_failure_discards_new_upload() {
        let (_store, lifecycle, mut rx) = lifecycle(StubStore::new());
        let current = sources(3);

        let result: Result<(), AppError> = lifecycle
            .add_image("Activity", "https://cdn.example/raw/extra.jpg", &current, |_| async move {
                Err(AppError::NotFound("Activity trying to edit does not exist.".to_string()))
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(
            rx.try_recv().unwrap(),
            CleanupEvent::Single("https://img.example/hosted/1".to_string())
        );
    }

    #[tokio::test]
    async fn remove_image_rejects_unknown_url_without_event() {
        let (_store, lifecycle, mut rx) = lifecycle(StubStore::new());
        let current = sources(4);

        let result: Result<(), AppError> = lifecycle
            .remove_image("Activity", "https://cdn.example/raw/unknown.jpg", &current, |_| {
                async move { Ok(()) }
            })
            .await;

        assert!(matches!(result, Err(AppError::ImageNotPresent(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn remove_image_refuses_to_drop_below_minimum() {
        let (_store, lifecycle, mut rx) = lifecycle(StubStore::new());
        let current = sources(MIN_IMAGES);

        let result: Result<(), AppError> = lifecycle
            .remove_image("Activity", &current[0].clone(), &current, |_| async move { Ok(()) })
            .await;

        assert!(matches!(result, Err(AppError::BelowMinimum(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn remove_image_queues_target_after_save() {
        let (_store, lifecycle, mut rx) = lifecycle(StubStore::new());
        let current = sources(4);
        let target = current[1].clone();

        let remaining = lifecycle
            .remove_image("Activity", &target, &current, |urls| async move { Ok(urls) })
            .await
            .unwrap();

        assert_eq!(remaining.len(), 3);
        assert!(!remaining.contains(&target));
        assert_eq!(rx.try_recv().unwrap(), CleanupEvent::Single(target));
    }
}
