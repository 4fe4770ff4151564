use std::future::Future;

use super::notify::{Notifier, Toast};
use crate::error::AppResult;

/// Loading/error/data triple behind every hook.
///
/// Reads replace `data` wholesale. Mutations never touch `data` directly: a
/// successful mutation re-runs the read, a failed one records the error and
/// raises an error toast. Nothing is retried.
#[derive(Debug)]
pub struct Resource<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> Resource<T> {
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load<F>(&mut self, fetch: F, notifier: &dyn Notifier) -> bool
    where
        F: Future<Output = AppResult<T>>,
    {
        self.loading = true;
        let result = fetch.await;
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                true
            }
            Err(e) => {
                let message = e.to_string();
                notifier.notify(Toast::error("Failed to load", message.clone()));
                self.error = Some(message);
                false
            }
        }
    }

    /// Runs `mutation`; on success awaits `refetch` and returns the mutation's output.
    pub async fn mutate<R, M, F>(
        &mut self,
        mutation: M,
        refetch: F,
        notifier: &dyn Notifier,
    ) -> Option<R>
    where
        M: Future<Output = AppResult<R>>,
        F: Future<Output = AppResult<T>>,
    {
        self.loading = true;
        match mutation.await {
            Ok(out) => {
                self.load(refetch, notifier).await;
                Some(out)
            }
            Err(e) => {
                self.loading = false;
                let message = e.to_string();
                notifier.notify(Toast::error("Something went wrong", message.clone()));
                self.error = Some(message);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, hooks::notify::ToastLog};

    #[tokio::test]
    async fn failed_mutation_keeps_data_and_skips_refetch() {
        let log = ToastLog::default();
        let mut res: Resource<Vec<u32>> = Resource::default();
        assert!(res.load(async { Ok(vec![1]) }, &log).await);

        let mut refetched = false;
        let out: Option<()> = res
            .mutate(
                async { Err(AppError::validation("nope")) },
                async {
                    refetched = true;
                    Ok(vec![1, 2])
                },
                &log,
            )
            .await;
        assert!(out.is_none());
        assert!(!refetched);
        assert_eq!(res.data(), Some(&vec![1]));
        assert_eq!(res.error(), Some("nope"));
        assert_eq!(log.errors().len(), 1);
    }

    #[tokio::test]
    async fn successful_mutation_refetches() {
        let log = ToastLog::default();
        let mut res: Resource<Vec<u32>> = Resource::default();
        let out = res
            .mutate(async { Ok(7) }, async { Ok(vec![7]) }, &log)
            .await;
        assert_eq!(out, Some(7));
        assert_eq!(res.data(), Some(&vec![7]));
        assert!(!res.is_loading());
        assert!(log.toasts().is_empty());
    }
}
