//! Single-resource counterpart of [`crate::list_controller::ListController`]:
//! same fetch identity and abort discipline, no pagination or debounce.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use shared::domain::{FetchId, FetchKind};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    abort::{abort_pair, AbortHandle},
    error::FetchError,
    fetcher::DataFetcher,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DataState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
}

impl<T> Default for DataState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_refreshing: false,
            error: None,
        }
    }
}

impl<T> DataState<T> {
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_refreshing
    }
}

struct DataInner<P> {
    params: P,
    has_fetched_once: bool,
    latest: FetchId,
    in_flight: Option<AbortHandle>,
    torn_down: bool,
}

impl<P> DataInner<P> {
    fn shut_down(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort();
        }
        self.latest = self.latest.next();
        true
    }
}

pub struct DataController<P, T> {
    fetcher: Arc<dyn DataFetcher<P, T>>,
    inner: Mutex<DataInner<P>>,
    state: watch::Sender<DataState<T>>,
    this: Weak<Self>,
}

impl<P, T> DataController<P, T>
where
    P: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(fetcher: Arc<dyn DataFetcher<P, T>>, params: P) -> Arc<Self> {
        let (state, _) = watch::channel(DataState::default());
        Arc::new_cyclic(|this| Self {
            fetcher,
            inner: Mutex::new(DataInner {
                params,
                has_fetched_once: false,
                latest: FetchId::default(),
                in_flight: None,
                torn_down: false,
            }),
            state,
            this: this.clone(),
        })
    }

    pub fn snapshot(&self) -> DataState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DataState<T>> {
        self.state.subscribe()
    }

    pub fn initialize(&self) -> bool {
        let mut inner = self.lock_inner();
        if inner.torn_down || inner.has_fetched_once {
            return false;
        }
        inner.has_fetched_once = true;
        self.issue(&mut inner, FetchKind::Initial);
        true
    }

    /// Stores new params; refetches right away once initialized.
    pub fn set_params(&self, params: P) {
        let mut inner = self.lock_inner();
        if inner.torn_down {
            return;
        }
        inner.params = params;
        if inner.has_fetched_once {
            self.issue(&mut inner, FetchKind::Filter);
        }
    }

    pub fn refresh(&self) {
        self.reissue(FetchKind::Refresh);
    }

    pub fn retry(&self) {
        self.reissue(FetchKind::Retry);
    }

    pub fn teardown(&self) {
        let mut inner = self.lock_inner();
        if inner.shut_down() {
            self.state.send_modify(|state| {
                state.is_loading = false;
                state.is_refreshing = false;
            });
        }
    }

    fn reissue(&self, kind: FetchKind) {
        let mut inner = self.lock_inner();
        if inner.torn_down {
            return;
        }
        inner.has_fetched_once = true;
        self.issue(&mut inner, kind);
    }

    fn issue(&self, inner: &mut DataInner<P>, kind: FetchKind) {
        let id = inner.latest.next();
        inner.latest = id;
        if let Some(previous) = inner.in_flight.take() {
            previous.abort();
        }
        let (handle, signal) = abort_pair();
        inner.in_flight = Some(handle);
        self.state.send_modify(|state| {
            state.error = None;
            state.is_refreshing = kind.is_refresh();
            state.is_loading = !kind.is_refresh();
        });
        debug!("data: issuing fetch id={id} kind={}", kind.as_str());

        let params = inner.params.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let this = self.this.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&params, signal).await;
            if let Some(controller) = this.upgrade() {
                controller.settle(id, kind, result);
            }
        });
    }

    fn settle(&self, id: FetchId, kind: FetchKind, result: Result<T, FetchError>) {
        let mut inner = self.lock_inner();
        if id != inner.latest {
            debug!("data: discarding superseded fetch id={id} latest={}", inner.latest);
            return;
        }
        inner.in_flight = None;

        let outcome = match result {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.is_abort() => Ok(None),
            Err(err) => {
                warn!("data: fetch failed id={id} kind={}: {err}", kind.as_str());
                Err(err.user_message())
            }
        };
        self.state.send_modify(|state| {
            match outcome {
                Ok(Some(data)) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Ok(None) => {}
                Err(message) => state.error = Some(message),
            }
            state.is_loading = false;
            state.is_refreshing = false;
        });
    }

    fn lock_inner(&self) -> MutexGuard<'_, DataInner<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P, T> Drop for DataController<P, T> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.shut_down();
    }
}

#[cfg(test)]
#[path = "tests/data_controller_tests.rs"]
mod tests;
