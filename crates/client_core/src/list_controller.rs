//! Paginated list controller: fetch sequencing, debounced refiltering, append
//! pagination and pull-to-refresh over a [`ListFetcher`].
//!
//! Every fetch gets a [`FetchId`]. Only the most recently issued fetch may
//! write to [`ListState`]; anything it superseded is aborted and, if it
//! resolves anyway, discarded.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use shared::{
    domain::{FetchId, FetchKind, ListPhase},
    protocol::{Page, PaginationInfo},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    abort::{abort_pair, AbortHandle},
    debounce::Debouncer,
    error::FetchError,
    fetcher::ListFetcher,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListControllerConfig {
    /// Delay applied to filter changes. Zero issues the fetch immediately.
    pub debounce: Duration,
    pub first_page: u32,
}

impl Default for ListControllerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::ZERO,
            first_page: 1,
        }
    }
}

impl ListControllerConfig {
    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            debounce,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub pagination: Option<PaginationInfo>,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: None,
            is_loading: false,
            is_loading_more: false,
            is_refreshing: false,
            error: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_loading_more || self.is_refreshing
    }

    pub fn can_load_more(&self) -> bool {
        !self.is_busy() && self.pagination.is_some_and(|info| info.has_more())
    }

    pub fn phase(&self) -> ListPhase {
        if self.is_loading_more {
            ListPhase::LoadingMore
        } else if self.is_refreshing {
            ListPhase::Refreshing
        } else if self.is_loading {
            ListPhase::Loading
        } else if self.error.is_some() {
            ListPhase::Error
        } else if self.pagination.is_none() {
            ListPhase::Idle
        } else {
            ListPhase::Settled
        }
    }

    fn clear_flags(&mut self) {
        self.is_loading = false;
        self.is_loading_more = false;
        self.is_refreshing = false;
    }

    /// A new attempt replaces any error shown for the previous one.
    fn mark_in_flight(&mut self, kind: FetchKind) {
        self.clear_flags();
        self.error = None;
        match kind {
            FetchKind::LoadMore => self.is_loading_more = true,
            FetchKind::Refresh => self.is_refreshing = true,
            FetchKind::Initial | FetchKind::Filter | FetchKind::Retry => self.is_loading = true,
        }
    }

    fn apply_page(&mut self, kind: FetchKind, page: Page<T>) {
        let Page { items, pagination } = page;
        if kind.appends() {
            self.items.extend(items);
        } else {
            self.items = items;
        }
        self.pagination = Some(pagination);
        self.error = None;
    }
}

struct ControllerInner<F> {
    filters: F,
    /// Filters of the last fresh fetch attempted; retry reuses them.
    attempted_filters: Option<F>,
    /// Filters the listed items were fetched with; pagination reuses them.
    listed_filters: Option<F>,
    has_fetched_once: bool,
    latest: FetchId,
    in_flight: Option<AbortHandle>,
    debouncer: Debouncer,
    torn_down: bool,
}

impl<F> ControllerInner<F> {
    fn shut_down(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;
        self.debouncer.cancel();
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort();
        }
        self.latest = self.latest.next();
        true
    }
}

pub struct ListController<F, T> {
    fetcher: Arc<dyn ListFetcher<F, T>>,
    config: ListControllerConfig,
    inner: Mutex<ControllerInner<F>>,
    state: watch::Sender<ListState<T>>,
    this: Weak<Self>,
}

impl<F, T> ListController<F, T>
where
    F: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        fetcher: Arc<dyn ListFetcher<F, T>>,
        filters: F,
        config: ListControllerConfig,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(ListState::default());
        Arc::new_cyclic(|this| Self {
            fetcher,
            config,
            inner: Mutex::new(ControllerInner {
                filters,
                attempted_filters: None,
                listed_filters: None,
                has_fetched_once: false,
                latest: FetchId::default(),
                in_flight: None,
                debouncer: Debouncer::new(),
                torn_down: false,
            }),
            state,
            this: this.clone(),
        })
    }

    pub fn config(&self) -> ListControllerConfig {
        self.config
    }

    pub fn snapshot(&self) -> ListState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.state.subscribe()
    }

    pub fn filters(&self) -> F {
        self.lock_inner().filters.clone()
    }

    pub fn latest_fetch(&self) -> FetchId {
        self.lock_inner().latest
    }

    /// Starts the first fetch. Later calls are no-ops and return `false`.
    pub fn initialize(&self) -> bool {
        let mut inner = self.lock_inner();
        if inner.torn_down || inner.has_fetched_once {
            return false;
        }
        inner.has_fetched_once = true;
        let filters = inner.filters.clone();
        self.issue(&mut inner, FetchKind::Initial, filters, self.config.first_page);
        true
    }

    /// Replaces the filters. Once initialized, schedules a fresh fetch after
    /// the configured debounce; a newer call resets the pending timer.
    pub fn set_filters(&self, filters: F) {
        let mut inner = self.lock_inner();
        if inner.torn_down {
            return;
        }
        inner.filters = filters;
        if !inner.has_fetched_once {
            return;
        }

        if self.config.debounce.is_zero() {
            inner.debouncer.cancel();
            let filters = inner.filters.clone();
            self.issue(&mut inner, FetchKind::Filter, filters, self.config.first_page);
            return;
        }

        let this = self.this.clone();
        inner.debouncer.schedule(self.config.debounce, async move {
            if let Some(controller) = this.upgrade() {
                controller.fire_debounced();
            }
        });
    }

    pub fn refresh(&self) {
        let mut inner = self.lock_inner();
        if inner.torn_down {
            return;
        }
        inner.debouncer.cancel();
        inner.has_fetched_once = true;
        let filters = inner.filters.clone();
        self.issue(&mut inner, FetchKind::Refresh, filters, self.config.first_page);
    }

    /// Requests the next page. Returns `false` without side effects when a
    /// load is in flight or the last page has been reached.
    pub fn load_more(&self) -> bool {
        let mut inner = self.lock_inner();
        if inner.torn_down {
            return false;
        }

        let next_page = {
            let state = self.state.borrow();
            if state.is_busy() {
                None
            } else {
                state.pagination.and_then(|info| info.next_page())
            }
        };
        let Some(page) = next_page else {
            debug!("list: load_more ignored latest={}", inner.latest);
            return false;
        };

        let filters = inner
            .listed_filters
            .clone()
            .unwrap_or_else(|| inner.filters.clone());
        self.issue(&mut inner, FetchKind::LoadMore, filters, page);
        true
    }

    /// Re-issues the last fresh fetch from the first page.
    pub fn retry(&self) {
        let mut inner = self.lock_inner();
        if inner.torn_down {
            return;
        }
        inner.has_fetched_once = true;
        let filters = inner
            .attempted_filters
            .clone()
            .unwrap_or_else(|| inner.filters.clone());
        self.issue(&mut inner, FetchKind::Retry, filters, self.config.first_page);
    }

    /// Cancels pending work; no fetch commits afterwards.
    pub fn teardown(&self) {
        let mut inner = self.lock_inner();
        if inner.shut_down() {
            debug!("list: torn down latest={}", inner.latest);
            self.state.send_modify(ListState::clear_flags);
        }
    }

    fn fire_debounced(&self) {
        let mut inner = self.lock_inner();
        if inner.torn_down {
            return;
        }
        let filters = inner.filters.clone();
        self.issue(&mut inner, FetchKind::Filter, filters, self.config.first_page);
    }

    fn issue(&self, inner: &mut ControllerInner<F>, kind: FetchKind, filters: F, page: u32) {
        let id = inner.latest.next();
        inner.latest = id;
        if let Some(previous) = inner.in_flight.take() {
            previous.abort();
        }
        let (handle, signal) = abort_pair();
        inner.in_flight = Some(handle);
        if !kind.appends() {
            inner.attempted_filters = Some(filters.clone());
        }
        self.state.send_modify(|state| state.mark_in_flight(kind));
        debug!("list: issuing fetch id={id} kind={} page={page}", kind.as_str());

        let fetcher = Arc::clone(&self.fetcher);
        let this = self.this.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&filters, page, signal).await;
            if let Some(controller) = this.upgrade() {
                controller.settle(id, kind, filters, result);
            }
        });
    }

    fn settle(
        &self,
        id: FetchId,
        kind: FetchKind,
        filters: F,
        result: Result<Page<T>, FetchError>,
    ) {
        let mut inner = self.lock_inner();
        if id != inner.latest {
            debug!(
                "list: discarding superseded fetch id={id} kind={} latest={}",
                kind.as_str(),
                inner.latest
            );
            return;
        }
        inner.in_flight = None;

        match result {
            Ok(page) => {
                debug!(
                    "list: committed fetch id={id} kind={} page={} items={}",
                    kind.as_str(),
                    page.pagination.current_page,
                    page.items.len()
                );
                if !kind.appends() {
                    inner.listed_filters = Some(filters);
                }
                self.state.send_modify(|state| {
                    state.apply_page(kind, page);
                    state.clear_flags();
                });
            }
            Err(err) if err.is_abort() => {
                debug!("list: fetch aborted id={id} kind={}", kind.as_str());
                self.state.send_modify(ListState::clear_flags);
            }
            Err(err) => {
                warn!("list: fetch failed id={id} kind={}: {err}", kind.as_str());
                let message = err.user_message();
                self.state.send_modify(|state| {
                    state.error = Some(message);
                    state.clear_flags();
                });
            }
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, ControllerInner<F>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F, T> Drop for ListController<F, T> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.shut_down();
    }
}

#[cfg(test)]
#[path = "tests/list_controller_tests.rs"]
mod tests;
