use std::{future::Future, marker::PhantomData};

use async_trait::async_trait;
use shared::protocol::Page;

use crate::{abort::AbortSignal, error::FetchError};

/// Source of paginated list data.
///
/// Implementations must resolve to [`FetchError::Aborted`] once `signal` fires.
#[async_trait]
pub trait ListFetcher<F, T>: Send + Sync {
    async fn fetch(&self, filters: &F, page: u32, signal: AbortSignal)
        -> Result<Page<T>, FetchError>;
}

/// Source of a single resource, keyed by `P`.
#[async_trait]
pub trait DataFetcher<P, T>: Send + Sync {
    async fn fetch(&self, params: &P, signal: AbortSignal) -> Result<T, FetchError>;
}

/// Adapts a closure returning a future into a [`ListFetcher`].
pub struct FnListFetcher<Func, F, T> {
    func: Func,
    _marker: PhantomData<fn(F) -> T>,
}

impl<Func, F, T> FnListFetcher<Func, F, T> {
    pub fn new(func: Func) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<Func, Fut, F, T> ListFetcher<F, T> for FnListFetcher<Func, F, T>
where
    Func: Fn(F, u32, AbortSignal) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, FetchError>> + Send,
    F: Clone + Send + Sync,
    T: Send,
{
    async fn fetch(
        &self,
        filters: &F,
        page: u32,
        signal: AbortSignal,
    ) -> Result<Page<T>, FetchError> {
        (self.func)(filters.clone(), page, signal).await
    }
}

/// Adapts a closure returning a future into a [`DataFetcher`].
pub struct FnDataFetcher<Func, P, T> {
    func: Func,
    _marker: PhantomData<fn(P) -> T>,
}

impl<Func, P, T> FnDataFetcher<Func, P, T> {
    pub fn new(func: Func) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<Func, Fut, P, T> DataFetcher<P, T> for FnDataFetcher<Func, P, T>
where
    Func: Fn(P, AbortSignal) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, FetchError>> + Send,
    P: Clone + Send + Sync,
    T: Send,
{
    async fn fetch(&self, params: &P, signal: AbortSignal) -> Result<T, FetchError> {
        (self.func)(params.clone(), signal).await
    }
}
