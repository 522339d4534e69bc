use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;

/// Anything that can consume one inbound packet.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: Context);
}

/// Closure adapter: `handler_fn(|ctx| async move { ... })`.
pub struct HandlerFn<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, ctx: Context) {
        (self.f)(ctx).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, ctx: Context) {
        (**self).handle(ctx).await
    }
}
