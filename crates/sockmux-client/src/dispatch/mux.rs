//! Routing tables keyed by packet type, namespace, and event name.
//!
//! Every mux is itself a `Handler`, so tables nest into a tree, typically
//! rooted at a `PacketTypeMux`. Registration takes `&self` and the last
//! registration for a key wins. A miss is logged and the packet dropped.

use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use sockmux_core::PacketType;

use crate::context::Context;
use crate::dispatch::handler::{handler_fn, Handler};

struct Routes<K: Eq + Hash> {
    handlers: DashMap<K, Arc<dyn Handler>>,
}

impl<K: Eq + Hash + Clone> Routes<K> {
    fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    fn insert(&self, key: K, handler: Arc<dyn Handler>) {
        self.handlers.insert(key, handler);
    }

    fn get<Q>(&self, key: &Q) -> Option<Arc<dyn Handler>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.handlers.get(key).map(|e| e.value().clone())
    }

    fn keys(&self) -> Vec<K> {
        self.handlers.iter().map(|e| e.key().clone()).collect()
    }
}

/// Routes by `Context::event()`. Only meaningful below an EVENT/ACK route.
pub struct EventMux {
    routes: Routes<String>,
}

impl Default for EventMux {
    fn default() -> Self {
        Self::new()
    }
}

impl EventMux {
    pub fn new() -> Self {
        Self {
            routes: Routes::new(),
        }
    }

    pub fn handle(&self, event: impl Into<String>, handler: impl Handler + 'static) {
        self.routes.insert(event.into(), Arc::new(handler));
    }

    pub fn handle_fn<F, Fut>(&self, event: impl Into<String>, f: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle(event, handler_fn(f));
    }

    pub fn events(&self) -> Vec<String> {
        self.routes.keys()
    }
}

#[async_trait]
impl Handler for EventMux {
    async fn handle(&self, ctx: Context) {
        let handler = self.routes.get(ctx.event());
        match handler {
            Some(handler) => handler.handle(ctx).await,
            None => tracing::info!(event = ctx.event(), "handler not found"),
        }
    }
}

/// Routes by `Context::namespace()`.
pub struct NamespaceMux {
    routes: Routes<String>,
}

impl Default for NamespaceMux {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceMux {
    pub fn new() -> Self {
        Self {
            routes: Routes::new(),
        }
    }

    pub fn handle(&self, namespace: impl Into<String>, handler: impl Handler + 'static) {
        self.routes.insert(namespace.into(), Arc::new(handler));
    }

    pub fn handle_fn<F, Fut>(&self, namespace: impl Into<String>, f: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle(namespace, handler_fn(f));
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.routes.keys()
    }
}

#[async_trait]
impl Handler for NamespaceMux {
    async fn handle(&self, ctx: Context) {
        let handler = self.routes.get(ctx.namespace());
        match handler {
            Some(handler) => handler.handle(ctx).await,
            None => tracing::info!(namespace = ctx.namespace(), "handler not found"),
        }
    }
}

/// Routes by `Context::packet_type()`; the usual root of a routing tree.
pub struct PacketTypeMux {
    routes: Routes<PacketType>,
}

impl Default for PacketTypeMux {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketTypeMux {
    pub fn new() -> Self {
        Self {
            routes: Routes::new(),
        }
    }

    pub fn handle(&self, packet_type: PacketType, handler: impl Handler + 'static) {
        self.routes.insert(packet_type, Arc::new(handler));
    }

    pub fn handle_fn<F, Fut>(&self, packet_type: PacketType, f: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle(packet_type, handler_fn(f));
    }

    pub fn packet_types(&self) -> Vec<PacketType> {
        self.routes.keys()
    }
}

#[async_trait]
impl Handler for PacketTypeMux {
    async fn handle(&self, ctx: Context) {
        let handler = self.routes.get(&ctx.packet_type());
        match handler {
            Some(handler) => handler.handle(ctx).await,
            None => tracing::info!(packet_type = %ctx.packet_type(), "handler not found"),
        }
    }
}
