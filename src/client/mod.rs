//! Clients for the persistence services.
//!
//! Both families report failures the same way, as a [`Result`] carrying an [`Error`]. A failure
//! the server reported for a storage operation becomes [`Error::Storage`] with the server's
//! description. Anything else (network failure, deadline, cancellation, shutdown, an unimplemented
//! method) becomes [`Error::Unknown`], and the original status is only logged.
//!
//! No call is retried.

mod item;
mod order;

pub use self::item::ItemClient;
pub use self::order::OrderClient;
use crate::error::StoreErrorKind;
use crate::interop::store_error_kind;
use crate::tracing_shim::{error, info, warn};
use std::future::Future;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tonic::transport::Channel;
use tonic::{Request, Response, Status};

/// The deadline applied to each call unless configured otherwise.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// How long [`shutdown`](ItemClient::shutdown) waits for in-flight calls unless configured
/// otherwise.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// An error returned by a client call.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The server failed to perform the storage operation.
    ///
    /// The message is the description supplied by the server.
    #[error("{message}")]
    Storage {
        /// What kind of storage failure the server reported.
        kind: StoreErrorKind,
        /// The server's description of the failure.
        message: String,
    },
    /// The call failed for any other reason.
    #[error("unknown error")]
    Unknown,
}

impl Error {
    /// The storage failure kind, if the server reported one.
    #[inline]
    pub const fn store_error_kind(&self) -> Option<StoreErrorKind> {
        match self {
            Self::Storage { kind, .. } => Some(*kind),
            Self::Unknown => None,
        }
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        match store_error_kind(status.code()) {
            Some(kind) => Self::Storage {
                kind,
                message: status.message().to_owned(),
            },
            None => Self::Unknown,
        }
    }
}

/// Client settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Deadline for each call. `None` lets calls wait indefinitely.
    pub call_timeout: Option<Duration>,
    /// How long shutdown waits for in-flight calls before cancelling them.
    pub shutdown_grace: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl ClientConfig {
    /// Set the per-call deadline.
    #[must_use]
    #[inline]
    pub const fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Set the shutdown grace period.
    #[must_use]
    #[inline]
    pub const fn with_shutdown_grace(mut self, shutdown_grace: Duration) -> Self {
        self.shutdown_grace = shutdown_grace;
        self
    }
}

/// State shared by every clone of a client.
#[derive(Debug)]
struct Lifecycle {
    /// `None` once the client has shut down.
    channel: Mutex<Option<Channel>>,
    closing: AtomicBool,
    in_flight: AtomicUsize,
    /// Notified when `in_flight` drops to zero.
    drained: Notify,
    /// Set to `true` to cancel calls still running after the grace period.
    cancelled: watch::Sender<bool>,
}

/// Marks a call as in flight for as long as it is held.
struct InFlight<'a>(&'a Lifecycle);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.drained.notify_waiters();
        }
    }
}

impl Lifecycle {
    /// Register a call, unless the client is shutting down.
    fn enter(&self) -> Option<(InFlight<'_>, Channel)> {
        if self.closing.load(Ordering::Acquire) {
            return None;
        }
        let _previous = self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlight(self);
        // Shutdown may have begun between the two loads.
        if self.closing.load(Ordering::Acquire) {
            return None;
        }
        let channel = self.channel.lock().ok()?.clone()?;
        Some((guard, channel))
    }

    /// Resolve once no call is in flight.
    async fn drained(&self) {
        loop {
            let mut notified = pin!(self.drained.notified());
            let _registered = notified.as_mut().enable();
            if self.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// A channel plus the bookkeeping needed to time out, drain and cancel calls on it.
#[derive(Debug, Clone)]
struct Connection {
    service: &'static str,
    config: ClientConfig,
    lifecycle: Arc<Lifecycle>,
}

impl Connection {
    fn new(service: &'static str, channel: Channel, config: ClientConfig) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            service,
            config,
            lifecycle: Arc::new(Lifecycle {
                channel: Mutex::new(Some(channel)),
                closing: AtomicBool::new(false),
                in_flight: AtomicUsize::new(0),
                drained: Notify::new(),
                cancelled,
            }),
        }
    }

    /// Perform one unary call.
    ///
    /// `rpc` receives the channel and the prepared request and issues the call. The response
    /// message is returned as-is; failures are classified into [`Error`].
    async fn call<Req, Res, F, Fut>(
        &self,
        operation: &'static str,
        message: Req,
        rpc: F,
    ) -> Result<Res, Error>
    where
        F: FnOnce(Channel, Request<Req>) -> Fut,
        Fut: Future<Output = Result<Response<Res>, Status>>,
    {
        let service = self.service;
        info!(service, operation, "calling");

        let Some((_in_flight, channel)) = self.lifecycle.enter() else {
            error!(service, operation, "client is shut down");
            return Err(Error::Unknown);
        };

        let mut request = Request::new(message);
        if let Some(timeout) = self.config.call_timeout {
            request.set_timeout(timeout);
        }

        let response = async {
            match self.config.call_timeout {
                Some(timeout) => tokio::time::timeout(timeout, rpc(channel, request))
                    .await
                    .unwrap_or_else(|_| Err(Status::deadline_exceeded("call timed out"))),
                None => rpc(channel, request).await,
            }
        };
        let mut cancelled = self.lifecycle.cancelled.subscribe();
        let result = tokio::select! {
            result = response => result,
            _ = cancelled.wait_for(|cancelled| *cancelled) => {
                Err(Status::cancelled("client shut down"))
            }
        };

        result.map(Response::into_inner).map_err(|status| {
            error!(
                service,
                operation,
                code = ?status.code(),
                description = status.message(),
                "call failed"
            );
            Error::from(status)
        })
    }

    /// Stop accepting calls, wait for in-flight calls up to the grace period, then cancel whatever
    /// is left and release the channel.
    ///
    /// Returns `true` if every in-flight call finished within the grace period.
    async fn shutdown(&self) -> bool {
        let service = self.service;
        self.lifecycle.closing.store(true, Ordering::Release);

        let drained = tokio::time::timeout(self.config.shutdown_grace, self.lifecycle.drained())
            .await
            .is_ok();
        if !drained {
            warn!(
                service,
                grace = ?self.config.shutdown_grace,
                "cancelling calls still in flight"
            );
        }
        let _previous = self.lifecycle.cancelled.send_replace(true);
        if let Ok(mut channel) = self.lifecycle.channel.lock() {
            drop(channel.take());
        }
        drained
    }
}
