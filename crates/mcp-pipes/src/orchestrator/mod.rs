//! Holds several sessions at once: concurrent cross-session calls and
//! last-in, first-out teardown.

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;

use crate::config::ProviderSpec;
use crate::session::{ClientSession, SessionOptions};
use crate::types::{
    CapabilityDescriptor, CapabilityKind, ContentItem, InvocationRequest, McpError, McpResult,
};

/// What the orchestrator needs from a session.
#[async_trait]
pub trait ManagedSession: Send {
    async fn list(&mut self, kind: CapabilityKind) -> McpResult<Vec<CapabilityDescriptor>>;
    async fn invoke(&mut self, request: &InvocationRequest) -> McpResult<Vec<ContentItem>>;
    async fn close(&mut self) -> McpResult<()>;
}

#[async_trait]
impl ManagedSession for ClientSession {
    async fn list(&mut self, kind: CapabilityKind) -> McpResult<Vec<CapabilityDescriptor>> {
        ClientSession::list(self, kind).await
    }

    async fn invoke(&mut self, request: &InvocationRequest) -> McpResult<Vec<ContentItem>> {
        ClientSession::invoke(self, request).await
    }

    async fn close(&mut self) -> McpResult<()> {
        ClientSession::close(self).await
    }
}

/// Result key: which session, which capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityKey {
    pub session: String,
    pub identifier: String,
}

impl std::fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.session, self.identifier)
    }
}

/// One session that failed to close.
#[derive(Debug, Error)]
#[error("failed to close session '{session}': {source}")]
pub struct TeardownError {
    pub session: String,
    #[source]
    pub source: McpError,
}

/// Outcome of [`Orchestrator::close_all`].
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Session names in the order they were closed.
    pub order: Vec<String>,
    pub failures: Vec<TeardownError>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sessions in acquisition order.
pub struct Orchestrator<S: ManagedSession = ClientSession> {
    sessions: Vec<(String, S)>,
}

impl<S: ManagedSession> Default for Orchestrator<S> {
    fn default() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }
}

impl Orchestrator<ClientSession> {
    /// Connect to every provider in order. If one fails, the sessions
    /// already opened are closed newest first and the error is returned.
    pub async fn open_all(specs: &[ProviderSpec], options: SessionOptions) -> McpResult<Self> {
        let mut orchestrator = Self::new();
        for spec in specs {
            match ClientSession::connect(spec, options.clone()).await {
                Ok(session) => orchestrator.push(spec.name.clone(), session)?,
                Err(e) => {
                    tracing::warn!(
                        provider = %spec.name,
                        "Open failed, releasing held sessions: {e}"
                    );
                    let report = orchestrator.close_all().await;
                    for failure in &report.failures {
                        tracing::warn!("{failure}");
                    }
                    return Err(e);
                }
            }
        }
        Ok(orchestrator)
    }
}

impl<S: ManagedSession> Orchestrator<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an open session. Names must be unique.
    pub fn push(&mut self, name: impl Into<String>, session: S) -> McpResult<()> {
        let name = name.into();
        if self.sessions.iter().any(|(held, _)| *held == name) {
            return Err(McpError::InvalidArguments(format!(
                "a session named '{name}' is already held"
            )));
        }
        tracing::debug!(session = %name, position = self.sessions.len(), "Acquired");
        self.sessions.push((name, session));
        Ok(())
    }

    /// Session names in acquisition order.
    pub fn names(&self) -> Vec<&str> {
        self.sessions.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut S> {
        self.sessions
            .iter_mut()
            .find(|(held, _)| held == name)
            .map(|(_, session)| session)
    }

    /// List one kind on every session concurrently. Results are in
    /// acquisition order.
    pub async fn list_all(
        &mut self,
        kind: CapabilityKind,
    ) -> Vec<(String, McpResult<Vec<CapabilityDescriptor>>)> {
        let calls = self.sessions.iter_mut().map(|(name, session)| async move {
            let result = session.list(kind).await;
            (name.clone(), result)
        });
        join_all(calls).await
    }

    /// Run `(session, request)` pairs. Sessions run concurrently; each
    /// session's requests run in the order given. Results come back in
    /// request order.
    pub async fn invoke_all(
        &mut self,
        requests: &[(String, InvocationRequest)],
    ) -> Vec<(CapabilityKey, McpResult<Vec<ContentItem>>)> {
        let calls = self.sessions.iter_mut().map(|(name, session)| {
            let batch: Vec<(usize, &InvocationRequest)> = requests
                .iter()
                .enumerate()
                .filter(|(_, (target, _))| target.as_str() == name.as_str())
                .map(|(i, (_, request))| (i, request))
                .collect();
            async move {
                let mut results = Vec::with_capacity(batch.len());
                for (i, request) in batch {
                    results.push((i, session.invoke(request).await));
                }
                results
            }
        });

        let mut slots: Vec<Option<McpResult<Vec<ContentItem>>>> =
            requests.iter().map(|_| None).collect();
        for (i, result) in join_all(calls).await.into_iter().flatten() {
            slots[i] = Some(result);
        }

        requests
            .iter()
            .zip(slots)
            .map(|((target, request), slot)| {
                let key = CapabilityKey {
                    session: target.clone(),
                    identifier: request.identifier.clone(),
                };
                let result = slot.unwrap_or_else(|| {
                    Err(McpError::InvalidArguments(format!(
                        "no session named '{target}'"
                    )))
                });
                (key, result)
            })
            .collect()
    }

    /// Close every session, newest first. A failure does not stop the rest.
    pub async fn close_all(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        while let Some((name, mut session)) = self.sessions.pop() {
            if let Err(source) = session.close().await {
                tracing::warn!(session = %name, "Close failed: {source}");
                report.failures.push(TeardownError {
                    session: name.clone(),
                    source,
                });
            }
            tracing::debug!(session = %name, "Released");
            report.order.push(name);
        }
        report
    }
}

impl<S: ManagedSession> Drop for Orchestrator<S> {
    fn drop(&mut self) {
        // Vec drops front to back; pop to release newest first.
        while let Some((name, session)) = self.sessions.pop() {
            tracing::debug!(session = %name, "Released on drop");
            drop(session);
        }
    }
}
