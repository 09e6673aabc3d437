//! Remote aggregate proxy boundary.
//!
//! Workflow actions reach other services by following named link relations
//! attached to events and aggregates: start from a link, follow relations
//! (optionally down to a `commands` sub-relation), and either read the
//! target representation or execute a command against it. This trait models that traversal explicitly; no
//! particular transport or content negotiation is assumed.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::Link;
use thiserror::Error;

/// Errors from remote resource traversal.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Nothing resolves at the link's locator.
    #[error("No resource at '{href}'")]
    ResourceNotFound { href: String },

    /// The resource exists but does not expose the requested relation.
    #[error("Relation '{rel}' not found from '{href}'")]
    RelationNotFound { href: String, rel: String },

    /// The remote command executed and was refused.
    #[error("Remote command '{command}' rejected: {reason}")]
    CommandRejected { command: String, reason: String },

    /// The call never completed.
    #[error("Remote call failed: {0}")]
    Transport(String),
}

/// Resolves links to remote aggregates and invokes commands on them.
#[async_trait]
pub trait RemoteAggregateProxy: Send + Sync {
    /// Follows the named relations from a starting link and returns the
    /// target resource's representation.
    async fn follow(&self, link: &Link, rels: &[&str]) -> Result<serde_json::Value, RemoteError>;

    /// Follows the named relations to a command resource and executes it
    /// with the given parameters, returning the remote aggregate's
    /// resulting representation.
    async fn execute(
        &self,
        link: &Link,
        rels: &[&str],
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RemoteError>;
}

/// One recorded call against the in-memory proxy.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub href: String,
    pub rels: Vec<String>,
    pub params: Option<serde_json::Value>,
}

#[derive(Default)]
struct ProxyState {
    resources: HashMap<String, serde_json::Value>,
    failing_commands: HashMap<String, String>,
    calls: Vec<RecordedCall>,
}

/// Programmable in-memory proxy for tests and local runs.
///
/// Representations are registered per `(href, relation path)`; commands can
/// be made to fail by name. Every traversal is recorded so tests can assert
/// that a saga step's remote call happened exactly once.
#[derive(Clone, Default)]
pub struct InMemoryRemoteProxy {
    state: Arc<RwLock<ProxyState>>,
}

impl InMemoryRemoteProxy {
    /// Creates an empty proxy.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(href: &str, rels: &[&str]) -> String {
        let mut key = href.to_string();
        for rel in rels {
            key.push('#');
            key.push_str(rel);
        }
        key
    }

    /// Registers the representation returned when following `rels` from
    /// `href`.
    pub fn register(&self, href: &str, rels: &[&str], representation: serde_json::Value) {
        let mut state = self.state.write().unwrap();
        state.resources.insert(Self::key(href, rels), representation);
    }

    /// Makes the named command fail with the given reason until cleared.
    pub fn fail_command(&self, command: &str, reason: &str) {
        let mut state = self.state.write().unwrap();
        state
            .failing_commands
            .insert(command.to_string(), reason.to_string());
    }

    /// Clears a failure injection.
    pub fn clear_failure(&self, command: &str) {
        self.state.write().unwrap().failing_commands.remove(command);
    }

    /// Returns every recorded call.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Returns how many times a command was executed (counted by the last
    /// relation in the traversal).
    pub fn command_count(&self, command: &str) -> usize {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.params.is_some() && call.rels.last().map(String::as_str) == Some(command))
            .count()
    }

    fn record(&self, link: &Link, rels: &[&str], params: Option<serde_json::Value>) {
        self.state.write().unwrap().calls.push(RecordedCall {
            href: link.href.clone(),
            rels: rels.iter().map(|r| r.to_string()).collect(),
            params,
        });
    }
}

#[async_trait]
impl RemoteAggregateProxy for InMemoryRemoteProxy {
    async fn follow(&self, link: &Link, rels: &[&str]) -> Result<serde_json::Value, RemoteError> {
        self.record(link, rels, None);

        let state = self.state.read().unwrap();
        state
            .resources
            .get(&Self::key(&link.href, rels))
            .cloned()
            .ok_or_else(|| RemoteError::RelationNotFound {
                href: link.href.clone(),
                rel: rels.last().unwrap_or(&"self").to_string(),
            })
    }

    async fn execute(
        &self,
        link: &Link,
        rels: &[&str],
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RemoteError> {
        self.record(link, rels, Some(params));

        let command = rels.last().copied().unwrap_or("self").to_string();
        let state = self.state.read().unwrap();
        if let Some(reason) = state.failing_commands.get(&command) {
            return Err(RemoteError::CommandRejected {
                command,
                reason: reason.clone(),
            });
        }

        // Commands without a programmed response return an empty body.
        Ok(state
            .resources
            .get(&Self::key(&link.href, rels))
            .cloned()
            .unwrap_or_else(|| serde_json::json!({})))
    }
}
