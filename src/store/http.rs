//! Blocking HTTP client for the remote graph API.
//!
//! Every create is a single `POST` with a JSON body, answered by `201 Created`
//! and a JSON body carrying at least `id`. Any other status is logged with its
//! body and surfaced as [`StoreError::UnexpectedStatus`]; nothing is retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{GraphStore, StoreResult};
use crate::error::StoreError;
use crate::thing::{ObjectRef, ThingId};

/// The four create endpoints of the graph API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Resources,
    Literals,
    Predicates,
    Statements,
}

impl Endpoint {
    /// Path relative to the API base, with the trailing slash the API expects.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Resources => "/resources/",
            Endpoint::Literals => "/literals/",
            Endpoint::Predicates => "/predicates/",
            Endpoint::Statements => "/statements/",
        }
    }
}

#[derive(Serialize)]
struct LabelBody<'a> {
    label: &'a str,
}

#[derive(Serialize)]
struct StatementBody<'a> {
    subject_id: &'a ThingId,
    predicate_id: &'a ThingId,
    object: &'a ObjectRef,
}

#[derive(Deserialize)]
struct Created {
    id: ThingId,
    #[serde(default)]
    label: Option<String>,
}

/// Graph store backed by the remote REST API.
pub struct HttpStore {
    base_url: String,
    http: ureq::Agent,
    calls: usize,
}

impl HttpStore {
    /// Connect to an API rooted at `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// `timeout` of `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: builder.build(),
            calls: 0,
        }
    }

    /// The normalized API base.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<B: Serialize>(&mut self, endpoint: Endpoint, body: &B) -> StoreResult<Created> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        self.calls += 1;

        let resp = match self.http.post(&url).send_json(body) {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                return Err(unexpected_status(endpoint, status, resp));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(StoreError::Request {
                    endpoint: endpoint.path().into(),
                    message: transport.to_string(),
                });
            }
        };

        if resp.status() != 201 {
            let status = resp.status();
            return Err(unexpected_status(endpoint, status, resp));
        }

        resp.into_json().map_err(|e| StoreError::Response {
            endpoint: endpoint.path().into(),
            message: format!("failed to parse JSON: {e}"),
        })
    }
}

fn unexpected_status(endpoint: Endpoint, status: u16, resp: ureq::Response) -> StoreError {
    let body = resp.into_string().unwrap_or_default();
    tracing::warn!(endpoint = endpoint.path(), status, body = %body, "create call rejected");
    StoreError::UnexpectedStatus {
        endpoint: endpoint.path().into(),
        status,
        body,
    }
}

impl GraphStore for HttpStore {
    fn create_resource(&mut self, label: &str) -> StoreResult<ThingId> {
        Ok(self.post(Endpoint::Resources, &LabelBody { label })?.id)
    }

    fn create_literal(&mut self, label: &str) -> StoreResult<ThingId> {
        Ok(self.post(Endpoint::Literals, &LabelBody { label })?.id)
    }

    fn create_predicate(&mut self, label: &str) -> StoreResult<ThingId> {
        let created = self.post(Endpoint::Predicates, &LabelBody { label })?;
        if let Some(echoed) = created.label.as_deref().filter(|echoed| *echoed != label) {
            tracing::debug!(requested = label, echoed, "predicate label differs from request");
        }
        Ok(created.id)
    }

    fn create_statement(
        &mut self,
        subject: &ThingId,
        predicate: &ThingId,
        object: &ObjectRef,
    ) -> StoreResult<ThingId> {
        let body = StatementBody {
            subject_id: subject,
            predicate_id: predicate,
            object,
        };
        Ok(self.post(Endpoint::Statements, &body)?.id)
    }

    /// Requests issued so far, successful or not.
    fn call_count(&self) -> usize {
        self.calls
    }
}
