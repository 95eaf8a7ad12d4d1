//! HTTP API
//!
//! ## Routes
//!
//! - `GET /health`, `POST /user/login` - public
//! - `GET|POST /{resource}`, `GET|PUT|DELETE /{resource}/{id}` - bearer token
//! - `PUT /activities/active/{id}`, `PUT /budget-posts/active/{id}`,
//!   `PUT /budgets/approve/{id}` - status flags
//!
//! `{resource}` is one of `activities`, `budgets`, `budget-posts`,
//! `budget-caps`, `budget-details`, `budget-details-posts`,
//! `budget-details-posts-recommendations`, `fund-requests`,
//! `fund-request-details`.
//!
//! ## Example
//!
//! ```bash
//! TOKEN=$(curl -s -X POST localhost:8080/user/login \
//!     -d '{"userid":"finance","password":"secret"}' | jq -r .data.token)
//! curl -H "Authorization: Bearer $TOKEN" localhost:8080/budget-caps/5
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::extract_token_from_header;
use crate::db::StatusFlag;
use crate::error::{BackofficeError, Result};
use crate::integrity::EntityKind;
use crate::logging::{AuditLogger, RequestRecord};
use crate::services::{
    envelope_response, error_envelope, success_body, EntityService, HttpResponse, LoginRequest,
    Services,
};

/// Request header carrying the per-request job id
pub const JOB_ID_HEADER: &str = "jobid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusRoute {
    ActivityActive,
    BudgetPostActive,
    BudgetApprove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Health,
    Login,
    Collection(EntityKind),
    Item(EntityKind, &'a str),
    Status(StatusRoute, &'a str),
}

impl<'a> Route<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match segments.as_slice() {
            ["health"] => Some(Route::Health),
            ["user", "login"] => Some(Route::Login),
            ["activities", "active", id] => Some(Route::Status(StatusRoute::ActivityActive, *id)),
            ["budget-posts", "active", id] => Some(Route::Status(StatusRoute::BudgetPostActive, *id)),
            ["budgets", "approve", id] => Some(Route::Status(StatusRoute::BudgetApprove, *id)),
            [resource] => EntityKind::from_path_segment(resource).map(Route::Collection),
            [resource, id] => EntityKind::from_path_segment(resource).map(|kind| Route::Item(kind, *id)),
            _ => None,
        }
    }

    fn allows(&self, method: &Method) -> bool {
        match self {
            Route::Health => method == Method::GET,
            Route::Login => method == Method::POST,
            Route::Collection(_) => method == Method::GET || method == Method::POST,
            Route::Item(..) => {
                method == Method::GET || method == Method::PUT || method == Method::DELETE
            }
            Route::Status(..) => method == Method::PUT,
        }
    }

    fn is_public(&self) -> bool {
        matches!(self, Route::Health | Route::Login)
    }
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| BackofficeError::InvalidId(raw.to_string()))
}

fn set_status<E: StatusFlag>(service: &EntityService<E>, id: i64, body: &[u8]) -> Result<Value> {
    let value = EntityService::<E>::decode_status(body)?;
    let row = service.set_status(id, value)?;
    serde_json::to_value(row).map_err(|e| BackofficeError::Internal(format!("encode row: {}", e)))
}

/// HTTP server state
pub struct HttpServer {
    services: Arc<Services>,
    audit: AuditLogger,
    bind_addr: SocketAddr,
}

impl HttpServer {
    pub fn new(services: Arc<Services>, audit: AuditLogger, bind_addr: SocketAddr) -> Self {
        Self {
            services,
            audit,
            bind_addr,
        }
    }

    /// Run the HTTP server
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        info!(addr = %self.bind_addr, "HTTP server listening");

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let server = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { server.handle_request(req, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(addr = %remote_addr, error = %err, "Connection error");
                }
            });
        }
    }

    async fn handle_request(
        &self,
        req: Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> std::result::Result<HttpResponse, hyper::Error> {
        let (mut parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();
        let url = parts.uri.to_string();

        Ok(self
            .respond(&parts.method, &url, &mut parts.headers, Some(remote_addr), &body)
            .await)
    }

    /// Handle one fully-read request: assign a job id, dispatch, audit, wrap
    /// in the envelope.
    pub async fn respond(
        &self,
        method: &Method,
        url: &str,
        headers: &mut HeaderMap,
        remote_addr: Option<SocketAddr>,
        body: &[u8],
    ) -> HttpResponse {
        let job_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&job_id) {
            headers.insert(HeaderName::from_static(JOB_ID_HEADER), value);
        }

        let path = url.split('?').next().unwrap_or_default();
        debug!(method = %method, path = %path, job_id = %job_id, "Incoming request");

        let (status, envelope) = match self.dispatch(method, path, headers, body) {
            Ok((status, data)) => (status, success_body(data)),
            Err(err) => error_envelope(&err),
        };

        let record = RequestRecord::capture(method.as_str(), url, headers, remote_addr, body);
        self.audit.log_exchange(&record, &envelope).await;

        envelope_response(status, envelope, &job_id)
    }

    /// Route to a service call and return the `data` of a success envelope
    pub fn dispatch(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<(StatusCode, Value)> {
        let route = Route::parse(path).ok_or_else(|| BackofficeError::NotFound("Page Not found".into()))?;
        if !route.allows(method) {
            return Err(BackofficeError::MethodNotAllowed);
        }
        if !route.is_public() {
            self.authorize(headers)?;
        }

        let services = &self.services;
        let data = match route {
            Route::Health => json!({ "status": "ok" }),
            Route::Login => {
                let request: LoginRequest = serde_json::from_slice(body)?;
                let token = services.auth.login(&request)?;
                json!({ "token": token })
            }
            Route::Collection(kind) => {
                let resource = services.resource(kind);
                if method == Method::POST {
                    return Ok((StatusCode::CREATED, resource.create(body)?));
                }
                resource.list()?
            }
            Route::Item(kind, raw) => {
                let id = parse_id(raw)?;
                let resource = services.resource(kind);
                if method == Method::PUT {
                    resource.update(id, body)?
                } else if method == Method::DELETE {
                    resource.delete(id)?
                } else {
                    resource.get(id)?
                }
            }
            Route::Status(status, raw) => {
                let id = parse_id(raw)?;
                match status {
                    StatusRoute::ActivityActive => set_status(&services.activities, id, body)?,
                    StatusRoute::BudgetPostActive => set_status(&services.budget_posts, id, body)?,
                    StatusRoute::BudgetApprove => set_status(&services.budgets, id, body)?,
                }
            }
        };

        Ok((StatusCode::OK, data))
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        let header = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = extract_token_from_header(header)
            .ok_or_else(|| BackofficeError::Unauthorized("Authorization required".into()))?;

        let claims = self.services.auth.verify(token)?;
        debug!(userid = %claims.userid, "Authorized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_routes() {
        assert_eq!(Route::parse("/health"), Some(Route::Health));
        assert_eq!(Route::parse("/user/login"), Some(Route::Login));
        assert_eq!(
            Route::parse("/budget-caps"),
            Some(Route::Collection(EntityKind::BudgetCaps))
        );
        assert_eq!(
            Route::parse("/fund-request-details/12"),
            Some(Route::Item(EntityKind::FundRequestDetails, "12"))
        );
        assert_eq!(
            Route::parse("/budgets/approve/3"),
            Some(Route::Status(StatusRoute::BudgetApprove, "3"))
        );
        assert_eq!(Route::parse("/budget-caps/approve/3"), None);
        assert_eq!(Route::parse("/users"), None);
    }

    #[test]
    fn method_table() {
        let item = Route::Item(EntityKind::Budgets, "1");
        assert!(item.allows(&Method::DELETE));
        assert!(!item.allows(&Method::POST));
        assert!(!Route::Status(StatusRoute::ActivityActive, "1").allows(&Method::GET));
    }

    #[test]
    fn bad_id() {
        assert_eq!(parse_id("abc").unwrap_err().public_message(), "invalid ID");
        assert_eq!(parse_id("42").unwrap(), 42);
    }
}
