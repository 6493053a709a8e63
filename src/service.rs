//! `envoy.service.auth.v3.Authorization` endpoint.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Instant};

use authz_auth::RequestHeaders;
use authz_grpc_proto::{Authorization, CheckRequest, CheckResponse};
use futures::FutureExt;
use tonic::{Request, Response, Status};
use tracing::{error, info, warn};

use crate::{
    decision::{AuthResult, DecisionEngine, FailureReason},
    response::{denied, ResponseBuilder},
    telemetry,
};

/// Check handler shared by every in-flight RPC
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    engine: DecisionEngine,
    responses: ResponseBuilder,
}

impl AuthorizationService {
    pub fn new(engine: DecisionEngine, responses: ResponseBuilder) -> Self {
        Self {
            inner: Arc::new(Inner { engine, responses }),
        }
    }

    /// Run the pipeline for one request's headers and path. A panic anywhere
    /// inside it becomes an `InternalError` deny instead of tearing down the
    /// connection.
    pub async fn authorize(
        &self,
        headers: &RequestHeaders,
        path: &str,
    ) -> (AuthResult, CheckResponse) {
        let pipeline = async {
            let result = self.inner.engine.evaluate(headers).await;
            let response = self.inner.responses.build(&result, path);
            (result, response)
        };

        match AssertUnwindSafe(pipeline).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                error!(
                    path,
                    panic = panic_message(&*panic),
                    "authorization pipeline panicked"
                );
                let reason = FailureReason::InternalError;
                (AuthResult::deny(reason), denied(reason))
            }
        }
    }
}

#[tonic::async_trait]
impl Authorization for AuthorizationService {
    async fn check(
        &self,
        request: Request<CheckRequest>,
    ) -> Result<Response<CheckResponse>, Status> {
        let started = Instant::now();
        let http = request
            .into_inner()
            .attributes
            .and_then(|attributes| attributes.request)
            .and_then(|request| request.http)
            .unwrap_or_default();
        let path = http.path;
        let headers = RequestHeaders::from(http.headers);

        let (result, response) = self.authorize(&headers, &path).await;
        let elapsed = started.elapsed();
        let latency_us = elapsed.as_micros() as u64;

        match &result {
            AuthResult::Allow { tenant } => {
                info!(tenant = %tenant, path = %path, latency_us, "auth successful");
            }
            AuthResult::Deny { reason } => {
                warn!(reason = reason.as_str(), path = %path, latency_us, "auth denied");
            }
        }
        telemetry::record_check(result.outcome_label(), elapsed);

        Ok(Response::new(response))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
