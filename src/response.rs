//! Maps an `AuthResult` onto the ext_authz `CheckResponse`.

use authz_grpc_proto::{
    CheckResponse, DeniedHttpResponse, HeaderAppendAction, HeaderValue, HeaderValueOption,
    HttpResponse, HttpStatus, OkHttpResponse, RpcStatus, StatusCode,
};
use credential_store::TenantId;
use tonic::Code;

use crate::{
    config::HeaderPolicyConfig,
    decision::{AuthResult, FailureReason},
};

/// Builds check responses according to the configured header policy.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    policy: HeaderPolicyConfig,
}

impl ResponseBuilder {
    pub fn new(policy: HeaderPolicyConfig) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &HeaderPolicyConfig {
        &self.policy
    }

    pub fn build(&self, result: &AuthResult, path: &str) -> CheckResponse {
        match result {
            AuthResult::Allow { tenant } => self.allowed(tenant, path),
            AuthResult::Deny { reason } => denied(*reason),
        }
    }

    /// Header names that carry the tenant for `path`, deduplicated
    /// case-insensitively, rule headers first.
    pub fn tenant_headers_for(&self, path: &str) -> Vec<&str> {
        let matching = self
            .policy
            .rules
            .iter()
            .filter(|rule| path.starts_with(&rule.path_prefix))
            .flat_map(|rule| rule.headers.iter());

        let mut names: Vec<&str> = Vec::new();
        for name in matching.chain(&self.policy.always_headers) {
            if !names.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
                names.push(name.as_str());
            }
        }
        names
    }

    fn allowed(&self, tenant: &TenantId, path: &str) -> CheckResponse {
        let headers = self
            .tenant_headers_for(path)
            .into_iter()
            .map(|name| overwrite_header(name, tenant.as_str()))
            .collect();

        CheckResponse {
            status: Some(rpc_status(Code::Ok)),
            http_response: Some(HttpResponse::OkResponse(OkHttpResponse {
                headers,
                headers_to_remove: self.policy.headers_to_remove.clone(),
            })),
        }
    }
}

/// Deny with HTTP 401 and the reason's caller-facing message.
pub fn denied(reason: FailureReason) -> CheckResponse {
    CheckResponse {
        status: Some(rpc_status(Code::PermissionDenied)),
        http_response: Some(HttpResponse::DeniedResponse(DeniedHttpResponse {
            status: Some(HttpStatus {
                code: StatusCode::Unauthorized as i32,
            }),
            headers: Vec::new(),
            body: reason.message().to_string(),
        })),
    }
}

fn rpc_status(code: Code) -> RpcStatus {
    RpcStatus {
        code: code as i32,
        ..Default::default()
    }
}

// A client-supplied value for a tenant header must never survive.
fn overwrite_header(name: &str, value: &str) -> HeaderValueOption {
    HeaderValueOption {
        header: Some(HeaderValue {
            key: name.to_string(),
            value: value.to_string(),
            ..Default::default()
        }),
        append_action: HeaderAppendAction::OverwriteIfExistsOrAdd as i32,
        ..Default::default()
    }
}
