//! Allow/deny decision for a single check request.

use authz_auth::{extract_basic_credentials, CredentialError, LookupKey, RequestHeaders};
use credential_store::{LookupOutcome, StoreClient, TenantId};
use tracing::{debug, error};

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    MissingOrWrongScheme,
    BadEncoding,
    MalformedPayload,
    InvalidCredentials,
    InternalError,
}

impl FailureReason {
    /// Caller-facing deny body. Never carries store or stack detail.
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingOrWrongScheme => "basic auth required",
            Self::BadEncoding | Self::MalformedPayload => "invalid auth format",
            Self::InvalidCredentials => "invalid credentials",
            Self::InternalError => "internal error",
        }
    }

    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingOrWrongScheme => "missing_or_wrong_scheme",
            Self::BadEncoding => "bad_encoding",
            Self::MalformedPayload => "malformed_payload",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InternalError => "internal_error",
        }
    }
}

impl From<CredentialError> for FailureReason {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingOrWrongScheme => Self::MissingOrWrongScheme,
            CredentialError::BadEncoding => Self::BadEncoding,
            CredentialError::MalformedPayload => Self::MalformedPayload,
        }
    }
}

/// Outcome of evaluating one request. An allowed result always carries a
/// non-empty tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Allow { tenant: TenantId },
    Deny { reason: FailureReason },
}

impl AuthResult {
    pub fn deny(reason: FailureReason) -> Self {
        Self::Deny { reason }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn tenant(&self) -> Option<&TenantId> {
        match self {
            Self::Allow { tenant } => Some(tenant),
            Self::Deny { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Self::Allow { .. } => None,
            Self::Deny { reason } => Some(*reason),
        }
    }

    /// Label for logs and metrics: `allowed` or the failure label
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::Allow { .. } => "allowed",
            Self::Deny { reason } => reason.as_str(),
        }
    }
}

/// Stateless pipeline: extract credentials, derive the key, resolve it.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    store: StoreClient,
}

impl DecisionEngine {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    /// Evaluate the request headers with a single store attempt.
    pub async fn evaluate(&self, headers: &RequestHeaders) -> AuthResult {
        let key = match extract_basic_credentials(headers) {
            Ok(credentials) => LookupKey::from(&credentials),
            Err(e) => return AuthResult::deny(e.into()),
        };
        debug!(key_prefix = key.fingerprint(), "resolving lookup key");

        match self.store.lookup(key.as_str(), self.store.deadline()).await {
            LookupOutcome::Found(tenant) if tenant.is_empty() => {
                debug!(key_prefix = key.fingerprint(), "empty tenant id for key");
                error!("credential store holds an empty tenant id");
                AuthResult::deny(FailureReason::InternalError)
            }
            LookupOutcome::Found(tenant) => AuthResult::Allow { tenant },
            LookupOutcome::NotFound => AuthResult::deny(FailureReason::InvalidCredentials),
            LookupOutcome::Unavailable(_) => AuthResult::deny(FailureReason::InternalError),
        }
    }
}
