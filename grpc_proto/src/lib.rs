//! Envoy external authorization (ext_authz v3) protobuf bindings
//!
//! Module nesting mirrors the protobuf packages so that the cross-package
//! paths emitted by prost resolve.

#![allow(clippy::all, clippy::pedantic, missing_docs, unused_qualifications)]

pub mod envoy {
    pub mod config {
        pub mod core {
            pub mod v3 {
                tonic::include_proto!("envoy.config.core.v3");
            }
        }
    }

    pub mod r#type {
        pub mod v3 {
            tonic::include_proto!("envoy.r#type.v3");
        }
    }

    pub mod service {
        pub mod auth {
            pub mod v3 {
                tonic::include_proto!("envoy.service.auth.v3");
            }
        }
    }
}

pub mod google {
    pub mod rpc {
        tonic::include_proto!("google.rpc");
    }
}

// Re-export the types the authz service works with
pub use envoy::{
    config::core::v3::{header_value_option::HeaderAppendAction, HeaderValue, HeaderValueOption},
    r#type::v3::{HttpStatus, StatusCode},
    service::auth::v3::{
        attribute_context, authorization_client::AuthorizationClient,
        authorization_server::{Authorization, AuthorizationServer},
        check_response::HttpResponse, AttributeContext, CheckRequest, CheckResponse,
        DeniedHttpResponse, OkHttpResponse,
    },
};
pub use google::rpc::Status as RpcStatus;
