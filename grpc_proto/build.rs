fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Rebuild triggers
    println!("cargo:rerun-if-changed=proto");

    // Server for the authz service itself, client for tests and tooling.
    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &[
                "proto/envoy/service/auth/v3/external_auth.proto",
                "proto/envoy/service/auth/v3/attribute_context.proto",
                "proto/envoy/config/core/v3/base.proto",
                "proto/envoy/type/v3/http_status.proto",
                "proto/google/rpc/status.proto",
            ],
            &["proto"],
        )?;

    Ok(())
}
