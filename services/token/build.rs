fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Server for the gRPC adapter, client for the client library
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/token_service.proto"], &["proto"])?;

    Ok(())
}
