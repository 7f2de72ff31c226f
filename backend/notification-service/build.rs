fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=../proto/services/notification_service.proto");

    // Server stubs for the service, client stubs for the demo binary and integration tests
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &["../proto/services/notification_service.proto"],
            &["../proto/services"],
        )?;

    Ok(())
}
