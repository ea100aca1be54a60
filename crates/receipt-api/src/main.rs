use receipt_core::Settings;

// Use mimalloc as the global allocator, mostly for musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load settings once; they are never mutated afterwards
    let settings = Settings::from_env()?;

    let (_state, router) = receipt_api::setup::initialize_app(settings.clone()).await?;

    receipt_api::setup::server::start_server(&settings, router).await?;

    Ok(())
}
