#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = item_store::run().await {
        eprintln!("item-store fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
