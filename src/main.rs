#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = saex_reports::run().await {
        eprintln!("saex-reports fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
