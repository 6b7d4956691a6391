#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    courier::cli::run().await
}
