use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    bb7::cli::run().await
}
