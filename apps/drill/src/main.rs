#[tokio::main]
async fn main() -> anyhow::Result<()> {
    study_drill::run().await
}
