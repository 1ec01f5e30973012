#[tokio::main]
async fn main() -> anyhow::Result<()> {
    study_assistant_backend::run().await
}
