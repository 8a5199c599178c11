#[tokio::main]
async fn main() -> anyhow::Result<()> {
    comfy_studio_lib::run().await
}
