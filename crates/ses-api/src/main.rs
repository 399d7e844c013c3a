#[tokio::main]
async fn main() {
    if let Err(err) = ses_api::run().await {
        tracing::error!(error = %err, "ses-api failed");
        std::process::exit(1);
    }
}
