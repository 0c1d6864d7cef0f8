use clap::Parser;
use mushroom_prediction::model_download;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "download_model")]
#[command(about = "Download the mushroom scorer and check it is a real model file")]
struct Args {
    /// URL of the ONNX scorer export
    #[arg(short, long)]
    url: String,

    /// Where to write the model
    #[arg(short, long, default_value = "models/mushroom_cnn.onnx")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match model_download::download(&args.url, &args.output).await {
        Ok(_) => {
            tracing::info!("Model file at {:?} appears valid", args.output);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Model download failed: {}", e);
            Err(e.into())
        }
    }
}
