//! Watermark Inpaint CLI Tool
//!
//! Command-line interface for removing bottom-right watermarks from images
//! using the watermark-inpaint library and an ONNX inpainting model.

#[cfg(feature = "cli")]
use watermark_inpaint::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
