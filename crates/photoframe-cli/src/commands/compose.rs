//! Frame a photo and save the PNG.

use std::path::PathBuf;

use anyhow::Context;
use photoframe_core::config::CampaignConfig;
use photoframe_core::editor::Controller;
use photoframe_core::export::{lock, shared, DirectorySink, ExportPipeline, ExportReceipt, FrameFile};
use photoframe_core::MaskMode;

use crate::CropArgs;

pub struct ComposeOptions {
    pub photo: PathBuf,
    pub frame: Option<PathBuf>,
    pub circle: bool,
    pub out_dir: PathBuf,
    pub crop: CropArgs,
}

pub async fn run(campaign: CampaignConfig, options: ComposeOptions) -> anyhow::Result<()> {
    let receipt = compose(campaign, options).await?;
    println!("Saved {} ({} bytes)", receipt.location, receipt.byte_len);
    Ok(())
}

async fn compose(
    mut campaign: CampaignConfig,
    options: ComposeOptions,
) -> anyhow::Result<ExportReceipt> {
    if let Some(frame) = options.frame {
        campaign.frame_path = frame;
    }
    let frame = FrameFile::new(campaign.frame_path.clone());

    let bytes = tokio::fs::read(&options.photo)
        .await
        .with_context(|| format!("Failed to read photo {}", options.photo.display()))?;

    let editor = shared(Controller::new(campaign)?);
    {
        let mut controller = lock(&editor);
        controller
            .select_image(&bytes)
            .with_context(|| format!("Failed to load photo {}", options.photo.display()))?;
        for event in options.crop.events() {
            controller.apply(&event)?;
        }
        if options.circle {
            controller.set_mask(MaskMode::Circle)?;
        }
        tracing::debug!(crop = ?controller.crop(), mask = ?controller.mask(), "Edit ready");
    }

    let pipeline = ExportPipeline::new(frame, DirectorySink::new(options.out_dir));
    let receipt = pipeline.run(&editor).await?;
    Ok(receipt)
}
