//! Print the region of a photo that an export would sample.

use photoframe_core::config::CampaignConfig;
use photoframe_core::editor::Viewport;
use photoframe_core::transform::{resolve, SampleRegion};

use crate::CropArgs;

pub fn run(campaign: &CampaignConfig, width: u32, height: u32, crop: CropArgs) -> anyhow::Result<()> {
    let region = region_for(campaign, width, height, crop)?;
    println!("{}", serde_json::to_string_pretty(&region)?);
    Ok(())
}

fn region_for(
    campaign: &CampaignConfig,
    width: u32,
    height: u32,
    crop: CropArgs,
) -> anyhow::Result<SampleRegion> {
    let viewport = Viewport {
        natural_width: width,
        natural_height: height,
        preview_size: campaign.preview_size,
    };
    let state = crop.to_crop(&viewport, &campaign.limits);
    tracing::debug!(?state, "Resolving");
    Ok(resolve(width, height, &state, &campaign.limits)?)
}
