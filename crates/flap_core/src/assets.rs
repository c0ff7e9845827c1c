//! The five images the game draws, decoded once at startup.

use image::RgbaImage;
use std::path::Path;

pub const DEFAULT_ASSET_DIR: &str = "assets/images";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageId {
    Background,
    PipeEnd,
    PipeBody,
    BirdWingUp,
    BirdWingDown,
}

impl ImageId {
    pub const ALL: [ImageId; 5] = [
        ImageId::Background,
        ImageId::PipeEnd,
        ImageId::PipeBody,
        ImageId::BirdWingUp,
        ImageId::BirdWingDown,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ImageId::Background => "background.png",
            ImageId::PipeEnd => "pipe_end.png",
            ImageId::PipeBody => "pipe_body.png",
            ImageId::BirdWingUp => "bird_wing_up.png",
            ImageId::BirdWingDown => "bird_wing_down.png",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageId::Background => "background",
            ImageId::PipeEnd => "pipe-end",
            ImageId::PipeBody => "pipe-body",
            ImageId::BirdWingUp => "bird-wingup",
            ImageId::BirdWingDown => "bird-wingdown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetSet {
    background: RgbaImage,
    pipe_end: RgbaImage,
    pipe_body: RgbaImage,
    bird_wing_up: RgbaImage,
    bird_wing_down: RgbaImage,
}

impl AssetSet {
    pub fn from_images(
        background: RgbaImage,
        pipe_end: RgbaImage,
        pipe_body: RgbaImage,
        bird_wing_up: RgbaImage,
        bird_wing_down: RgbaImage,
    ) -> Self {
        Self {
            background,
            pipe_end,
            pipe_body,
            bird_wing_up,
            bird_wing_down,
        }
    }

    pub fn get(&self, id: ImageId) -> &RgbaImage {
        match id {
            ImageId::Background => &self.background,
            ImageId::PipeEnd => &self.pipe_end,
            ImageId::PipeBody => &self.pipe_body,
            ImageId::BirdWingUp => &self.bird_wing_up,
            ImageId::BirdWingDown => &self.bird_wing_down,
        }
    }

    pub fn size(&self, id: ImageId) -> (u32, u32) {
        self.get(id).dimensions()
    }
}

pub fn load_assets_from_dir(dir: &Path) -> Result<AssetSet, String> {
    let load = |id: ImageId| -> Result<RgbaImage, String> {
        let path = dir.join(id.file_name());
        let img = image::open(&path)
            .map_err(|e| format!("Failed to load image '{}': {e}", path.display()))?
            .to_rgba8();
        if img.width() == 0 || img.height() == 0 {
            return Err(format!("Image '{}' is empty", path.display()));
        }
        log::debug!(
            "Loaded {} ({}x{}) from {}",
            id.label(),
            img.width(),
            img.height(),
            path.display()
        );
        Ok(img)
    };

    Ok(AssetSet::from_images(
        load(ImageId::Background)?,
        load(ImageId::PipeEnd)?,
        load(ImageId::PipeBody)?,
        load(ImageId::BirdWingUp)?,
        load(ImageId::BirdWingDown)?,
    ))
}
