pub mod assets;
pub mod bird;
pub mod collision;
pub mod config;
pub mod frame;
pub mod game;
pub mod input;
pub mod mask;
pub mod obstacle;
pub mod scoring;
pub mod session;
pub mod time;

#[cfg(test)]
mod replay;

pub use assets::{load_assets_from_dir, AssetSet, ImageId, DEFAULT_ASSET_DIR};
pub use config::{resolve_config, GameConfig, DEFAULT_CONFIG_PATH};
pub use frame::{DrawCommand, FrameDescription, RenderSink, Rgb, TextCommand, TextSize};
pub use game::{Game, Phase, TickOutcome};
pub use input::{collect_events, InputEvent, InputState, Key, LineSource, MouseBtn};
pub use time::FramePacer;
