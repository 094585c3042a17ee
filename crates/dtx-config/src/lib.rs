// Play configuration (life, input gating, headless frame stepping)

pub mod play_config;

pub use play_config::PlayConfig;
