//! Runtime configuration: `config/ai.json` for the judge, `config/radar.toml`
//! for the service.

pub mod ai;
pub mod radar;

pub use ai::AiConfig;
pub use radar::RadarConfig;
