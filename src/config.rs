use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub live: LiveConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Outbound (microphone) sample rate in Hz
    #[serde(default = "default_capture_rate")]
    pub capture_sample_rate: u32,
    /// Inbound (model speech) sample rate in Hz
    #[serde(default = "default_playback_rate")]
    pub playback_sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Samples per captured frame
    #[serde(default = "default_frame_samples")]
    pub frame_samples: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    /// Websocket endpoint of the hosted live-session service
    pub url: String,
    /// Model identifier requested at session setup
    pub model: String,
}

fn default_capture_rate() -> u32 {
    16_000
}

fn default_playback_rate() -> u32 {
    24_000
}

fn default_channels() -> u16 {
    1
}

fn default_frame_samples() -> usize {
    4096
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ARIA").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// The API key never lives in the config file; it is read from the
    /// environment at connect time.
    pub fn api_key() -> Option<String> {
        std::env::var("ARIA_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "aria-voice".to_string(),
                http: HttpConfig {
                    bind: "127.0.0.1".to_string(),
                    port: 8090,
                },
            },
            audio: AudioConfig {
                capture_sample_rate: default_capture_rate(),
                playback_sample_rate: default_playback_rate(),
                channels: default_channels(),
                frame_samples: default_frame_samples(),
            },
            live: LiveConfig {
                url: "wss://live.example.dev/v1/session".to_string(),
                model: "aria-live-1".to_string(),
            },
        }
    }
}
