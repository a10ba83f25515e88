use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_EFFECT: &str = "TwinkleFox";
pub const DEFAULT_PALETTE: &str = "C9";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct ParseError(String);

impl ::std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ::std::error::Error for ParseError {}

// Create enum with Display (quoted strings) and case-insensitive FromStr
macro_rules! enum_str {
    ($(#[$meta:meta])* $name:ident: $($variant:ident -> $val:literal),* $(,)?) => {

        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $val)] $variant),*
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                match *self {
                    $($name::$variant => f.write_str($val),)+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(_ if s.eq_ignore_ascii_case(stringify!($variant))
                        || s.eq_ignore_ascii_case($val) => Ok($name::$variant),)+
                    _ => Err(ParseError(format!(
                        "Could not parse {} \n Valid values:{}",
                        s,
                        $name::variants().iter().fold(String::new(), |a, i| a + " " + *i)
                    ))),
                }
            }
        }

        impl $name {
            #[allow(dead_code)]
            pub fn variants() -> Vec<&'static str> {
                vec![
                    $($val,)+
                ]
            }
        }
    };
}

enum_str!(
    /// What to do when the effect or palette name is not on the device.
    OnUnresolvable:
    Error -> "error",
    TurnOff -> "turnOff",
);

impl Default for OnUnresolvable {
    fn default() -> Self {
        OnUnresolvable::Error
    }
}

/// Parameters of [`Controller::apply_effect`](crate::Controller::apply_effect)
/// and [`Controller::ensure_effect`](crate::Controller::ensure_effect).
///
/// # Example
/// ```
/// # use wled::ApplyOptions;
/// let opts = ApplyOptions::palette("Custom Multi")
///     .with_brightness(300)
///     .with_transition(500);
///
/// assert_eq!(opts.effect, "TwinkleFox");
/// assert_eq!(opts.fallback_palette.as_deref(), Some("C9"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    pub effect: String,
    pub palette: String,
    /// Clamped to `1..=255` before being sent.
    pub brightness: i64,
    pub segment_id: u32,
    pub transition_ms: u32,
    /// Used when `palette` is not on the device. `None` or empty disables it.
    pub fallback_palette: Option<String>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        ApplyOptions {
            effect: DEFAULT_EFFECT.to_string(),
            palette: DEFAULT_PALETTE.to_string(),
            brightness: 200,
            segment_id: 0,
            transition_ms: 700,
            fallback_palette: Some(DEFAULT_PALETTE.to_string()),
        }
    }
}

impl ApplyOptions {
    pub fn palette(name: impl Into<String>) -> Self {
        ApplyOptions {
            palette: name.into(),
            ..Default::default()
        }
    }

    pub fn with_brightness(mut self, brightness: i64) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_segment(mut self, segment_id: u32) -> Self {
        self.segment_id = segment_id;
        self
    }

    pub fn with_transition(mut self, transition_ms: u32) -> Self {
        self.transition_ms = transition_ms;
        self
    }

    pub fn with_fallback(mut self, fallback: Option<String>) -> Self {
        self.fallback_palette = fallback;
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = effect.into();
        self
    }
}

/// Controller settings, as found in a YAML config file.
///
/// ```yaml
/// host: http://wled.local
/// timeout_secs: 3
/// on_unresolvable: turnOff
/// apply:
///   palette: Custom Multi
///   brightness: 180
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub host: String,
    pub timeout_secs: f64,
    pub on_unresolvable: OnUnresolvable,
    pub apply: ApplyOptions,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            host: String::new(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            on_unresolvable: OnUnresolvable::default(),
            apply: ApplyOptions::default(),
        }
    }
}

impl ControllerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        ControllerConfig {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Per-request timeout. Falls back to 3s for negative or non-finite values.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs).unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn from_yaml(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }
}
