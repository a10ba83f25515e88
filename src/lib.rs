//! Keep a [WLED](https://kno.wled.ge) strip running a named effect and palette.
//!
//! WLED identifies effects and palettes by their position in the lists served
//! at `/json/effects` and `/json/palettes`. Those positions change between
//! firmware builds and custom palettes, so [`Controller`] always looks names up
//! again before writing `/json/state`.
//!
//! # Example
//! ```no_run
//! # async fn run() -> Result<(), wled::Error> {
//! use wled::{ApplyOptions, Controller, Ensured};
//!
//! let mut wled = Controller::new("wled.local");
//!
//! // Re-assert TwinkleFox with a custom palette (falls back to C9)
//! match wled.ensure_effect(&ApplyOptions::palette("Custom Multi")).await? {
//!     Ensured::Unchanged(_) => println!("already running"),
//!     Ensured::Updated(applied) => println!("device answered {}", applied.response()),
//! }
//! # Ok(())
//! # }
//! ```
mod catalog;
mod config;
mod error;
mod state;
mod transport;

use std::time::Duration;

use log::{debug, info, warn};
use serde_json::Value;

pub use catalog::clamp_brightness;
pub use config::{
    ApplyOptions, ControllerConfig, OnUnresolvable, ParseError, DEFAULT_EFFECT, DEFAULT_PALETTE,
    DEFAULT_TIMEOUT,
};
pub use error::{ConfigError, Error, NotFoundError, TransportError};
pub use state::{DeviceState, Segment, SegmentPayload, StatePayload};
pub use transport::{HttpTransport, Transport};

const EFFECTS_PATH: &str = "/json/effects";
const PALETTES_PATH: &str = "/json/palettes";
const STATE_PATH: &str = "/json/state";

/// Names used by the last successful write (or matching check).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastApplied {
    pub effect: String,
    pub palette: String,
}

/// Result of [`Controller::apply_effect`].
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The effect and palette were posted.
    Effect(Value),
    /// A name was missing and the policy is [`OnUnresolvable::TurnOff`],
    /// so `{"on": false}` was posted instead.
    TurnedOff(Value),
}

impl Applied {
    /// Device answer to the `POST /json/state`.
    pub fn response(&self) -> &Value {
        match self {
            Applied::Effect(response) | Applied::TurnedOff(response) => response,
        }
    }
}

/// Result of [`Controller::ensure_effect`].
#[derive(Debug, Clone, PartialEq)]
pub enum Ensured {
    /// The device already showed the effect, nothing was written.
    Unchanged(DeviceState),
    Updated(Applied),
}

impl Ensured {
    pub fn updated(&self) -> bool {
        matches!(self, Ensured::Updated(_))
    }
}

/// WLED device connection
///
/// Every operation performs its HTTP calls one after the other. Methods that
/// record the last applied names take `&mut self`, use one controller per task
/// if several tasks drive the same device.
pub struct Controller<T = HttpTransport> {
    base_url: String,
    transport: T,
    timeout: Duration,
    policy: OnUnresolvable,
    last_applied: Option<LastApplied>,
}

impl Controller<HttpTransport> {
    /// Controller using the default HTTP transport, a 3 second timeout and
    /// the [`OnUnresolvable::Error`] policy.
    ///
    /// `host` may be a full base URL (`http://10.0.0.7/`) or a bare host
    /// (`wled.local`), in which case `http://` is assumed.
    pub fn new(host: &str) -> Self {
        Self::with_transport(host, HttpTransport::new(), DEFAULT_TIMEOUT)
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::with_transport(&config.host, HttpTransport::new(), config.timeout())
            .on_unresolvable(config.on_unresolvable)
    }
}

impl<T: Transport> Controller<T> {
    pub fn with_transport(host: &str, transport: T, timeout: Duration) -> Self {
        Controller {
            base_url: base_url(host),
            transport,
            timeout,
            policy: OnUnresolvable::default(),
            last_applied: None,
        }
    }

    /// Select what happens when a name can not be resolved.
    pub fn on_unresolvable(mut self, policy: OnUnresolvable) -> Self {
        self.policy = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> OnUnresolvable {
        self.policy
    }

    pub fn last_applied(&self) -> Option<&LastApplied> {
        self.last_applied.as_ref()
    }

    pub fn last_effect_name(&self) -> Option<&str> {
        self.last_applied.as_ref().map(|l| l.effect.as_str())
    }

    pub fn last_palette_name(&self) -> Option<&str> {
        self.last_applied.as_ref().map(|l| l.palette.as_str())
    }

    /// Effect names, indexed by effect id.
    pub async fn effects(&self) -> Result<Vec<String>, TransportError> {
        self.catalog(EFFECTS_PATH).await
    }

    /// Palette names, indexed by palette id.
    pub async fn palettes(&self) -> Result<Vec<String>, TransportError> {
        self.catalog(PALETTES_PATH).await
    }

    /// Current device state, with the segment list normalized.
    pub async fn state(&self) -> Result<DeviceState, TransportError> {
        let url = self.url(STATE_PATH);
        let value = self.transport.get_json(&url, self.timeout).await?;
        DeviceState::from_json(&url, value)
    }

    /// Post `{"on": false}`.
    pub async fn turn_off(&self) -> Result<Value, TransportError> {
        self.post_state(&StatePayload::off()).await
    }

    /// Id of the first effect named `name`, ignoring case.
    pub async fn resolve_effect_id(&self, name: &str) -> Result<usize, Error> {
        let effects = self.effects().await?;
        let id = catalog::find_index(&effects, name).ok_or_else(|| NotFoundError::Effect {
            name: name.to_string(),
        })?;
        debug!("effect {} -> {}", name, id);
        Ok(id)
    }

    /// Id of palette `name`, or of `fallback` when `name` is missing.
    ///
    /// Returns the id together with the name that matched. Both lookups use the
    /// same palette list.
    pub async fn resolve_palette_id(
        &self,
        name: &str,
        fallback: Option<&str>,
    ) -> Result<(usize, String), Error> {
        let palettes = self.palettes().await?;

        if let Some(id) = catalog::find_index(&palettes, name) {
            debug!("palette {} -> {}", name, id);
            return Ok((id, name.to_string()));
        }

        if let Some(fallback) = fallback.filter(|f| !f.is_empty()) {
            if let Some(id) = catalog::find_index(&palettes, fallback) {
                warn!("palette {} not found, using {} ({})", name, fallback, id);
                return Ok((id, fallback.to_string()));
            }
        }

        Err(NotFoundError::Palette {
            name: name.to_string(),
            fallback: fallback.map(str::to_string),
        }
        .into())
    }

    /// Turn the device on with `opts.effect` and `opts.palette`.
    ///
    /// Names are resolved against freshly fetched lists. If one is missing the
    /// outcome depends on the policy: [`OnUnresolvable::Error`] returns
    /// [`Error::NotFound`] without writing anything, [`OnUnresolvable::TurnOff`]
    /// posts `{"on": false}` and returns [`Applied::TurnedOff`]. Transport
    /// errors are always returned.
    pub async fn apply_effect(&mut self, opts: &ApplyOptions) -> Result<Applied, Error> {
        let (effect_id, palette_id, palette) = match self.resolve(opts).await? {
            Some(resolved) => resolved,
            None => return Ok(Applied::TurnedOff(self.turn_off().await?)),
        };

        let payload = StatePayload::effect(
            clamp_brightness(opts.brightness),
            opts.transition_ms,
            opts.segment_id,
            effect_id,
            palette_id,
        );
        let response = self.post_state(&payload).await?;

        info!(
            "applied {} ({}) with palette {} ({}) on segment {}",
            opts.effect, effect_id, palette, palette_id, opts.segment_id
        );
        self.last_applied = Some(LastApplied {
            effect: opts.effect.clone(),
            palette,
        });
        Ok(Applied::Effect(response))
    }

    /// Like [`apply_effect`](Self::apply_effect), but only writes when the
    /// device is off or its segment shows another effect or palette.
    pub async fn ensure_effect(&mut self, opts: &ApplyOptions) -> Result<Ensured, Error> {
        let (effect_id, palette_id, palette) = match self.resolve(opts).await? {
            Some(resolved) => resolved,
            None => {
                return Ok(Ensured::Updated(Applied::TurnedOff(
                    self.turn_off().await?,
                )))
            }
        };

        let state = self.state().await?;

        if state.is_showing(opts.segment_id, effect_id, palette_id) {
            info!("{} with palette {} already running", opts.effect, palette);
            self.last_applied = Some(LastApplied {
                effect: opts.effect.clone(),
                palette,
            });
            return Ok(Ensured::Unchanged(state));
        }

        debug!("device drifted, re-applying {}", opts.effect);
        Ok(Ensured::Updated(self.apply_effect(opts).await?))
    }

    // Ok(None) means a name was missing and the device must be turned off.
    async fn resolve(&self, opts: &ApplyOptions) -> Result<Option<(usize, usize, String)>, Error> {
        let resolved = async {
            let effect_id = self.resolve_effect_id(&opts.effect).await?;
            let (palette_id, palette) = self
                .resolve_palette_id(&opts.palette, opts.fallback_palette.as_deref())
                .await?;
            Ok::<_, Error>((effect_id, palette_id, palette))
        }
        .await;

        match (resolved, self.policy) {
            (Ok(resolved), _) => Ok(Some(resolved)),
            (Err(Error::NotFound(e)), OnUnresolvable::TurnOff) => {
                warn!("{}, turning the device off", e);
                Ok(None)
            }
            (Err(e), _) => Err(e),
        }
    }

    async fn catalog(&self, path: &str) -> Result<Vec<String>, TransportError> {
        let url = self.url(path);
        let value = self.transport.get_json(&url, self.timeout).await?;
        catalog::parse(&url, value)
    }

    async fn post_state(&self, payload: &StatePayload) -> Result<Value, TransportError> {
        let url = self.url(STATE_PATH);
        self.transport
            .post_json(&url, &payload.to_json()?, self.timeout)
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}
