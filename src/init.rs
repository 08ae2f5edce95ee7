use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::layer::SinkLayer;
use crate::logger::Logger;

/// Configuration of the `tracing` bridge.
///
/// **Fields**
/// - `max_level`: most verbose `tracing` level forwarded; more verbose
///   events are dropped before any record is built.
/// - `include_target`: attach each event's target as a `target` field.
/// - `logger`: destination of the events. `None` forwards to the
///   process-wide logger in [`crate::global`], resolved per event.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub max_level: Level,
    pub include_target: bool,
    pub logger: Option<Logger>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_level: Level::TRACE,
            include_target: true,
            logger: None,
        }
    }
}

impl BridgeConfig {
    /// Layer described by this configuration, for callers composing their
    /// own subscriber.
    pub fn into_layer(self) -> SinkLayer {
        let layer = match self.logger {
            Some(logger) => SinkLayer::new(logger),
            None => SinkLayer::global(),
        };
        layer
            .with_max_level(self.max_level)
            .with_target(self.include_target)
    }
}

/// Install a [`Registry`] with a [`SinkLayer`] as the global default
/// `tracing` subscriber.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(config: BridgeConfig) -> Result<(), SetGlobalDefaultError> {
    let subscriber = Registry::default().with(config.into_layer());
    tracing::subscriber::set_global_default(subscriber)
}

/// Route all `tracing` events to the process-wide logger.
///
/// Equivalent to [`init_tracing_with_config`] with
/// [`BridgeConfig::default`].
pub fn init_tracing() -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(BridgeConfig::default())
}
