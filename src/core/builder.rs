use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::{
    core::Config,
    error::ConfigError,
    events::Bus,
    game::{Catalog, PlayerId},
    publishers::{LogPublisher, Publish},
    subscribers::Subscribe,
    workers::{Chooser, RandomChooser, seeded_rng},
};

use super::{alive::AliveTracker, shutdown::ShutdownHandle, supervisor::Supervisor};

/// Creates the answer strategy for one player.
pub type ChooserFactory = Box<dyn Fn(PlayerId) -> Box<dyn Chooser> + Send + Sync>;

/// Builder for constructing a [`Supervisor`].
///
/// Everything except the [`Config`] is optional:
/// - catalog defaults to [`Catalog::default`] (three questions)
/// - publisher defaults to [`LogPublisher`] on stdout
/// - players answer with a [`RandomChooser`] seeded from `Config::seed`
pub struct SupervisorBuilder {
    cfg: Config,
    catalog: Catalog,
    subscribers: Vec<Arc<dyn Subscribe>>,
    publisher: Option<Arc<dyn Publish>>,
    chooser: Option<ChooserFactory>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            catalog: Catalog::default(),
            subscribers: Vec::new(),
            publisher: None,
            chooser: None,
        }
    }

    /// Replaces the question catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive runtime events (worker lifecycle, rounds, answers,
    /// snapshots) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the snapshot sink.
    pub fn with_publisher(mut self, publisher: Arc<dyn Publish>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Sets how each player picks its answers.
    pub fn with_chooser<F>(mut self, factory: F) -> Self
    where
        F: Fn(PlayerId) -> Box<dyn Chooser> + Send + Sync + 'static,
    {
        self.chooser = Some(Box::new(factory));
        self
    }

    /// Validates the configuration and returns the Supervisor.
    ///
    /// Nothing is spawned here; workers start in [`Supervisor::run`].
    pub fn build(self) -> Result<Supervisor, ConfigError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let shutdown = ShutdownHandle::new(tokio_util::sync::CancellationToken::new(), bus.clone());
        let publisher: Arc<dyn Publish> = match self.publisher {
            Some(publisher) => publisher,
            None => Arc::new(LogPublisher::stdout()),
        };
        let seed = self.cfg.seed;
        let chooser: ChooserFactory = match self.chooser {
            Some(factory) => factory,
            None => Box::new(move |id: PlayerId| -> Box<dyn Chooser> {
                Box::new(RandomChooser::new(seeded_rng(seed, u64::from(id.get()))))
            }),
        };

        Ok(Supervisor {
            cfg: self.cfg,
            catalog: self.catalog,
            bus,
            subscribers: Mutex::new(self.subscribers),
            publisher,
            chooser,
            alive: Arc::new(AliveTracker::new()),
            shutdown,
            started: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn zero_interval_fails_the_build() {
        let cfg = Config {
            interval: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(
            SupervisorBuilder::new(cfg).build().err(),
            Some(ConfigError::ZeroInterval)
        );
    }

    #[test]
    fn defaults_build_without_a_runtime() {
        let sup = SupervisorBuilder::new(Config::default()).build().unwrap();
        assert_eq!(sup.config().players, 5);
        assert!(!sup.shutdown_handle().is_triggered());
    }
}
