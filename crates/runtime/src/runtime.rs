//! High-level runtime orchestrator.
//!
//! The runtime owns the [`CombatManager`] and its background tick task, and
//! exposes a builder-based API for servers to embed the combat system.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use combat_core::{CombatConfig, TargetingPolicy};

use crate::api::{FleeHandler, NarrationSink, Result, RuntimeError, TracingSink};
use crate::clock::Clock;
use crate::events::{Event, EventBus, Topic};
use crate::manager::CombatManager;
use crate::oracle::OracleManager;
use crate::scheduler::TickScheduler;

/// Runtime configuration shared across the orchestrator and the tick task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    /// How often the scheduler ticks every encounter.
    pub tick_interval_ms: u64,
    pub event_buffer_size: usize,
    /// Fixed master seed for reproducible sessions; `None` draws fresh
    /// entropy per encounter.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            tick_interval_ms: 500,
            event_buffer_size: 100,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(RuntimeError::InvalidConfig(
                "tick_interval_ms must be positive".into(),
            ));
        }
        if self.combat.round_duration_ms == 0 {
            return Err(RuntimeError::InvalidConfig(
                "combat.round_duration_ms must be positive".into(),
            ));
        }
        if self.event_buffer_size == 0 {
            return Err(RuntimeError::InvalidConfig(
                "event_buffer_size must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Embedded combat system: the manager plus its tick task.
///
/// Ticking starts on [`Runtime::start`]; until then encounters only advance
/// through explicit [`CombatManager::tick`] calls.
pub struct Runtime {
    manager: Arc<CombatManager>,
    tick_interval: Duration,
    scheduler: Option<TickScheduler>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Shared manager for input handlers (attack commands, queries).
    pub fn manager(&self) -> Arc<CombatManager> {
        Arc::clone(&self.manager)
    }

    /// Spawns the tick task. Calling it again while running is a no-op.
    pub fn start(&mut self) {
        if self.scheduler.as_ref().is_some_and(TickScheduler::is_running) {
            return;
        }
        self.scheduler = Some(TickScheduler::spawn(
            Arc::clone(&self.manager),
            self.tick_interval,
        ));
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.as_ref().is_some_and(TickScheduler::is_running)
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.manager.events().subscribe(topic)
    }

    /// Stops ticking, then ends every encounter still registered.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.shutdown().await?;
        }
        self.manager.shutdown();
        Ok(())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("manager", &self.manager)
            .field("tick_interval", &self.tick_interval)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Builder for [`Runtime`] with flexible configuration.
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleManager>,
    sink: Option<Arc<dyn NarrationSink>>,
    flee_handler: Option<Arc<dyn FleeHandler>>,
    clock: Option<Arc<dyn Clock>>,
    targeting: Option<TargetingPolicy>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Skill, equipment and character stores. Defaults to the in-memory ones.
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Where combat text goes. Defaults to [`TracingSink`].
    pub fn sink(mut self, sink: Arc<dyn NarrationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn flee_handler(mut self, flee_handler: Arc<dyn FleeHandler>) -> Self {
        self.flee_handler = Some(flee_handler);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn targeting(mut self, targeting: TargetingPolicy) -> Self {
        self.targeting = Some(targeting);
        self
    }

    /// Build the runtime. The tick task is not started.
    pub fn build(self) -> Result<Runtime> {
        self.config.validate()?;

        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        let mut manager = CombatManager::new(
            self.config.combat,
            self.oracles.unwrap_or_default(),
            sink,
        )
        .with_event_bus(EventBus::with_capacity(self.config.event_buffer_size))
        .with_seed(self.config.seed);

        if let Some(flee_handler) = self.flee_handler {
            manager = manager.with_flee_handler(flee_handler);
        }
        if let Some(clock) = self.clock {
            manager = manager.with_clock(clock);
        }
        if let Some(targeting) = self.targeting {
            manager = manager.with_targeting(targeting);
        }

        tracing::debug!(
            tick_interval_ms = self.config.tick_interval_ms,
            round_duration_ms = self.config.combat.round_duration_ms,
            "combat runtime built"
        );
        Ok(Runtime {
            manager: Arc::new(manager),
            tick_interval: self.config.tick_interval(),
            scheduler: None,
        })
    }
}
