use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};

use crate::common::Contact;
use crate::config::SimulatorConfig;

use super::model::ProximityModel;

/// Drives a [`ProximityModel`] on a recurring tick and publishes the ranked
/// roster after every update.
///
/// The model lives inside the spawned task; consumers only ever see
/// snapshots through the watch channel, so no locking is needed. The tick
/// keeps running until [`stop`](Self::stop) is called.
pub struct ProximitySimulator {
    roster_rx: watch::Receiver<Vec<Contact>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ProximitySimulator {
    /// Starts the simulation with an entropy-seeded random source.
    pub fn start(config: &SimulatorConfig) -> Self {
        Self::start_with_rng(config, SmallRng::from_entropy())
    }

    /// Starts the simulation with a caller-provided random source, so tests
    /// can seed it and assert exact roster values.
    pub fn start_with_rng(config: &SimulatorConfig, rng: SmallRng) -> Self {
        let mut model = ProximityModel::new(config, rng);
        let (roster_tx, roster_rx) = watch::channel(model.ranked());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let tick = Duration::from_millis(config.tick_ms);
        let task = tokio::spawn(async move {
            // First perturbation lands one full period after start.
            let mut ticker = time::interval_at(Instant::now() + tick, tick);
            log::info!("Proximity simulation started ({} contacts)", model.len());

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    _ = ticker.tick() => {
                        model.tick();
                        if roster_tx.send(model.ranked()).is_err() {
                            log::debug!("All roster subscribers dropped");
                        }
                    }
                }
            }

            log::info!("Proximity simulation stopped");
        });

        Self {
            roster_rx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Latest published ranking, sorted by descending signal.
    pub fn ranked_contacts(&self) -> Vec<Contact> {
        self.roster_rx.borrow().clone()
    }

    /// Subscribes to ranking updates; one value per tick.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Contact>> {
        self.roster_rx.clone()
    }

    /// Stops the tick loop and waits for the task to exit.
    ///
    /// Idempotent; once this returns, no further tick will run.
    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                log::warn!("Simulation task ended abnormally: {err}");
            }
        }
    }
}

impl Drop for ProximitySimulator {
    fn drop(&mut self) {
        // Dropped without stop(): abort so no tick outlives the owner.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
