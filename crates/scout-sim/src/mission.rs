//! Mission execution state machine.
//!
//! Advances a virtual drone leg-by-leg around the closed survey tour,
//! interpolating position on a frame tick and emitting telemetry frames.
//! All waiting happens on tokio timers; nothing blocks the control thread.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scout_core::geo::distance_m;
use scout_core::models::{Coordinate, Waypoint};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, Instant};

const TELEMETRY_CHANNEL_CAPACITY: usize = 256;

/// Simulation timing and flight parameters.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Animation frame interval.
    pub tick: Duration,
    /// Hold time at each waypoint after a leg completes.
    pub dwell: Duration,
    /// Settle time after the final return leg before resetting to idle.
    pub settle: Duration,
    /// Per-leg probability of an obstacle slowing the drone down.
    pub obstacle_probability: f64,
    /// Cruise speed on a clear leg, m/s.
    pub cruise_speed_mps: f64,
    /// Reduced speed on an obstacle leg, m/s.
    pub obstacle_speed_mps: f64,
    /// Fixed RNG seed for reproducible runs; random when absent.
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(16),
            dwell: Duration::from_millis(2000),
            settle: Duration::from_millis(2000),
            obstacle_probability: 0.10,
            cruise_speed_mps: 9.0,
            obstacle_speed_mps: 6.0,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionStatus {
    /// No active mission.
    Idle,
    /// Advancing leg-by-leg through the closed tour.
    Running,
    /// Final leg done; settling before the reset to idle.
    Completing,
    /// Cancellation observed; the partially traveled leg is abandoned.
    Cancelled,
}

/// Snapshot of the simulated vehicle. Mutated only by the mission task.
#[derive(Debug, Clone)]
pub struct MissionState {
    pub status: MissionStatus,
    pub current_leg: usize,
    pub distance_traveled_m: f64,
    pub battery_percent: f64,
    pub position: Option<Coordinate>,
}

impl Default for MissionState {
    fn default() -> Self {
        Self {
            status: MissionStatus::Idle,
            current_leg: 0,
            distance_traveled_m: 0.0,
            battery_percent: 100.0,
            position: None,
        }
    }
}

/// One animation frame of telemetry for the map marker and readouts.
#[derive(Debug, Clone)]
pub struct TelemetryFrame {
    pub position: Coordinate,
    pub speed_mps: f64,
    pub battery_percent: f64,
    pub leg: usize,
}

/// How a mission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MissionError {
    /// Start requested with no waypoints; rejected before any transition.
    #[error("cannot start a mission with no waypoints")]
    EmptyRoute,
    /// A mission is already in flight; at most one may run per simulator.
    #[error("a mission is already running")]
    AlreadyRunning,
}

/// Handle to an in-flight mission.
#[derive(Debug)]
pub struct MissionHandle {
    join: JoinHandle<MissionOutcome>,
}

impl MissionHandle {
    /// Wait for the mission task to finish. A panicked or aborted task is
    /// reported as cancelled.
    pub async fn wait(self) -> MissionOutcome {
        self.join.await.unwrap_or(MissionOutcome::Cancelled)
    }
}

/// Per-mission cancellation token. A fresh channel is created on every
/// start so a stale cancel can never leak into a later mission.
struct MissionControl {
    cancel_tx: watch::Sender<bool>,
}

pub struct MissionSimulator {
    cfg: SimConfig,
    state_tx: watch::Sender<MissionState>,
    telemetry_tx: broadcast::Sender<TelemetryFrame>,
    control: Mutex<Option<MissionControl>>,
}

impl MissionSimulator {
    pub fn new(cfg: SimConfig) -> Self {
        let (state_tx, _) = watch::channel(MissionState::default());
        let (telemetry_tx, _) = broadcast::channel(TELEMETRY_CHANNEL_CAPACITY);
        Self {
            cfg,
            state_tx,
            telemetry_tx,
            control: Mutex::new(None),
        }
    }

    /// Current vehicle state snapshot.
    pub fn state(&self) -> MissionState {
        self.state_tx.borrow().clone()
    }

    /// Watch state transitions (Idle/Running/Completing).
    pub fn watch_state(&self) -> watch::Receiver<MissionState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to per-frame telemetry.
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryFrame> {
        self.telemetry_tx.subscribe()
    }

    /// Start flying the given tour. The caller must have completed mission
    /// registration with the persistence API before calling this; the
    /// simulator itself never touches the network.
    pub fn start(
        self: &Arc<Self>,
        waypoints: Vec<Waypoint>,
    ) -> Result<MissionHandle, MissionError> {
        if waypoints.is_empty() {
            return Err(MissionError::EmptyRoute);
        }

        let cancel_rx = {
            let mut control = self.control.lock().expect("mission control lock poisoned");
            if control.is_some() {
                return Err(MissionError::AlreadyRunning);
            }
            let (cancel_tx, cancel_rx) = watch::channel(false);
            *control = Some(MissionControl { cancel_tx });
            cancel_rx
        };

        tracing::info!(waypoints = waypoints.len(), "Starting mission");
        let sim = Arc::clone(self);
        let join = tokio::spawn(async move { sim.run(waypoints, cancel_rx).await });
        Ok(MissionHandle { join })
    }

    /// Request cancellation of the in-flight mission, if any. Observed at
    /// the top of the next scheduled frame; no frame is produced after the
    /// token is seen.
    pub fn cancel(&self) {
        let control = self.control.lock().expect("mission control lock poisoned");
        if let Some(ctrl) = control.as_ref() {
            tracing::info!("Mission cancellation requested");
            let _ = ctrl.cancel_tx.send(true);
        }
    }

    async fn run(
        self: Arc<Self>,
        waypoints: Vec<Waypoint>,
        mut cancel: watch::Receiver<bool>,
    ) -> MissionOutcome {
        // Closed tour: the flown path returns to the first waypoint.
        let mut tour: Vec<Coordinate> = waypoints.iter().map(|wp| wp.coord.clone()).collect();
        let home = tour[0].clone();
        tour.push(home);

        let seed = self.cfg.rng_seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);

        self.state_tx.send_replace(MissionState {
            status: MissionStatus::Running,
            current_leg: 0,
            distance_traveled_m: 0.0,
            battery_percent: 100.0,
            position: Some(tour[0].clone()),
        });

        let mut traveled_m = 0.0;

        for leg in 0..tour.len() - 1 {
            let from = tour[leg].clone();
            let to = tour[leg + 1].clone();
            let distance = distance_m(&from, &to);

            let obstacle = rng.random_bool(self.cfg.obstacle_probability);
            let base = if obstacle {
                self.cfg.obstacle_speed_mps
            } else {
                self.cfg.cruise_speed_mps
            };
            let speed = base + rng.random_range(-0.5..0.5);
            let duration_s = distance / speed;
            tracing::debug!(leg, distance_m = distance, speed_mps = speed, obstacle, "Flying leg");

            let started = Instant::now();
            let mut ticker = interval(self.cfg.tick);
            ticker.tick().await; // first tick is immediate; it only arms the cadence

            loop {
                ticker.tick().await;

                if *cancel.borrow() {
                    return self.finish_cancelled();
                }

                let progress = if duration_s > 0.0 {
                    (started.elapsed().as_secs_f64() / duration_s).min(1.0)
                } else {
                    1.0
                };

                let position = Coordinate::new(
                    from.lat + (to.lat - from.lat) * progress,
                    from.lon + (to.lon - from.lon) * progress,
                );

                let battery = self.state_tx.borrow().battery_percent;
                let final_frame = progress >= 1.0;
                let readout = if final_frame {
                    0.0
                } else {
                    speed + rng.random_range(-0.1..0.1)
                };

                self.state_tx.send_modify(|state| {
                    state.position = Some(position.clone());
                });
                let _ = self.telemetry_tx.send(TelemetryFrame {
                    position,
                    speed_mps: readout,
                    battery_percent: battery,
                    leg,
                });

                if final_frame {
                    break;
                }
            }

            traveled_m += distance;
            // ~5% battery drop per 1000 m flown.
            let battery = (100.0 - traveled_m / 400.0).max(0.0);
            self.state_tx.send_modify(|state| {
                state.current_leg = leg + 1;
                state.distance_traveled_m = traveled_m;
                state.battery_percent = battery;
            });

            // Hold at the waypoint before the next leg, unless cancelled.
            if self.cancellable_sleep(self.cfg.dwell, &mut cancel).await {
                return self.finish_cancelled();
            }
        }

        self.state_tx.send_modify(|state| {
            state.status = MissionStatus::Completing;
        });
        tracing::info!(distance_m = traveled_m, "Tour complete, settling");

        if self.cancellable_sleep(self.cfg.settle, &mut cancel).await {
            return self.finish_cancelled();
        }

        self.reset_to_idle();
        tracing::info!("Mission complete");
        MissionOutcome::Completed
    }

    /// Sleep for `period` or until cancellation. Returns true when cancelled.
    async fn cancellable_sleep(
        &self,
        period: Duration,
        cancel: &mut watch::Receiver<bool>,
    ) -> bool {
        tokio::select! {
            changed = cancel.changed() => changed.is_ok() && *cancel.borrow(),
            _ = sleep(period) => false,
        }
    }

    fn finish_cancelled(&self) -> MissionOutcome {
        self.state_tx.send_modify(|state| {
            state.status = MissionStatus::Cancelled;
        });
        self.reset_to_idle();
        tracing::info!("Mission cancelled");
        MissionOutcome::Cancelled
    }

    /// Reset telemetry to initial values and release the single-mission slot.
    fn reset_to_idle(&self) {
        self.state_tx.send_replace(MissionState::default());
        let mut control = self.control.lock().expect("mission control lock poisoned");
        *control = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator() -> Arc<MissionSimulator> {
        // Short timings and a fixed seed keep the paused-clock tests fast
        // and reproducible.
        Arc::new(MissionSimulator::new(SimConfig {
            tick: Duration::from_millis(16),
            dwell: Duration::from_millis(50),
            settle: Duration::from_millis(50),
            rng_seed: Some(7),
            ..SimConfig::default()
        }))
    }

    fn square_route() -> Vec<Waypoint> {
        [
            (39.7238, -75.5703),
            (39.7242, -75.5703),
            (39.7242, -75.5698),
            (39.7238, -75.5698),
        ]
        .iter()
        .enumerate()
        .map(|(id, &(lat, lon))| Waypoint::new(id, Coordinate::new(lat, lon)))
        .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn empty_route_is_rejected_without_transition() {
        let sim = simulator();
        let err = sim.start(Vec::new()).expect_err("empty route must fail");
        assert_eq!(err, MissionError::EmptyRoute);
        assert_eq!(sim.state().status, MissionStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_start_is_rejected() {
        let sim = simulator();
        let handle = sim.start(square_route()).expect("first start");
        let err = sim.start(square_route()).expect_err("second start must fail");
        assert_eq!(err, MissionError::AlreadyRunning);

        sim.cancel();
        handle.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn mission_completes_and_resets_telemetry() {
        let sim = simulator();
        let mut states = sim.watch_state();
        let handle = sim.start(square_route()).expect("start");

        let mut saw_completing = false;
        let outcome = tokio::spawn(async move {
            while states.changed().await.is_ok() {
                if states.borrow().status == MissionStatus::Completing {
                    saw_completing = true;
                }
            }
            saw_completing
        });

        assert_eq!(handle.wait().await, MissionOutcome::Completed);

        let state = sim.state();
        assert_eq!(state.status, MissionStatus::Idle);
        assert!((state.battery_percent - 100.0).abs() < 1e-9);
        assert_eq!(state.distance_traveled_m, 0.0);

        // A new mission may start once the slot is released.
        let handle = sim.start(square_route()).expect("restart after completion");
        sim.cancel();
        handle.wait().await;
        drop(sim);
        assert!(outcome.await.expect("watcher task"));
    }

    #[tokio::test(start_paused = true)]
    async fn battery_never_increases_while_running() {
        let sim = simulator();
        let mut frames = sim.subscribe();
        let handle = sim.start(square_route()).expect("start");

        let watcher = tokio::spawn(async move {
            let mut last = 100.0_f64;
            let mut dipped = false;
            while let Ok(frame) = frames.recv().await {
                assert!(
                    frame.battery_percent <= last + 1e-9,
                    "battery rose mid-mission: {} -> {}",
                    last,
                    frame.battery_percent
                );
                if frame.battery_percent < last {
                    dipped = true;
                }
                last = frame.battery_percent;
            }
            dipped
        });

        assert_eq!(handle.wait().await, MissionOutcome::Completed);
        drop(sim);
        assert!(watcher.await.expect("watcher task"), "battery never drained");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_frames_and_lands_idle() {
        let sim = simulator();
        let mut frames = sim.subscribe();
        let handle = sim.start(square_route()).expect("start");

        // Let a few frames elapse mid-leg, then cancel.
        for _ in 0..3 {
            frames.recv().await.expect("frame while running");
        }
        sim.cancel();

        assert_eq!(handle.wait().await, MissionOutcome::Cancelled);
        assert_eq!(sim.state().status, MissionStatus::Idle);

        // Drain whatever was in the channel before the cancel landed; after
        // the task is done no new frames can appear.
        while let Ok(frame) = frames.try_recv() {
            let _ = frame;
        }
        drop(sim);
        assert!(frames.recv().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn final_frame_of_each_leg_reads_zero_speed() {
        let sim = simulator();
        let mut frames = sim.subscribe();
        let handle = sim.start(square_route()).expect("start");

        let watcher = tokio::spawn(async move {
            let mut previous: Option<TelemetryFrame> = None;
            let mut zero_frames = 0;
            while let Ok(frame) = frames.recv().await {
                if let Some(prev) = previous.take() {
                    if frame.leg != prev.leg {
                        assert_eq!(prev.speed_mps, 0.0, "leg must end with a zero readout");
                        zero_frames += 1;
                    } else {
                        assert!(prev.speed_mps > 0.0);
                    }
                }
                previous = Some(frame);
            }
            if let Some(last) = previous {
                assert_eq!(last.speed_mps, 0.0);
                zero_frames += 1;
            }
            zero_frames
        });

        assert_eq!(handle.wait().await, MissionOutcome::Completed);
        drop(sim);
        // One zero readout per leg of the closed 4-waypoint tour.
        assert_eq!(watcher.await.expect("watcher task"), 4);
    }
}
