//! Fixed-period host runner
//!
//! Owns the controller and all of its collaborators and ticks them from a
//! tokio interval until shutdown. Ticks that fall behind are skipped rather
//! than bunched up.

use std::future::Future;
use std::time::{Duration, Instant};

use agrispray_core::link::SprayLink;
use agrispray_core::parameters::{ParamValue, ParameterStore, SprayParams};
use agrispray_core::scheduler::{TaskMetadata, TaskStats, SPRAY_TASK};
use agrispray_core::spray::{AckState, KindMap, Resolution};
use agrispray_core::traits::TimeSource;
use agrispray_core::{ControllerConfig, SprayController, TickStats};
use tokio::time::MissedTickBehavior;

use crate::actuator::{ActuatorStats, SimActuator};
use crate::autopilot::{FlowLog, SimAutopilot};
use crate::clock::MonotonicClock;
use crate::config::{SitlConfig, Transport};
use crate::error::{Result, SitlError};
use crate::link::{loopback, ActuatorPort, MavlinkUdpLink, ACK_KIND_MAP};

/// What a finished run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub controller: TickStats,
    pub task: TaskStats,
    pub actuator: Option<ActuatorStats>,
    pub mission_complete: bool,
}

pub struct Runner {
    config: SitlConfig,
    task: TaskMetadata,
    controller: SprayController,
    autopilot: SimAutopilot,
    link: Box<dyn SprayLink>,
    actuator: Option<(SimActuator, ActuatorPort)>,
    params: ParameterStore,
    clock: MonotonicClock,
    task_stats: TaskStats,
    last_tick_ms: Option<u64>,
}

impl Runner {
    pub fn from_config(config: SitlConfig) -> Result<Self> {
        config.validate()?;
        let params = build_params(&config)?;

        let mut autopilot = SimAutopilot::new(config.mission.clone());
        if let Some(path) = &config.flow_log {
            autopilot = autopilot.with_flow_log(FlowLog::open(path)?);
        }

        let (link, actuator, kinds): (Box<dyn SprayLink>, _, KindMap) =
            match config.link.transport {
                Transport::Loopback => {
                    let (link, port) = loopback(config.link.capacity);
                    let kinds = KindMap::default();
                    let sim = SimActuator::new(config.actuator.clone(), kinds);
                    (Box::new(link) as Box<dyn SprayLink>, Some((sim, port)), kinds)
                }
                Transport::Udp => (
                    Box::new(MavlinkUdpLink::bind(&config.link)?) as Box<dyn SprayLink>,
                    None,
                    ACK_KIND_MAP,
                ),
            };

        let controller = SprayController::new(
            &autopilot,
            ControllerConfig {
                kinds,
                ..Default::default()
            },
        );
        let task = TaskMetadata {
            period_ms: config.tick_ms,
            ..SPRAY_TASK
        };

        Ok(Self {
            config,
            task,
            controller,
            autopilot,
            link,
            actuator,
            params,
            clock: MonotonicClock::new(),
            task_stats: TaskStats::default(),
            last_tick_ms: None,
        })
    }

    pub fn controller(&self) -> &SprayController {
        &self.controller
    }

    pub fn autopilot(&self) -> &SimAutopilot {
        &self.autopilot
    }

    pub fn autopilot_mut(&mut self) -> &mut SimAutopilot {
        &mut self.autopilot
    }

    pub fn actuator(&self) -> Option<&SimActuator> {
        self.actuator.as_ref().map(|(sim, _)| sim)
    }

    pub fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    /// Run a single tick at the current clock time.
    pub fn step(&mut self) -> Option<Resolution> {
        let started = Instant::now();
        let now = self.clock.now_ms();

        self.autopilot.step(now);
        if let Some((sim, port)) = self.actuator.as_mut() {
            sim.step(now, port);
        }
        let resolution = self.controller.tick(
            &mut self.autopilot,
            &mut *self.link,
            &self.params,
            &self.clock,
        );

        let execution_us = started.elapsed().as_micros().min(u32::MAX as u128) as u32;
        let period_us = match self.last_tick_ms {
            Some(last) => (now.saturating_sub(last) * 1000).min(u32::MAX as u64) as u32,
            None => self.task.period_us(),
        };
        self.last_tick_ms = Some(now);
        self.task_stats.update(&self.task, execution_us, period_us);

        if let Some(res) = &resolution {
            tracing::info!(
                id = res.request.id,
                kind = res.request.kind.as_str(),
                outcome = res.outcome.as_str(),
                "sprayer request resolved"
            );
        }
        resolution
    }

    /// Tick until `shutdown` resolves (or the mission completes, if configured).
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) -> RunSummary {
        let mut interval = tokio::time::interval(Duration::from_millis(self.config.tick_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut last_status_ms = self.clock.now_ms();
        tracing::info!(tick_ms = self.config.tick_ms, "runner started");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    self.step();

                    let now = self.clock.now_ms();
                    if now.saturating_sub(last_status_ms) >= self.config.status_interval_ms {
                        last_status_ms = now;
                        self.log_status();
                    }

                    if self.config.stop_when_complete
                        && self.autopilot.is_complete()
                        && self.controller.ack().state() == AckState::Idle
                    {
                        tracing::info!("mission complete, stopping");
                        break;
                    }
                }
            }
        }

        self.log_status();
        self.summary()
    }

    /// Tick until Ctrl-C.
    pub async fn run(&mut self) -> RunSummary {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            controller: *self.controller.stats(),
            task: self.task_stats,
            actuator: self.actuator().map(SimActuator::stats),
            mission_complete: self.autopilot.is_complete(),
        }
    }

    fn log_status(&self) {
        let stats = self.controller.stats();
        let flow = self.controller.flow();
        tracing::info!(
            ticks = stats.ticks,
            sent = stats.commands_sent,
            acked = stats.acks_matched,
            failsafes = stats.failsafes,
            refusals = stats.refusals,
            dropped = stats.dropped_inbound,
            mission = self.controller.mission().status().as_str(),
            flowrate = flow.flowrate,
            volume = flow.volume,
            avg_tick_us = self.task_stats.avg_execution_us,
            overruns = self.task_stats.deadline_misses,
            "status"
        );
    }
}

/// Default spray parameters with the config's overrides applied
pub fn build_params(config: &SitlConfig) -> Result<ParameterStore> {
    let mut store = ParameterStore::new();
    SprayParams::register_defaults(&mut store).map_err(|e| SitlError::param("defaults", e))?;
    for (name, value) in &config.params {
        store
            .set(name, ParamValue::Int(*value))
            .map_err(|e| SitlError::param(name.as_str(), e))?;
    }
    Ok(store)
}
