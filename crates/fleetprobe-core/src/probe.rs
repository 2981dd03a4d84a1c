//! Local service prober
//!
//! Some services cannot be judged from their own host (load balancer
//! VIPs, externally exposed endpoints). For those, a probe command runs
//! on the controller and its exit code overrides the payload-reported
//! state: 0 means up, non-zero means down, execution failure means
//! unknown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use fleetprobe_exec::CommandRunner;
use fleetprobe_model::{Component, ComponentPool, ComponentState, Service, Uri};

use crate::config::ProbeConfig;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs configured local probes and merges results into the pool
pub struct ServiceProber {
    runner: Arc<dyn CommandRunner>,
    probes: Vec<ProbeConfig>,
    default_timeout: Duration,
}

impl ServiceProber {
    /// Create a prober over the given runner (normally a `LocalRunner`)
    pub fn new(runner: Arc<dyn CommandRunner>, probes: Vec<ProbeConfig>) -> Self {
        Self {
            runner,
            probes,
            default_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Run all probes and apply their results to the pool
    ///
    /// Probed services absent from every payload are inserted with the
    /// probed state so the assembler still links them. Returns the
    /// number of probes applied.
    #[instrument(skip(self, pool))]
    pub async fn apply(&self, pool: &mut ComponentPool) -> usize {
        let mut applied = 0;

        for probe in &self.probes {
            let uri = match probe.service.parse::<Uri>() {
                Ok(uri @ Uri::Service { .. }) => uri,
                Ok(other) => {
                    warn!(uri = %other, "probe target is not a service, skipping");
                    continue;
                }
                Err(e) => {
                    warn!(service = %probe.service, error = %e, "invalid probe service uri, skipping");
                    continue;
                }
            };

            let timeout = probe
                .timeout_secs
                .map_or(self.default_timeout, Duration::from_secs);

            let state = match self.runner.run_with_timeout(&probe.command, timeout).await {
                Ok(output) if output.success() => ComponentState::Up,
                Ok(output) => {
                    debug!(
                        uri = %uri,
                        status = output.status,
                        "probe reported service down"
                    );
                    ComponentState::Down
                }
                Err(e) => {
                    warn!(uri = %uri, error = %e, "probe failed to run");
                    ComponentState::Unknown
                }
            };

            match pool.get_mut(&uri) {
                Some(component) => component.set_state(state),
                None => {
                    let Uri::Service { host, name } = &uri else {
                        unreachable!("probe uris are services");
                    };
                    debug!(uri = %uri, "probed service not in any payload, inserting");
                    pool.insert(
                        uri.clone(),
                        Component::Service(Service {
                            uri: uri.clone(),
                            host: host.clone(),
                            name: name.clone(),
                            state,
                            needs: Vec::new(),
                            needed_by: Vec::new(),
                            dependency_score: 0,
                        }),
                    );
                }
            }

            applied += 1;
        }

        info!(applied, total = self.probes.len(), "local probes applied");

        applied
    }
}
