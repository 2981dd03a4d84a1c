//! Component builder
//!
//! Turns per-target poll reports into the component pool the graph
//! assembler links: one host component per report, plus service and
//! artefact components for every reachable payload.

use tracing::{debug, warn};

use fleetprobe_model::{
    Artefact, Component, ComponentPool, ComponentState, Host, Service, Uri, parse_artefact_spec,
};

use crate::message::HostReport;

/// Build the component pool from a set of poll reports
///
/// Unreachable targets still yield a host component (state `Unknown`)
/// so the fleet view is complete. `needs` entries that are not valid
/// URIs are logged and skipped; they cannot be represented as edges.
#[must_use]
pub fn build_components(reports: &[HostReport]) -> ComponentPool {
    let mut pool = ComponentPool::new();

    for report in reports {
        let hostname = report
            .payload
            .as_ref()
            .map_or_else(|| report.target.clone(), |p| p.hostname.clone());

        let host_uri = Uri::host(hostname.clone());
        pool.insert(
            host_uri.clone(),
            Component::Host(Host {
                uri: host_uri,
                name: hostname.clone(),
                fqdn: report.payload.as_ref().and_then(|p| p.fqdn.clone()),
                state: report.state,
                reachable: report.reachable,
                polled_at: report.polled_at,
                needed_by: Vec::new(),
                dependency_score: 0,
            }),
        );

        let Some(payload) = &report.payload else {
            continue;
        };

        for (name, entry) in &payload.services {
            let mut needs = Vec::with_capacity(entry.needs.len());
            for raw in &entry.needs {
                match raw.parse::<Uri>() {
                    Ok(uri) => needs.push(uri),
                    Err(e) => {
                        warn!(host = %hostname, service = %name, error = %e, "skipping unparseable needs entry");
                    }
                }
            }

            let state = entry
                .state
                .as_deref()
                .map_or(ComponentState::Unknown, ComponentState::from_report);

            let uri = Uri::service(hostname.clone(), name.clone());
            pool.insert(
                uri.clone(),
                Component::Service(Service {
                    uri,
                    host: hostname.clone(),
                    name: name.clone(),
                    state,
                    needs,
                    needed_by: Vec::new(),
                    dependency_score: 0,
                }),
            );
        }

        for spec in &payload.current_artefacts {
            let (name, version) = parse_artefact_spec(spec);
            let uri = Uri::artefact(hostname.clone(), name.clone(), version.clone());
            pool.insert(
                uri.clone(),
                Component::Artefact(Artefact {
                    uri,
                    host: hostname.clone(),
                    name,
                    version,
                    state: ComponentState::Up,
                    pending: false,
                    needed_by: Vec::new(),
                    dependency_score: 0,
                }),
            );
        }

        for (name, version) in &payload.next_artefacts {
            // Some hosts report a pending artefact with an empty version
            // string; treat it as versionless like parse_artefact_spec does.
            let version = (!version.is_empty()).then(|| version.clone());
            let uri = Uri::artefact(hostname.clone(), name.clone(), version.clone());
            pool.insert(
                uri.clone(),
                Component::Artefact(Artefact {
                    uri,
                    host: hostname.clone(),
                    name: name.clone(),
                    version,
                    state: ComponentState::Unknown,
                    pending: true,
                    needed_by: Vec::new(),
                    dependency_score: 0,
                }),
            );
        }
    }

    debug!(components = pool.len(), reports = reports.len(), "built component pool");

    pool
}
