//! Dependency graph assembly
//!
//! Links `needs`/`needed_by` edges across the component pool and
//! computes per-component dependency scores used for ordering output
//! and, eventually, deployment plans.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, warn};

use crate::component::{Component, ComponentPool, MissingComponent};
use crate::uri::Uri;

/// Link the pool: add implicit service->host edges, materialise
/// placeholders for dangling `needs` targets, and fill `needed_by`
/// back-edges so the symmetry invariant holds.
pub fn link(pool: &mut ComponentPool) {
    // Implicit edge: every service needs the host it runs on.
    let mut edges: Vec<(Uri, Uri)> = Vec::new();

    for component in pool.values_mut() {
        if let Component::Service(service) = component {
            let host_uri = Uri::host(service.host.clone());
            if !service.needs.contains(&host_uri) {
                service.needs.push(host_uri);
            }
            service.needs.sort();
            service.needs.dedup();

            for target in &service.needs {
                edges.push((service.uri.clone(), target.clone()));
            }
        }
    }

    for (from, to) in edges {
        let target = pool.entry(to.clone()).or_insert_with(|| {
            warn!(uri = %to, needed_by = %from, "dependency target missing, inserting placeholder");
            Component::Missing(MissingComponent {
                uri: to.clone(),
                needed_by: Vec::new(),
                dependency_score: 0,
            })
        });
        target.needed_by_mut().push(from);
    }

    for component in pool.values_mut() {
        let needed_by = component.needed_by_mut();
        needed_by.sort();
        needed_by.dedup();
    }

    debug!(components = pool.len(), "linked dependency graph");
}

/// Compute dependency scores: for each component, the number of
/// distinct components that directly or transitively depend on it.
/// Cycles are handled by the visited set and contribute each member
/// once.
pub fn dependency_scores(pool: &mut ComponentPool) {
    let scores: Vec<(Uri, usize)> = pool
        .keys()
        .map(|uri| (uri.clone(), transitive_dependents(pool, uri)))
        .collect();

    for (uri, score) in scores {
        if let Some(component) = pool.get_mut(&uri) {
            component.set_dependency_score(score);
        }
    }
}

/// Link the pool and compute scores in one pass
pub fn assemble(pool: &mut ComponentPool) {
    link(pool);
    dependency_scores(pool);
}

fn transitive_dependents(pool: &ComponentPool, start: &Uri) -> usize {
    let mut visited: BTreeSet<&Uri> = BTreeSet::new();
    let mut queue: VecDeque<&Uri> = VecDeque::new();
    queue.push_back(start);

    while let Some(uri) = queue.pop_front() {
        let Some(component) = pool.get(uri) else {
            continue;
        };
        for dependent in component.needed_by() {
            if visited.insert(dependent) {
                queue.push_back(dependent);
            }
        }
    }

    // The start node may appear in its own closure through a cycle;
    // it never counts as its own dependent.
    visited.remove(start);
    visited.len()
}
