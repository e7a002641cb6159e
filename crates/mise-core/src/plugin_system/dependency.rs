use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

/// Error that can occur when checking plugin dependencies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// Declared dependencies are not loaded
    #[error("Plugin '{plugin_id}' is missing loaded dependencies: {}", .missing.join(", "))]
    MissingDependencies { plugin_id: String, missing: Vec<String> },

    /// Loaded plugins still depend on the plugin being unloaded
    #[error("Plugin '{plugin_id}' is required by loaded plugins: {}", .dependents.join(", "))]
    HasDependents { plugin_id: String, dependents: Vec<String> },

    /// Dependency cycle detected
    #[error("Circular dependency detected between: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
}

/// Result of ordering a set of plugins so dependencies come first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOrder {
    /// Plugins in an order where every in-set dependency precedes its dependent
    pub ordered: Vec<String>,
    /// Plugins caught in (or behind) a cycle, in input order
    pub unresolved: Vec<String>,
}

impl LoadOrder {
    pub fn into_result(self) -> Result<Vec<String>, DependencyError> {
        if self.unresolved.is_empty() {
            Ok(self.ordered)
        } else {
            Err(DependencyError::CyclicDependency(self.unresolved))
        }
    }
}

/// Order `(plugin_id, dependencies)` pairs with Kahn's algorithm.
///
/// Only edges inside the given set are considered; a dependency on a plugin
/// outside the set is left for the load-time dependency check. Ties are broken
/// by input order, so the result is deterministic.
pub fn resolve_load_order(entries: &[(String, Vec<String>)]) -> LoadOrder {
    let mut ids: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for (id, _) in entries {
        if seen.insert(id.as_str()) {
            ids.push(id.as_str());
        }
    }

    // in_degree: number of unresolved in-set dependencies
    // dependents: dependency -> plugins waiting on it
    let mut in_degree: HashMap<&str, usize> = ids.iter().map(|id| (*id, 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut counted = HashSet::new();
    for (id, dependencies) in entries {
        for dep in dependencies {
            if !seen.contains(dep.as_str()) || !counted.insert((id.as_str(), dep.as_str())) {
                continue;
            }
            *in_degree.entry(id.as_str()).or_insert(0) += 1;
            dependents.entry(dep.as_str()).or_default().push(id.as_str());
        }
    }

    let mut queue: VecDeque<&str> = ids
        .iter()
        .copied()
        .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    let mut ordered = Vec::with_capacity(ids.len());
    while let Some(id) = queue.pop_front() {
        ordered.push(id.to_string());
        for dependent in dependents.get(id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*dependent);
                }
            }
        }
    }

    let unresolved = ids
        .iter()
        .filter(|id| !ordered.iter().any(|done| done == *id))
        .map(|id| id.to_string())
        .collect();
    LoadOrder { ordered, unresolved }
}
