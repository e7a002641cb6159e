use crate::plugin_system::dependency::{DependencyError, LoadOrder, resolve_load_order};

fn entries(graph: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
    graph.iter()
        .map(|(id, deps)| (id.to_string(), deps.iter().map(|d| d.to_string()).collect()))
        .collect()
}

#[test]
fn test_dependencies_come_first() {
    let order = resolve_load_order(&entries(&[
        ("reports", &["inventory"]),
        ("scheduling", &["staff", "inventory"]),
        ("inventory", &[]),
        ("staff", &[]),
    ]));

    assert!(order.unresolved.is_empty());
    assert_eq!(order.ordered, vec!["inventory", "staff", "reports", "scheduling"]);
}

#[test]
fn test_dependencies_outside_the_set_are_ignored() {
    let order = resolve_load_order(&entries(&[("reports", &["inventory"])]));
    assert_eq!(order.into_result(), Ok(vec!["reports".to_string()]));
}

#[test]
fn test_duplicates_are_collapsed() {
    let order = resolve_load_order(&entries(&[
        ("inventory", &[]),
        ("reports", &["inventory", "inventory"]),
        ("inventory", &[]),
    ]));
    assert_eq!(order.ordered, vec!["inventory", "reports"]);
}

#[test]
fn test_cycle_is_reported_with_its_members() {
    let order = resolve_load_order(&entries(&[
        ("a", &["b"]),
        ("b", &["a"]),
        ("c", &[]),
        ("d", &["a"]),
    ]));

    assert_eq!(
        order,
        LoadOrder {
            ordered: vec!["c".to_string()],
            unresolved: vec!["a".to_string(), "b".to_string(), "d".to_string()],
        }
    );
    assert_eq!(
        order.into_result(),
        Err(DependencyError::CyclicDependency(vec![
            "a".to_string(),
            "b".to_string(),
            "d".to_string()
        ]))
    );
}

#[test]
fn test_error_messages_list_plugins() {
    let err = DependencyError::MissingDependencies {
        plugin_id: "reports".to_string(),
        missing: vec!["inventory".to_string(), "staff".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "Plugin 'reports' is missing loaded dependencies: inventory, staff"
    );
}
