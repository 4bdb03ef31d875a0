use super::*;

#[test]
fn node_builder_appends_conditions_in_order() {
    let node = corev1::Node::new("node-1")
        .with_condition(ConditionType::OutOfDisk, ConditionStatus::False)
        .with_condition(ConditionType::Ready, ConditionStatus::True);

    assert_eq!(node.name(), "node-1");
    let types = node
        .conditions()
        .iter()
        .map(|condition| condition.type_.as_str())
        .collect::<Vec<_>>();
    assert_eq!(types, ["OutOfDisk", "Ready"]);
    assert!(node.conditions()[1].last_transition_time.is_some());
}

#[test]
fn node_without_status_has_no_conditions() {
    let node = corev1::Node::new("bare");
    assert!(node.conditions().is_empty());
    assert_eq!(node.conditions_of("Ready").count(), 0);
    assert!(!node.is_unschedulable());
}

#[test]
fn cordoned_node_is_unschedulable() {
    let node = corev1::Node::new("node-2").cordoned();
    assert!(node.is_unschedulable());
}

#[test]
fn conditions_of_filters_by_type() {
    let node = corev1::Node::new("node-3")
        .with_condition("Ready", ConditionStatus::Unknown)
        .with_condition("MemoryPressure", ConditionStatus::False);
    let ready = node.conditions_of("Ready").collect::<Vec<_>>();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].status, "Unknown");
}

#[test]
fn condition_type_round_trips_known_and_unknown_names() {
    assert_eq!(ConditionType::from("NetworkUnavailable"), ConditionType::NetworkUnavailable);
    assert_eq!(
        ConditionType::from("KernelDeadlock"),
        ConditionType::Other("KernelDeadlock".to_string())
    );
    assert_eq!(ConditionType::Other("KernelDeadlock".to_string()).as_str(), "KernelDeadlock");
}

#[test]
fn condition_status_rejects_lowercase() {
    assert_eq!("False".parse::<ConditionStatus>(), Ok(ConditionStatus::False));
    assert_eq!(
        "true".parse::<ConditionStatus>(),
        Err(ParseConditionError("true".to_string()))
    );
}

#[test]
fn not_found_status_names_the_resource() {
    let status = metav1::Status::not_found::<corev1::Node>("node-9");
    assert_eq!(status.code, Some(404));
    assert_eq!(status.reason.as_deref(), Some("NotFound"));
    assert_eq!(status.message.as_deref(), Some(r#"nodes "node-9" not found"#));
}
