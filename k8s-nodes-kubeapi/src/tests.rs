use k8s_nodes_ext::NodeExt as _;

use super::*;

fn raw(event: api::WatchEvent<corev1::Node>) -> kube::Result<api::WatchEvent<corev1::Node>> {
    Ok(event)
}

#[test]
fn object_events_map_one_to_one() {
    let node = corev1::Node::new("node-1");
    let added = watch_event(raw(api::WatchEvent::Added(node.clone()))).unwrap();
    assert_eq!(added, WatchEvent::Added(node.clone()));
    let modified = watch_event(raw(api::WatchEvent::Modified(node.clone()))).unwrap();
    assert_eq!(modified, WatchEvent::Modified(node.clone()));
    let deleted = watch_event(raw(api::WatchEvent::Deleted(node.clone()))).unwrap();
    assert_eq!(deleted, WatchEvent::Deleted(node));
}

#[test]
fn transport_errors_end_the_watch() {
    let err = kube::Error::ReadEvents(std::io::Error::other("connection reset"));
    let mapped = watch_event(Err(err));
    assert!(matches!(mapped, Err(reflector::Error::Kube(_))));
}

fn decode(event: serde_json::Value) -> api::WatchEvent<corev1::Node> {
    serde_json::from_value(event).expect("valid watch event")
}

#[test]
fn bookmark_carries_its_resource_version() {
    let bookmark = decode(serde_json::json!({
        "type": "BOOKMARK",
        "object": {
            "apiVersion": "v1",
            "kind": "Node",
            "metadata": { "resourceVersion": "4242" }
        }
    }));
    let mapped = watch_event(raw(bookmark)).unwrap();
    assert_eq!(mapped, WatchEvent::Bookmark(ResourceVersion::from("4242")));
}

#[test]
fn server_error_event_terminates_the_watch() {
    let expired = decode(serde_json::json!({
        "type": "ERROR",
        "object": {
            "status": "Failure",
            "message": "too old resource version: 12 (3456)",
            "reason": "Expired",
            "code": 410
        }
    }));
    match watch_event(raw(expired)) {
        Err(reflector::Error::WatchTerminated(reason)) => {
            assert!(reason.contains("Expired"), "{reason}");
        }
        other => panic!("expected a terminated watch, got {other:?}"),
    }
}
