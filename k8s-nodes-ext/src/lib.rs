pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

pub use condition::ConditionStatus;
pub use condition::ConditionType;
pub use condition::ParseConditionError;
pub use time::TimeExt;

use openapi::Resource;

mod condition;
mod time;

#[cfg(test)]
mod tests;

pub trait NodeExt {
    /// Create a bare Node with the given name and no status.
    fn new(name: impl ToString) -> Self;

    /// Append a condition with the given type and status, stamped with the current time.
    fn with_condition(self, r#type: impl ToString, status: ConditionStatus) -> Self;

    /// Mark the node as cordoned (`spec.unschedulable = true`).
    fn cordoned(self) -> Self;

    /// Node name, or an empty string when the metadata carries none.
    fn name(&self) -> &str;

    /// Conditions reported in `status.conditions`, in the order the kubelet reported them.
    fn conditions(&self) -> &[corev1::NodeCondition];

    /// Iterates over every reported condition of the given type.
    fn conditions_of<'a>(
        &'a self,
        r#type: &'a str,
    ) -> impl Iterator<Item = &'a corev1::NodeCondition> + 'a {
        self.conditions()
            .iter()
            .filter(move |condition| condition.type_ == r#type)
    }

    fn is_unschedulable(&self) -> bool;
}

impl NodeExt for corev1::Node {
    fn new(name: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta::new(name);
        Self {
            metadata,
            ..default()
        }
    }

    fn with_condition(mut self, r#type: impl ToString, status: ConditionStatus) -> Self {
        let condition = corev1::NodeCondition::new(r#type, status);
        self.status
            .get_or_insert_with(default)
            .conditions
            .get_or_insert_with(default)
            .push(condition);
        self
    }

    fn cordoned(mut self) -> Self {
        self.spec.get_or_insert_with(default).unschedulable = Some(true);
        self
    }

    fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    fn conditions(&self) -> &[corev1::NodeCondition] {
        self.status
            .as_ref()
            .and_then(|status| status.conditions.as_deref())
            .unwrap_or_default()
    }

    fn is_unschedulable(&self) -> bool {
        self.spec
            .as_ref()
            .and_then(|spec| spec.unschedulable)
            .unwrap_or(false)
    }
}

pub trait NodeConditionExt {
    fn new(r#type: impl ToString, status: ConditionStatus) -> Self;
}

impl NodeConditionExt for corev1::NodeCondition {
    fn new(r#type: impl ToString, status: ConditionStatus) -> Self {
        let now = metav1::Time::now();
        Self {
            type_: r#type.to_string(),
            status: status.to_string(),
            last_heartbeat_time: Some(now.clone()),
            last_transition_time: Some(now),
            ..default()
        }
    }
}

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self;
    fn with_resource_version(self, version: impl ToString) -> Self;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Self::new(name)
        }
    }

    fn with_resource_version(self, version: impl ToString) -> Self {
        Self {
            resource_version: Some(version.to_string()),
            ..self
        }
    }
}

pub trait StatusExt {
    fn not_found<K>(name: impl ToString) -> Self
    where
        K: Resource;

    fn unavailable(message: impl ToString) -> Self;
}

impl StatusExt for metav1::Status {
    fn not_found<K>(name: impl ToString) -> Self
    where
        K: Resource,
    {
        let kind = K::URL_PATH_SEGMENT.to_string();
        let name = name.to_string();
        let code = 404;
        let message = format!(r#"{kind} "{name}" not found"#);
        let details = metav1::StatusDetails {
            name: Some(name),
            kind: Some(kind),
            ..default()
        };
        Self {
            code: Some(code),
            details: Some(details),
            message: Some(message),
            metadata: metav1::ListMeta::default(),
            reason: Some("NotFound".to_string()),
            status: Some("Failure".to_string()),
        }
    }

    fn unavailable(message: impl ToString) -> Self {
        Self {
            code: Some(503),
            details: None,
            message: Some(message.to_string()),
            metadata: metav1::ListMeta::default(),
            reason: Some("ServiceUnavailable".to_string()),
            status: Some("Failure".to_string()),
        }
    }
}

pub fn default<T: Default>() -> T {
    T::default()
}
