use std::fmt;
use std::str::FromStr;

use k8s::ConditionStatus;
use k8s::ConditionType;
use k8s::NodeExt as _;
use k8s::ParseConditionError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::*;

/// Requires every reported condition of `condition_type` to carry `required_status`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    pub condition_type: ConditionType,
    pub required_status: ConditionStatus,
}

impl Criterion {
    pub fn new(condition_type: impl Into<ConditionType>, required_status: ConditionStatus) -> Self {
        let condition_type = condition_type.into();
        Self {
            condition_type,
            required_status,
        }
    }
}

/// Which nodes count as ready.
///
/// Criteria are checked in order and the first violation rejects the node. A node
/// that does not report a condition at all passes the criterion for that type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessPolicy {
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub require_schedulable: bool,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::ready_only()
    }
}

impl ReadinessPolicy {
    /// Only `Ready` is consulted; cordoned nodes and pressure conditions are ignored.
    pub fn ready_only() -> Self {
        Self {
            criteria: vec![Criterion::new(ConditionType::Ready, ConditionStatus::True)],
            require_schedulable: false,
        }
    }

    /// `Ready=True`, `OutOfDisk=False`, `NetworkUnavailable=False`, and not cordoned.
    pub fn strict() -> Self {
        Self::ready_only()
            .require(ConditionType::OutOfDisk, ConditionStatus::False)
            .require(ConditionType::NetworkUnavailable, ConditionStatus::False)
            .schedulable()
    }

    pub fn require(mut self, r#type: impl Into<ConditionType>, status: ConditionStatus) -> Self {
        self.criteria.push(Criterion::new(r#type, status));
        self
    }

    pub fn schedulable(self) -> Self {
        Self {
            require_schedulable: true,
            ..self
        }
    }

    pub fn is_ready(&self, node: &corev1::Node) -> bool {
        let name = node.name();
        for criterion in &self.criteria {
            let r#type = criterion.condition_type.as_str();
            let required = criterion.required_status.as_str();
            if let Some(condition) = node
                .conditions_of(r#type)
                .find(|condition| condition.status != required)
            {
                tracing::info!(
                    node = name,
                    condition = r#type,
                    status = condition.status.as_str(),
                    "Ignoring node"
                );
                return false;
            }
        }

        if self.require_schedulable && node.is_unschedulable() {
            tracing::info!(node = name, "Ignoring node since it is unschedulable");
            return false;
        }

        true
    }
}

/// `true` unless the node reports a `Ready` condition whose status is not `True`.
pub fn is_ready(node: &corev1::Node) -> bool {
    ReadinessPolicy::ready_only().is_ready(node)
}

const SCHEDULABLE: &str = "schedulable";

impl fmt::Display for ReadinessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self
            .criteria
            .iter()
            .map(|criterion| format!("{}={}", criterion.condition_type, criterion.required_status))
            .collect::<Vec<_>>();
        if self.require_schedulable {
            parts.push(SCHEDULABLE.to_string());
        }
        f.write_str(&parts.join(","))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParsePolicyError {
    #[error(
        "invalid readiness criterion {0:?}, expected <ConditionType>=<Status> or \"schedulable\""
    )]
    Criterion(String),

    #[error(transparent)]
    Status(#[from] ParseConditionError),
}

/// Parses a comma separated list such as `Ready=True,OutOfDisk=False,schedulable`.
impl FromStr for ReadinessPolicy {
    type Err = ParsePolicyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut policy = Self {
            criteria: Vec::new(),
            require_schedulable: false,
        };
        for part in text.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            if part == SCHEDULABLE {
                policy.require_schedulable = true;
                continue;
            }
            let (r#type, status) = part
                .split_once('=')
                .ok_or_else(|| ParsePolicyError::Criterion(part.to_string()))?;
            let r#type = r#type.trim();
            if r#type.is_empty() {
                return Err(ParsePolicyError::Criterion(part.to_string()));
            }
            let status = status.trim().parse()?;
            policy.criteria.push(Criterion::new(r#type, status));
        }
        Ok(policy)
    }
}
