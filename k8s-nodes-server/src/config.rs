use std::net::AddrParseError;
use std::net::SocketAddr;
use std::time::Duration;

use k8s_nodes::ParsePolicyError;
use k8s_nodes::ReadinessPolicy;
use k8s_nodes::ReflectorConfig;
use thiserror::Error;

const LISTEN_ADDR: &str = "NODE_INVENTORY_LISTEN_ADDR";
const RESYNC_PERIOD: &str = "NODE_INVENTORY_RESYNC_PERIOD";
const INITIAL_BACKOFF: &str = "NODE_INVENTORY_INITIAL_BACKOFF";
const MAX_BACKOFF: &str = "NODE_INVENTORY_MAX_BACKOFF";
const READINESS_POLICY: &str = "NODE_INVENTORY_READINESS_POLICY";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("{var}: invalid duration {value:?}, expected a Go duration such as \"90s\" or \"1h\"")]
    Duration { var: &'static str, value: String },

    #[error("{var}: invalid listen address {value:?}: {source}")]
    ListenAddr {
        var: &'static str,
        value: String,
        source: AddrParseError,
    },

    #[error("{var}: {source}")]
    Policy {
        var: &'static str,
        source: ParsePolicyError,
    },
}

/// Server settings, read from `NODE_INVENTORY_*` environment variables.
#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) listen_addr: SocketAddr,
    pub(crate) reflector: ReflectorConfig,
    pub(crate) policy: ReadinessPolicy,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ReflectorConfig::default();

        let listen_addr = lookup(LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::ListenAddr {
                var: LISTEN_ADDR,
                value: listen_addr.clone(),
                source,
            })?;

        let duration = |var: &'static str, default: Duration| {
            lookup(var).map_or(Ok(default), |value| parse_duration(var, value))
        };
        let reflector = ReflectorConfig {
            resync_period: duration(RESYNC_PERIOD, defaults.resync_period)?,
            initial_backoff: duration(INITIAL_BACKOFF, defaults.initial_backoff)?,
            max_backoff: duration(MAX_BACKOFF, defaults.max_backoff)?,
        };

        let policy = match lookup(READINESS_POLICY) {
            Some(text) => text.parse().map_err(|source| ConfigError::Policy {
                var: READINESS_POLICY,
                source,
            })?,
            None => ReadinessPolicy::default(),
        };

        Ok(Self {
            listen_addr,
            reflector,
            policy,
        })
    }
}

/// Parses a Go-style duration string. Zero and negative durations are rejected.
fn parse_duration(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    go_parse_duration::parse_duration(&value)
        .ok()
        .and_then(|nanos| u64::try_from(nanos).ok())
        .filter(|nanos| *nanos > 0)
        .map(Duration::from_nanos)
        .ok_or(ConfigError::Duration { var, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use k8s_nodes_ext::ConditionStatus;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars = vars
            .iter()
            .map(|(var, value)| (var.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]).unwrap();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(config.reflector.resync_period, Duration::from_secs(3600));
        assert_eq!(config.policy, ReadinessPolicy::ready_only());
    }

    #[test]
    fn go_durations_are_accepted() {
        let config = config(&[
            (RESYNC_PERIOD, "15m"),
            (INITIAL_BACKOFF, "500ms"),
            (MAX_BACKOFF, "1m30s"),
        ])
        .unwrap();
        assert_eq!(config.reflector.resync_period, Duration::from_secs(900));
        assert_eq!(config.reflector.initial_backoff, Duration::from_millis(500));
        assert_eq!(config.reflector.max_backoff, Duration::from_secs(90));
    }

    #[test]
    fn invalid_duration_names_the_variable() {
        let err = config(&[(RESYNC_PERIOD, "hourly")]).unwrap_err();
        assert!(matches!(err, ConfigError::Duration { var: RESYNC_PERIOD, .. }));
        assert!(config(&[(MAX_BACKOFF, "-5s")]).is_err());
    }

    #[test]
    fn readiness_policy_from_environment() {
        let policy = "Ready=True,DiskPressure=False,schedulable";
        let config = config(&[(READINESS_POLICY, policy)]).unwrap();
        let expected = ReadinessPolicy::ready_only()
            .require("DiskPressure", ConditionStatus::False)
            .schedulable();
        assert_eq!(config.policy, expected);
    }

    #[test]
    fn invalid_listen_address_is_rejected() {
        let err = config(&[(LISTEN_ADDR, "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::ListenAddr { .. }));
    }
}
