//! Coder Configuration
//!
//! String key/value configuration in the style of a Hadoop `Configuration`,
//! and the typed options the decode coordinator reads from it.
//!
//! Parsing never fails: absent keys keep the default, malformed values are
//! logged and replaced by the default.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Enables the single-erasure XOR shortcut.
pub const RS_USE_XOR_KEY: &str = "io.erasurecode.codec.rs.usexor";

/// Identifier of an alternate Reed-Solomon raw decoder.
pub const RS_RAWCODER_KEY: &str = "io.erasurecode.codec.rs.rawcoder";

/// Which backends `release` tears down.
pub const RELEASE_POLICY_KEY: &str = "ecstep.release.policy";

pub const DEFAULT_USE_XOR: bool = true;

// =============================================================================
// Raw Configuration
// =============================================================================

/// Flat string configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoderConf {
    entries: HashMap<String, String>,
}

impl CoderConf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Boolean value of `key`; `true`/`false` in any case, surrounding
    /// whitespace allowed. Anything else yields `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => {
                warn!(key, value = raw, default, "Malformed boolean, using default");
                default
            }
        }
    }

    /// Parse `key` with `FromStr`, falling back to `default` on error.
    pub fn get_parsed<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + std::fmt::Debug,
    {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = raw, ?default, "Malformed value, using default");
                default
            }
        }
    }

    /// Non-empty trimmed string value of `key`.
    pub fn get_trimmed(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|s| !s.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for CoderConf
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =============================================================================
// Typed Options
// =============================================================================

/// Backends torn down by `release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// Release every backend that was created.
    #[default]
    All,
    /// Release the XOR backend if present, otherwise the RS backend.
    /// Never both; matches the original release order.
    PreferXor,
}

impl FromStr for ReleasePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ReleasePolicy::All),
            "prefer-xor" | "prefer_xor" => Ok(ReleasePolicy::PreferXor),
            other => Err(format!("unknown release policy: {}", other)),
        }
    }
}

impl std::fmt::Display for ReleasePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleasePolicy::All => write!(f, "all"),
            ReleasePolicy::PreferXor => write!(f, "prefer-xor"),
        }
    }
}

/// Options read by the decode coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Use the XOR decoder when exactly one unit is erased
    pub use_xor_when_possible: bool,

    /// Registry identifier of an alternate RS raw decoder
    pub rs_raw_coder: Option<String>,

    /// Backends released on teardown
    pub release_policy: ReleasePolicy,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            use_xor_when_possible: DEFAULT_USE_XOR,
            rs_raw_coder: None,
            release_policy: ReleasePolicy::default(),
        }
    }
}

impl DecoderOptions {
    /// Read options from `conf`; unknown keys are ignored.
    pub fn from_conf(conf: &CoderConf) -> Self {
        Self {
            use_xor_when_possible: conf.get_bool(RS_USE_XOR_KEY, DEFAULT_USE_XOR),
            rs_raw_coder: conf.get_trimmed(RS_RAWCODER_KEY).map(str::to_string),
            release_policy: conf.get_parsed(RELEASE_POLICY_KEY, ReleasePolicy::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DecoderOptions::from_conf(&CoderConf::new());
        assert_eq!(options, DecoderOptions::default());
        assert!(options.use_xor_when_possible);
        assert_eq!(options.release_policy, ReleasePolicy::All);
    }

    #[test]
    fn test_use_xor_values() {
        let off = CoderConf::new().with(RS_USE_XOR_KEY, "false");
        assert!(!DecoderOptions::from_conf(&off).use_xor_when_possible);

        let upper = CoderConf::new().with(RS_USE_XOR_KEY, " FALSE ");
        assert!(!DecoderOptions::from_conf(&upper).use_xor_when_possible);

        let on = CoderConf::new().with(RS_USE_XOR_KEY, "True");
        assert!(DecoderOptions::from_conf(&on).use_xor_when_possible);
    }

    #[test]
    fn test_malformed_values_fail_closed() {
        let conf: CoderConf = [
            (RS_USE_XOR_KEY, "nope"),
            (RELEASE_POLICY_KEY, "sometimes"),
            (RS_RAWCODER_KEY, "   "),
        ]
        .into_iter()
        .collect();

        let options = DecoderOptions::from_conf(&conf);
        assert!(options.use_xor_when_possible);
        assert_eq!(options.release_policy, ReleasePolicy::All);
        assert_eq!(options.rs_raw_coder, None);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let conf = CoderConf::new()
            .with("io.erasurecode.codec.xor.rawcoder", "whatever")
            .with(RS_RAWCODER_KEY, "isa-l");
        let options = DecoderOptions::from_conf(&conf);
        assert!(options.use_xor_when_possible);
        assert_eq!(options.rs_raw_coder.as_deref(), Some("isa-l"));
    }

    #[test]
    fn test_release_policy_parse() {
        assert_eq!("all".parse::<ReleasePolicy>().unwrap(), ReleasePolicy::All);
        assert_eq!(
            "Prefer-Xor".parse::<ReleasePolicy>().unwrap(),
            ReleasePolicy::PreferXor
        );
        assert!("both".parse::<ReleasePolicy>().is_err());
        assert_eq!(ReleasePolicy::PreferXor.to_string(), "prefer-xor");
    }

    #[test]
    fn test_conf_json() {
        let conf: CoderConf =
            serde_json::from_str(r#"{"io.erasurecode.codec.rs.usexor": "false"}"#).unwrap();
        assert_eq!(conf.get(RS_USE_XOR_KEY), Some("false"));
    }
}
