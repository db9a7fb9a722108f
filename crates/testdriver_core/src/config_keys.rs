//! Recognized configuration keys.
//!
//! The caller hands every execution a flat string map. The keys below select and parametrize the
//! run log; every other key is passed through to the test untouched. Keys are case-sensitive as
//! supplied, which is why some keys have two registered spellings.

/// Stable identifier for a recognized configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKeyId {
    LogType,
    LogInfo,
    LabRunName,
    AssignmentId,
    LogSystem,
    LogLevel,
    LabRunId,
    LogServiceUrl,
    LogId,
    LogTtl,
    RealTimeLog,
}

/// Metadata entry for a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKeyInfo {
    pub id: ConfigKeyId,
    /// Spellings accepted for this key, preferred spelling first.
    pub spellings: &'static [&'static str],
    /// Value used when the key is absent, if any.
    pub default: Option<&'static str>,
    pub description: &'static str,
}

pub const LOG_TYPE: &str = "__logtype";
pub const LOG_INFO: &str = "__LogInfo";
pub const LOG_INFO_LOWER: &str = "__loginfo";
pub const LAB_RUN_NAME: &str = "__labrunname";
pub const ASSIGNMENT_ID: &str = "__assignmentid";
pub const LOG_SYSTEM: &str = "__LogSystem";
pub const LOG_LEVEL: &str = "__loglevel";
pub const LAB_RUN_ID: &str = "__labrunid";
pub const LOG_SERVICE_URL: &str = "__LogServiceUrl";
pub const LOG_ID: &str = "__LogId";
pub const LOG_TTL: &str = "__LogTTL";
pub const REAL_TIME_LOG: &str = "realtimelog";

/// Substring of `__LogSystem` selecting the database backend.
pub const LOG_SYSTEM_DATABASE_TAG: &str = "DBLog";

/// Substring of `__LogSystem` selecting the streaming-service backend.
pub const LOG_SYSTEM_STREAMING_TAG: &str = "LogJam";

pub const CONFIG_KEYS: &[ConfigKeyInfo] = &[
    ConfigKeyInfo {
        id: ConfigKeyId::LogType,
        spellings: &[LOG_TYPE],
        default: Some("FileLog"),
        description: "Log type label.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::LogInfo,
        spellings: &[LOG_INFO, LOG_INFO_LOWER],
        default: Some("Log"),
        description: "Backend location: log directory or database connection string.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::LabRunName,
        spellings: &[LAB_RUN_NAME],
        default: Some("DefaultLabRun"),
        description: "Lab run name, used in the file log name.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::AssignmentId,
        spellings: &[ASSIGNMENT_ID],
        default: Some("0"),
        description: "Assignment id, used in the file log name and database log.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::LogSystem,
        spellings: &[LOG_SYSTEM],
        default: Some(""),
        description: "Backend selector, matched by substring against known backend tags.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::LogLevel,
        spellings: &[LOG_LEVEL],
        default: Some("Default"),
        description: "Comma-separated log level names, case-insensitive.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::LabRunId,
        spellings: &[LAB_RUN_ID],
        default: Some("-1"),
        description: "Numeric lab run id for the database backend.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::LogServiceUrl,
        spellings: &[LOG_SERVICE_URL],
        default: Some(""),
        description: "Endpoint of the streaming log service.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::LogId,
        spellings: &[LOG_ID],
        default: None,
        description: "Stream id for the streaming backend; a fresh id is generated when absent.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::LogTtl,
        spellings: &[LOG_TTL],
        default: Some(""),
        description: "Retention for the streaming backend.",
    },
    ConfigKeyInfo {
        id: ConfigKeyId::RealTimeLog,
        spellings: &[REAL_TIME_LOG],
        default: Some("false"),
        description: "Attach the real-time listener when `true`.",
    },
];

/// Resolve an exact key spelling to its id.
pub fn from_str(key: &str) -> Option<ConfigKeyId> {
    CONFIG_KEYS
        .iter()
        .find(|info| info.spellings.iter().any(|spelling| *spelling == key))
        .map(|info| info.id)
}

/// Whether the engine itself interprets this key.
pub fn is_recognized(key: &str) -> bool {
    from_str(key).is_some()
}

/// Return the metadata entry for a key.
pub fn info_for(id: ConfigKeyId) -> Option<&'static ConfigKeyInfo> {
    CONFIG_KEYS.iter().find(|info| info.id == id)
}

/// Look a key up in a caller map, honoring every registered spelling in order.
pub fn lookup<'m, F>(id: ConfigKeyId, get: F) -> Option<&'m str>
where
    F: Fn(&str) -> Option<&'m str>,
{
    info_for(id)?.spellings.iter().find_map(|spelling| get(*spelling))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn log_info_accepts_both_spellings() {
        let mut map = HashMap::new();
        map.insert("__loginfo".to_string(), "lower".to_string());
        let found = lookup(ConfigKeyId::LogInfo, |k| map.get(k).map(String::as_str));
        assert_eq!(found, Some("lower"));

        map.insert("__LogInfo".to_string(), "upper".to_string());
        let found = lookup(ConfigKeyId::LogInfo, |k| map.get(k).map(String::as_str));
        assert_eq!(found, Some("upper"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        assert!(is_recognized("__loglevel"));
        assert!(!is_recognized("__LOGLEVEL"));
        assert!(!is_recognized("anything_else"));
    }
}
