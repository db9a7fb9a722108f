//! Log settings derived from the caller's configuration map.

use std::path::PathBuf;

use testdriver_core::config_keys::{self, ConfigKeyId};

use super::{LogError, LogLevels};
use crate::StringMap;

/// Backend selected for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogBackend {
    File {
        path: PathBuf,
    },
    Database {
        connection: String,
        lab_run_id: i32,
        assignment_id: i32,
    },
    Streaming {
        service_url: String,
        log_id: String,
        ttl: String,
    },
    /// Live listener attached on top of the configured backend.
    RealTime,
}

impl LogBackend {
    pub fn label(&self) -> &'static str {
        match self {
            LogBackend::File { .. } => "file",
            LogBackend::Database { .. } => "database",
            LogBackend::Streaming { .. } => "streaming",
            LogBackend::RealTime => "realtime",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub log_type: String,
    pub log_info: String,
    pub lab_run_name: String,
    pub assignment_id: String,
    pub log_system: String,
    pub levels: LogLevels,
    pub lab_run_id: i32,
    pub service_url: String,
    pub log_id: String,
    pub ttl: String,
    pub real_time: bool,
}

impl LogSettings {
    /// Read the recognized keys; everything else in the map is ignored.
    pub fn from_config(configs: &StringMap) -> Result<Self, LogError> {
        let get = |id: ConfigKeyId| -> String {
            config_keys::lookup(id, |key| configs.get(key).map(String::as_str))
                .or_else(|| config_keys::info_for(id).and_then(|info| info.default))
                .unwrap_or_default()
                .to_string()
        };

        let lab_run_id = get(ConfigKeyId::LabRunId);
        let lab_run_id = lab_run_id.trim().parse::<i32>().map_err(|_| LogError::InvalidSetting {
            key: config_keys::LAB_RUN_ID,
            value: lab_run_id.clone(),
        })?;

        let real_time = get(ConfigKeyId::RealTimeLog).trim().eq_ignore_ascii_case("true");

        let log_id = config_keys::lookup(ConfigKeyId::LogId, |key| configs.get(key).map(String::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(Self {
            log_type: get(ConfigKeyId::LogType),
            log_info: get(ConfigKeyId::LogInfo),
            lab_run_name: get(ConfigKeyId::LabRunName),
            assignment_id: get(ConfigKeyId::AssignmentId),
            log_system: get(ConfigKeyId::LogSystem),
            levels: LogLevels::parse(&get(ConfigKeyId::LogLevel)),
            lab_run_id,
            service_url: get(ConfigKeyId::LogServiceUrl),
            log_id,
            ttl: get(ConfigKeyId::LogTtl),
            real_time,
        })
    }

    /// The primary backend, chosen by substring match on `__LogSystem`.
    pub fn backend(&self) -> LogBackend {
        if self.log_system.contains(config_keys::LOG_SYSTEM_DATABASE_TAG) {
            LogBackend::Database {
                connection: self.log_info.clone(),
                lab_run_id: self.lab_run_id,
                assignment_id: self.assignment_id.trim().parse().unwrap_or(0),
            }
        } else if self.log_system.contains(config_keys::LOG_SYSTEM_STREAMING_TAG) {
            LogBackend::Streaming {
                service_url: self.service_url.clone(),
                log_id: self.log_id.clone(),
                ttl: self.ttl.clone(),
            }
        } else {
            LogBackend::File {
                path: PathBuf::from(&self.log_info).join(format!("{}.{}.xml", self.lab_run_name, self.assignment_id)),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> StringMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_select_file_backend() {
        let settings = LogSettings::from_config(&StringMap::new()).unwrap();
        assert_eq!(settings.lab_run_id, -1);
        assert!(!settings.real_time);
        assert_eq!(settings.levels, LogLevels::DEFAULT);
        assert_eq!(
            settings.backend(),
            LogBackend::File {
                path: PathBuf::from("Log").join("DefaultLabRun.0.xml")
            }
        );
        assert!(uuid::Uuid::parse_str(&settings.log_id).is_ok());
    }

    #[test]
    fn log_system_is_substring_matched() {
        let db = LogSettings::from_config(&map(&[
            ("__LogSystem", "UseDBLogPlease"),
            ("__LogInfo", "server=x"),
            ("__labrunid", "12"),
            ("__assignmentid", "7"),
        ]))
        .unwrap();
        assert_eq!(
            db.backend(),
            LogBackend::Database {
                connection: "server=x".into(),
                lab_run_id: 12,
                assignment_id: 7
            }
        );

        let stream = LogSettings::from_config(&map(&[("__LogSystem", "LogJam"), ("__LogId", "abc")])).unwrap();
        assert!(matches!(stream.backend(), LogBackend::Streaming { ref log_id, .. } if log_id == "abc"));
    }

    #[test]
    fn preferred_log_info_spelling_wins() {
        let settings = LogSettings::from_config(&map(&[("__loginfo", "lower"), ("__LogInfo", "upper")])).unwrap();
        assert_eq!(settings.log_info, "upper");
        let settings = LogSettings::from_config(&map(&[("__loginfo", "lower")])).unwrap();
        assert_eq!(settings.log_info, "lower");
    }

    #[test]
    fn invalid_lab_run_id_is_rejected() {
        let err = LogSettings::from_config(&map(&[("__labrunid", "abc")])).unwrap_err();
        assert!(matches!(err, LogError::InvalidSetting { .. }));
    }

    #[test]
    fn real_time_flag_is_case_insensitive() {
        let settings = LogSettings::from_config(&map(&[("realtimelog", "True")])).unwrap();
        assert!(settings.real_time);
    }
}
