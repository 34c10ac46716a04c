//! Process-level configuration (spec §6 "Configuration").

use serde::{Deserialize, Serialize};

use crate::infrastructure::logging::LogConfig;

/// Root configuration, loaded by `ConfigLoader` with figment's layered
/// merge (defaults -> `config.yaml` -> `local.yaml` -> env).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub front_end: FrontEndConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LogConfig,
    /// Single-user bootstrap mode: if set, `cadence bootstrap-user` enrolls
    /// this id without requiring an external enrollment API.
    pub test_user_id: Option<uuid::Uuid>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            front_end: FrontEndConfig::default(),
            clock: ClockConfig::default(),
            schedule: ScheduleConfig::default(),
            logging: LogConfig::default(),
            test_user_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    ".cadence/cadence.db".to_string()
}

/// The inbound HTTP ingress this process listens on (spec §4.5 "Wire
/// surface").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// The conversational front end this process delivers triggers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontEndConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_output_channel")]
    pub output_channel: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FrontEndConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_channel: default_output_channel(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5005".to_string()
}

fn default_output_channel() -> String {
    "default_channel".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// The fixed civil time zone and daily-tick time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Hour (0-23) at which the daily `new-day` tick fires.
    #[serde(default = "default_tick_hour")]
    pub tick_hour: u32,
    /// Minute at which the daily tick fires (spec: 00:05 local).
    #[serde(default = "default_tick_minute")]
    pub tick_minute: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            tick_hour: default_tick_hour(),
            tick_minute: default_tick_minute(),
        }
    }
}

fn default_timezone() -> String {
    "Europe/Amsterdam".to_string()
}

fn default_tick_hour() -> u32 {
    0
}

fn default_tick_minute() -> u32 {
    5
}

/// The configured 24-hour clock hour for each daypart preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_morning_hour")]
    pub morning_hour: u32,
    #[serde(default = "default_afternoon_hour")]
    pub afternoon_hour: u32,
    #[serde(default = "default_evening_hour")]
    pub evening_hour: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            morning_hour: default_morning_hour(),
            afternoon_hour: default_afternoon_hour(),
            evening_hour: default_evening_hour(),
        }
    }
}

fn default_morning_hour() -> u32 {
    9
}

fn default_afternoon_hour() -> u32 {
    14
}

fn default_evening_hour() -> u32 {
    19
}

impl ScheduleConfig {
    pub fn hour_for(&self, daypart: crate::domain::models::user::DayPart) -> u32 {
        use crate::domain::models::user::DayPart;
        match daypart {
            DayPart::Morning => self.morning_hour,
            DayPart::Afternoon => self.afternoon_hour,
            DayPart::Evening => self.evening_hour,
        }
    }
}
