//! 场景文件（JSON）
//!
//! 所有字段可选，缺省取各变体的预设值；命令行参数可以再覆盖。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arq::{ArqConfig, ArqVariant, ConfigError, Feedback, Recovery};
use crate::channel::{ChannelConfig, Scenario};

use super::SimTime;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("{name} must be a finite non-negative number, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("loss = 1 or corrupt = 1 never completes; set `until` to bound the run")]
    Unbounded,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub protocol: Option<ArqVariant>,
    #[serde(default)]
    pub window_size: Option<usize>,
    /// 重传超时（时间单位）
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub recovery: Option<Recovery>,
    #[serde(default)]
    pub num_messages: Option<u64>,
    #[serde(default)]
    pub loss: Option<f64>,
    #[serde(default)]
    pub corrupt: Option<f64>,
    #[serde(default)]
    pub avg_delay: Option<f64>,
    #[serde(default)]
    pub message_interval: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub reorder: Option<bool>,
    /// 仿真时间上限（时间单位）
    #[serde(default)]
    pub until: Option<f64>,
}

impl ScenarioSpec {
    pub fn from_json_str(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// 用 `other` 中给出的字段覆盖当前值
    pub fn merge(self, other: ScenarioSpec) -> ScenarioSpec {
        ScenarioSpec {
            protocol: other.protocol.or(self.protocol),
            window_size: other.window_size.or(self.window_size),
            timeout: other.timeout.or(self.timeout),
            feedback: other.feedback.or(self.feedback),
            recovery: other.recovery.or(self.recovery),
            num_messages: other.num_messages.or(self.num_messages),
            loss: other.loss.or(self.loss),
            corrupt: other.corrupt.or(self.corrupt),
            avg_delay: other.avg_delay.or(self.avg_delay),
            message_interval: other.message_interval.or(self.message_interval),
            seed: other.seed.or(self.seed),
            reorder: other.reorder.or(self.reorder),
            until: other.until.or(self.until),
        }
    }

    /// 填充缺省值并校验
    pub fn resolve(&self) -> Result<Scenario, ScenarioError> {
        let defaults = Scenario::default();
        let variant = self.protocol.unwrap_or(defaults.arq.variant);

        let mut arq = ArqConfig::for_variant(variant);
        if let Some(w) = self.window_size {
            arq.window_size = w;
        }
        if let Some(t) = self.timeout {
            arq.timeout = SimTime::from_units(non_negative("timeout", t)?);
        }
        if let Some(fb) = self.feedback {
            arq.feedback = fb;
        }
        if let Some(r) = self.recovery {
            arq.recovery = r;
        }
        arq.validate()?;

        let channel = ChannelConfig {
            loss: probability("loss", self.loss.unwrap_or(defaults.channel.loss))?,
            corrupt: probability("corrupt", self.corrupt.unwrap_or(defaults.channel.corrupt))?,
            avg_delay: non_negative(
                "avg_delay",
                self.avg_delay.unwrap_or(defaults.channel.avg_delay),
            )?,
            reorder: self.reorder.unwrap_or(defaults.channel.reorder),
            seed: self.seed.unwrap_or(defaults.channel.seed),
        };

        if channel.reorder && !arq.tolerates_reordering() {
            return Err(ConfigError::ReorderWithOneBitSequence(variant.name()).into());
        }

        let until = match self.until {
            Some(u) => Some(SimTime::from_units(non_negative("until", u)?)),
            None => None,
        };
        // 每个报文都丢失或损坏时，重传永不停止
        if (channel.loss >= 1.0 || channel.corrupt >= 1.0) && until.is_none() {
            return Err(ScenarioError::Unbounded);
        }

        Ok(Scenario {
            arq,
            channel,
            num_messages: self.num_messages.unwrap_or(defaults.num_messages),
            message_interval: non_negative(
                "message_interval",
                self.message_interval.unwrap_or(defaults.message_interval),
            )?,
            until,
        })
    }
}

fn probability(name: &'static str, value: f64) -> Result<f64, ScenarioError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ScenarioError::Probability { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, ScenarioError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ScenarioError::Negative { name, value })
    }
}
