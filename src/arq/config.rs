//! 协议变体与参数
//!
//! 四种历史变体收敛为一个参数化的收发对：
//! - 单槽（停等 / 交替位） vs 滑动窗口（回退 N）
//! - 接收端对损坏报文回复重复 ACK 还是显式 NAK
//! - 单槽发送端收到否定信号后立即重传还是等超时

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::SimTime;

/// 回退 N 的默认窗口大小
pub const DEFAULT_WINDOW_SIZE: usize = 50;
/// 默认重传超时（时间单位）
pub const DEFAULT_TIMEOUT_UNITS: f64 = 50.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArqVariant {
    /// 停等：单槽，序号递增
    StopAndWait,
    /// 交替位：单槽，序号在 0/1 间切换
    AlternatingBit,
    /// 回退 N：滑动窗口 + 累计确认
    GoBackN,
}

impl ArqVariant {
    pub fn name(self) -> &'static str {
        match self {
            ArqVariant::StopAndWait => "stop_and_wait",
            ArqVariant::AlternatingBit => "alternating_bit",
            ArqVariant::GoBackN => "go_back_n",
        }
    }
}

impl std::str::FromStr for ArqVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "stop_and_wait" | "saw" => Ok(ArqVariant::StopAndWait),
            "alternating_bit" | "abp" => Ok(ArqVariant::AlternatingBit),
            "go_back_n" | "gbn" => Ok(ArqVariant::GoBackN),
            _ => Err(ConfigError::UnknownVariant(s.to_string())),
        }
    }
}

/// 接收端如何回应损坏报文
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// 重发最近一次 ACK
    ReAck,
    /// 发送显式 NAK（ack = 0）
    Nak,
}

/// 单槽发送端收到损坏/重复/否定确认后的反应；窗口模式始终只靠超时恢复。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    TimeoutOnly,
    ImmediateResend,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("window size must be at least 1")]
    EmptyWindow,
    #[error("single-slot variant {0} requires window size 1, got {1}")]
    SingleSlotWindow(&'static str, usize),
    #[error("retransmission timeout must be positive")]
    ZeroTimeout,
    #[error("{0} uses a one-bit sequence space and cannot run over a reordering channel")]
    ReorderWithOneBitSequence(&'static str),
    #[error("unknown protocol variant {0:?} (expected stop_and_wait, alternating_bit or go_back_n)")]
    UnknownVariant(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArqConfig {
    pub variant: ArqVariant,
    /// 窗口大小（单槽变体固定为 1）
    pub window_size: usize,
    /// 重传超时
    pub timeout: SimTime,
    pub feedback: Feedback,
    pub recovery: Recovery,
}

impl Default for ArqConfig {
    fn default() -> Self {
        Self::for_variant(ArqVariant::GoBackN)
    }
}

impl ArqConfig {
    /// 各变体的预设参数
    pub fn for_variant(variant: ArqVariant) -> Self {
        let timeout = SimTime::from_units(DEFAULT_TIMEOUT_UNITS);
        match variant {
            ArqVariant::StopAndWait => Self {
                variant,
                window_size: 1,
                timeout,
                feedback: Feedback::ReAck,
                recovery: Recovery::ImmediateResend,
            },
            ArqVariant::AlternatingBit => Self {
                variant,
                window_size: 1,
                timeout,
                feedback: Feedback::Nak,
                recovery: Recovery::ImmediateResend,
            },
            ArqVariant::GoBackN => Self {
                variant,
                window_size: DEFAULT_WINDOW_SIZE,
                timeout,
                feedback: Feedback::ReAck,
                recovery: Recovery::TimeoutOnly,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if !self.is_windowed() && self.window_size != 1 {
            return Err(ConfigError::SingleSlotWindow(
                self.variant.name(),
                self.window_size,
            ));
        }
        if self.timeout == SimTime::ZERO {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// 是否为滑动窗口（累计确认）模式
    pub fn is_windowed(&self) -> bool {
        self.variant == ArqVariant::GoBackN
    }

    /// 序号空间是否足以区分乱序到达的旧副本；交替位只有 0/1 两个序号。
    pub fn tolerates_reordering(&self) -> bool {
        self.variant != ArqVariant::AlternatingBit
    }

    /// 下一个序号。交替位显式取模切换，避免 `x = x++ % 2` 式的空操作。
    pub fn next_seq(&self, seq: i32) -> i32 {
        match self.variant {
            ArqVariant::AlternatingBit => (seq + 1) % 2,
            _ => seq.wrapping_add(1),
        }
    }
}
