//! 事件轨迹记录（用于离线分析/回放）
//!
//! 设计目标：
//! - **结构化**：用 JSON 事件而不是解析文本日志
//! - **轻量**：只在内存中收集，仿真结束后一次性写出
//! - **完整**：覆盖报文收发、丢失/损坏、定时器与应用层交付

mod types;

pub use types::{TraceEvent, TraceEventKind, TraceLogger, TracePacket};
