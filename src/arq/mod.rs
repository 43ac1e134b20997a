//! ARQ 协议核心
//!
//! 一对参数化的端点（发送端 A / 接收端 B）加上共享的报文编解码。
//! 端点只通过 [`crate::channel::ChannelApi`] 与信道交互，不直接接触事件队列。

pub mod codec;
pub mod config;
pub mod receiver;
pub mod sender;
pub mod stats;

pub use codec::{checksum, is_corrupt, Message, MessageError, Packet, ACK, MAX_DATA_SIZE, NAK};
pub use config::{ArqConfig, ArqVariant, ConfigError, Feedback, Recovery};
pub use receiver::Receiver;
pub use sender::{SendOutcome, Sender, SlotState};
pub use stats::{ReceiverStats, SenderStats};
