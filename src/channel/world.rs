//! ARQ 仿真世界
//!
//! 持有信道、两个端点和 A 端应用层消息源。

use std::any::Any;

use super::unreliable::{Channel, ChannelConfig};
use crate::arq::{ArqConfig, Message, Receiver, Sender, MAX_DATA_SIZE};
use crate::sim::World;

/// A 端应用层：按编号生成消息，第 n 条为 20 个 `'a' + n % 26`。
#[derive(Debug, Clone)]
pub struct AppLayer {
    pub num_messages: u64,
    pub generated: u64,
    /// 平均消息间隔（时间单位）
    pub message_interval: f64,
}

impl AppLayer {
    pub fn new(num_messages: u64, message_interval: f64) -> Self {
        Self {
            num_messages,
            generated: 0,
            message_interval,
        }
    }

    pub fn has_more(&self) -> bool {
        self.generated < self.num_messages
    }

    /// 生成下一条消息；已达上限时返回 None。
    pub fn next_message(&mut self) -> Option<Message> {
        if !self.has_more() {
            return None;
        }
        let n = self.generated;
        self.generated += 1;
        let message = Message::new(message_body(n)).ok()?;
        Some(message)
    }
}

/// 第 n 条消息的内容
pub fn message_body(n: u64) -> String {
    let c = char::from(b'a' + (n % 26) as u8);
    std::iter::repeat_n(c, MAX_DATA_SIZE).collect()
}

pub struct ArqWorld {
    pub channel: Channel,
    pub sender: Sender,
    pub receiver: Receiver,
    pub app: AppLayer,
}

impl ArqWorld {
    pub fn new(arq: ArqConfig, channel: ChannelConfig, app: AppLayer) -> Self {
        Self {
            channel: Channel::new(channel),
            sender: Sender::new(arq.clone()),
            receiver: Receiver::new(arq),
            app,
        }
    }

    /// 两端 init 回调
    pub fn init(&mut self) {
        self.sender.init();
        self.receiver.init();
    }
}

impl World for ArqWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
