//! 报文与校验和
//!
//! 收发两端共享的纯函数：校验和计算、损坏检测，以及报文/消息的值类型。
//! 校验和只是 `seq + ack + Σ payload 字节` 的环绕求和，无法区分损坏与篡改；
//! 信道是唯一的损坏来源。

use std::fmt;

use thiserror::Error;

/// 消息/报文载荷的最大长度（字节）
pub const MAX_DATA_SIZE: usize = 20;

/// ack 字段：肯定确认
pub const ACK: i32 = 1;
/// ack 字段：否定确认（NAK）
pub const NAK: i32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("message payload is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// 应用层消息：创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    data: String,
}

impl Message {
    pub fn new(data: impl Into<String>) -> Result<Self, MessageError> {
        let data = data.into();
        if data.len() > MAX_DATA_SIZE {
            return Err(MessageError::TooLong {
                len: data.len(),
                max: MAX_DATA_SIZE,
            });
        }
        Ok(Self { data })
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// 从自己封装出的数据报文还原消息；载荷长度已在构造消息时检查过。
    pub(crate) fn from_payload(pkt: &Packet) -> Self {
        Self {
            data: pkt.payload.clone(),
        }
    }
}

/// 线上报文。按值复制，构造后不再修改：发出去的副本与缓存中的副本互不影响。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub seq: i32,
    pub ack: i32,
    pub checksum: i32,
    pub payload: String,
}

impl Packet {
    /// 构造报文并计算校验和
    pub fn new(seq: i32, ack: i32, payload: impl Into<String>) -> Self {
        let payload = payload.into();
        let checksum = checksum(seq, ack, &payload);
        Self {
            seq,
            ack,
            checksum,
            payload,
        }
    }

    /// 按给定字段原样构造（校验和可能与内容不一致）
    pub fn with_checksum(seq: i32, ack: i32, checksum: i32, payload: impl Into<String>) -> Self {
        Self {
            seq,
            ack,
            checksum,
            payload: payload.into(),
        }
    }

    /// 由消息封装数据报文
    pub fn from_message(seq: i32, message: &Message) -> Self {
        Self::new(seq, ACK, message.data())
    }

    pub fn is_ack(&self) -> bool {
        self.ack == ACK
    }

    pub fn is_nak(&self) -> bool {
        self.ack == NAK
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seq={} ack={} checksum={} payload={:?}",
            self.seq, self.ack, self.checksum, self.payload
        )
    }
}

/// 校验和：`seq`、`ack` 与每个载荷字节的环绕求和。
pub fn checksum(seq: i32, ack: i32, payload: &str) -> i32 {
    payload
        .bytes()
        .fold(seq.wrapping_add(ack), |sum, b| sum.wrapping_add(i32::from(b)))
}

/// 用报文自身字段重新计算校验和，与携带的校验和不一致即视为损坏。
pub fn is_corrupt(packet: &Packet) -> bool {
    checksum(packet.seq, packet.ack, &packet.payload) != packet.checksum
}
