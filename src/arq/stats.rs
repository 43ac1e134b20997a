//! 端点统计
//!
//! 计数器只增不减，外部只读；平均 RTT 按需计算。

use serde::Serialize;

/// 发送端（A）统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SenderStats {
    /// 首次发送的数据报文数
    pub transmitted: u64,
    /// 重传报文数（超时或否定信号触发）
    pub retransmissions: u64,
    /// 推进了发送状态的有效 ACK 数
    pub acks_received: u64,
    /// 收到的损坏报文数
    pub corrupt_received: u64,
    /// 过期/越界的确认（未损坏但不推进状态）
    pub stale_acks: u64,
    /// 因窗口满或槽位占用而丢弃的应用消息数
    pub dropped: u64,
    /// RTT 样本累计（时间单位）
    pub total_rtt: f64,
    pub rtt_samples: u64,
}

impl SenderStats {
    /// 平均 RTT；没有样本时为 0
    pub fn average_rtt(&self) -> f64 {
        if self.rtt_samples == 0 {
            0.0
        } else {
            self.total_rtt / self.rtt_samples as f64
        }
    }

    pub(crate) fn record_rtt(&mut self, sample: f64) {
        self.total_rtt += sample;
        self.rtt_samples += 1;
    }
}

/// 接收端（B）统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiverStats {
    /// 交付给应用层的载荷数
    pub delivered: u64,
    /// 乱序/重复到达（发送端重传所致）
    pub duplicates: u64,
    pub corrupt_received: u64,
    pub acks_sent: u64,
    pub naks_sent: u64,
}
