//! 接收端（B）状态机
//!
//! 只按序交付未损坏的报文，每个载荷恰好交付一次。
//! 确认编号：窗口模式发送累计 ACK，携带“下一个期望序号”（ACK s 确认所有 < s 的报文）；
//! 单槽模式确认刚接收的序号。损坏或乱序报文不交付，回复最近一次 ACK 或 NAK。

use tracing::{debug, info};

use super::codec::{is_corrupt, Packet, ACK, NAK};
use super::config::{ArqConfig, Feedback};
use super::stats::ReceiverStats;
use crate::channel::{ChannelApi, Side};

/// 尚未确认过任何报文
pub const NO_ACK_YET: i32 = -1;

#[derive(Debug)]
pub struct Receiver {
    cfg: ArqConfig,
    expected_seq: i32,
    last_ack_seq: i32,
    stats: ReceiverStats,
}

impl Receiver {
    pub fn new(cfg: ArqConfig) -> Self {
        Self {
            cfg,
            expected_seq: 0,
            last_ack_seq: NO_ACK_YET,
            stats: ReceiverStats::default(),
        }
    }

    pub fn init(&mut self) {
        *self = Self::new(self.cfg.clone());
        debug!(variant = self.cfg.variant.name(), "接收端初始化");
    }

    pub fn expected_seq(&self) -> i32 {
        self.expected_seq
    }

    pub fn last_ack_seq(&self) -> i32 {
        self.last_ack_seq
    }

    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }

    /// 来自 A 的数据报文到达。
    #[tracing::instrument(skip(self, pkt, ch), fields(seq = pkt.seq, expected = self.expected_seq))]
    pub fn on_packet(&mut self, pkt: Packet, ch: &mut dyn ChannelApi) {
        if is_corrupt(&pkt) {
            self.stats.corrupt_received += 1;
            match self.cfg.feedback {
                Feedback::ReAck => {
                    debug!(last_ack = self.last_ack_seq, "⚠️ 损坏报文，重发上次 ACK");
                    self.send_ack(self.last_ack_seq, ch);
                }
                Feedback::Nak => {
                    debug!("⚠️ 损坏报文，回复 NAK");
                    self.send_nak(ch);
                }
            }
            return;
        }

        if pkt.seq != self.expected_seq {
            self.stats.duplicates += 1;
            debug!(last_ack = self.last_ack_seq, "乱序或重复报文，重发上次 ACK");
            self.send_ack(self.last_ack_seq, ch);
            return;
        }

        ch.deliver_to_app(Side::B, &pkt.payload);
        self.stats.delivered += 1;

        self.expected_seq = self.cfg.next_seq(self.expected_seq);
        self.last_ack_seq = if self.cfg.is_windowed() {
            self.expected_seq
        } else {
            pkt.seq
        };
        info!(
            ack = self.last_ack_seq,
            next_expected = self.expected_seq,
            "📥 交付载荷并确认"
        );
        self.send_ack(self.last_ack_seq, ch);
    }

    fn send_ack(&mut self, seq: i32, ch: &mut dyn ChannelApi) {
        self.stats.acks_sent += 1;
        ch.send_packet(Side::B, Packet::new(seq, ACK, ""));
    }

    fn send_nak(&mut self, ch: &mut dyn ChannelApi) {
        self.stats.naks_sent += 1;
        ch.send_packet(Side::B, Packet::new(self.expected_seq, NAK, ""));
    }
}
