//! 运行结束时的统计汇总

use std::fmt;

use serde::Serialize;

use super::stats::ChannelStats;
use crate::arq::{ArqVariant, ReceiverStats, SenderStats};

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub protocol: ArqVariant,
    /// 结束时的仿真时间（时间单位）
    pub sim_time: f64,
    pub messages_generated: u64,
    pub average_rtt: f64,
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
    pub channel: ChannelStats,
}

impl Summary {
    /// 两端收到的损坏报文总数
    pub fn corrupt_received(&self) -> u64 {
        self.sender.corrupt_received + self.receiver.corrupt_received
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics")?;
        writeln!(f, "Protocol: {}", self.protocol.name())?;
        writeln!(f, "Number of packets transmitted: {}", self.sender.transmitted)?;
        writeln!(f, "Number of re-transmissions: {}", self.sender.retransmissions)?;
        writeln!(f, "Number of ACK packets: {}", self.sender.acks_received)?;
        writeln!(f, "Number of corrupt packets: {}", self.corrupt_received())?;
        writeln!(f, "Number of packets dropped: {}", self.sender.dropped)?;
        writeln!(f, "Average RTT: {:.3}", self.average_rtt)?;
        writeln!(
            f,
            "Messages generated/delivered: {}/{}",
            self.messages_generated, self.receiver.delivered
        )?;
        write!(
            f,
            "Channel: sent={}, lost={}, corrupted={}, simulated_time={:.3}",
            self.channel.to_layer3, self.channel.lost, self.channel.corrupted, self.sim_time
        )
    }
}
