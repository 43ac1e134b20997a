use serde::{Deserialize, Serialize};

use crate::arq::{ArqConfig, ArqVariant, Packet};
use crate::channel::{ChannelConfig, Side};
use crate::sim::SimTime;

/// 轨迹事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// 运行参数（作为 t=0 的第一条事件）
    Meta {
        protocol: ArqVariant,
        window_size: usize,
        timeout: f64,
        loss: f64,
        corrupt: f64,
        avg_delay: f64,
        reorder: bool,
        seed: u64,
    },
    /// 应用层交来一条消息（是否被发送端接受）
    AppMessage { payload: String, accepted: bool },
    /// 端点把报文交给信道
    PacketSent(TracePacket),
    /// 信道丢弃报文
    PacketLost(TracePacket),
    /// 信道损坏报文（记录损坏后的内容）
    PacketCorrupted(TracePacket),
    /// 报文到达端点
    PacketArrived(TracePacket),
    DeliveredToApp { payload: String },
    TimerStarted { expires_at: f64 },
    TimerStopped,
    TimerExpired,
    /// 定时器使用违约（重复启动/停止空闲定时器）
    TimerViolation { reason: String },
}

impl TraceEventKind {
    pub fn meta(arq: &ArqConfig, channel: &ChannelConfig) -> Self {
        TraceEventKind::Meta {
            protocol: arq.variant,
            window_size: arq.window_size,
            timeout: arq.timeout.as_units(),
            loss: channel.loss,
            corrupt: channel.corrupt,
            avg_delay: channel.avg_delay,
            reorder: channel.reorder,
            seed: channel.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracePacket {
    pub seq: i32,
    pub ack: i32,
    pub checksum: i32,
    pub payload: String,
}

impl From<&Packet> for TracePacket {
    fn from(pkt: &Packet) -> Self {
        Self {
            seq: pkt.seq,
            ack: pkt.ack,
            checksum: pkt.checksum,
            payload: pkt.payload.clone(),
        }
    }
}

/// 一条轨迹事件（JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（时间单位）
    pub t: f64,
    pub side: Side,
    #[serde(flatten)]
    pub kind: TraceEventKind,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct TraceLogger {
    pub events: Vec<TraceEvent>,
}

impl TraceLogger {
    pub fn push(&mut self, ev: TraceEvent) {
        self.events.push(ev);
    }

    pub fn record(&mut self, now: SimTime, side: Side, kind: TraceEventKind) {
        self.push(TraceEvent {
            t: now.as_units(),
            side,
            kind,
        });
    }
}
