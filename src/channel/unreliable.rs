//! 不可靠信道
//!
//! 按配置概率丢包、损坏报文并引入随机时延；同时负责两端定时器的簿记。
//! 信道故障都是预期行为，从不作为错误上抛。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use super::events::{PacketArrival, TimerExpiry};
use super::side::Side;
use super::stats::ChannelStats;
use crate::arq::Packet;
use crate::sim::{SimTime, Simulator};
use crate::trace::{TraceEventKind, TraceLogger, TracePacket};

/// 损坏时写入 seq/ack 字段的值
pub const CORRUPT_FIELD_VALUE: i32 = 999_999;

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// 丢包概率 [0, 1]
    pub loss: f64,
    /// 损坏概率 [0, 1]（针对未丢失的报文）
    pub corrupt: f64,
    /// 平均单向时延（时间单位）
    pub avg_delay: f64,
    /// 允许后发的报文先到
    pub reorder: bool,
    pub seed: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            loss: 0.0,
            corrupt: 0.0,
            avg_delay: 5.0,
            reorder: false,
            seed: 1,
        }
    }
}

#[derive(Debug)]
pub struct Channel {
    cfg: ChannelConfig,
    rng: StdRng,
    /// 发往每一端的最晚到达时间（用于保持 FIFO）
    last_arrival: [SimTime; 2],
    /// 每端当前有效定时器的编号
    timers: [Option<u64>; 2],
    next_timer_id: u64,
    pub stats: ChannelStats,
    /// B 端应用层收到的载荷（按交付顺序）
    pub delivered: Vec<String>,
    pub trace: Option<TraceLogger>,
}

impl Channel {
    pub fn new(cfg: ChannelConfig) -> Self {
        let rng = StdRng::seed_from_u64(cfg.seed);
        Self {
            cfg,
            rng,
            last_arrival: [SimTime::ZERO; 2],
            timers: [None; 2],
            next_timer_id: 0,
            stats: ChannelStats::default(),
            delivered: Vec::new(),
            trace: None,
        }
    }

    /// [0, 1) 均匀分布
    pub(crate) fn uniform(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    pub fn timer_active(&self, side: Side) -> bool {
        self.timers[side.index()].is_some()
    }

    pub(crate) fn record(&mut self, now: SimTime, side: Side, kind: TraceEventKind) {
        if let Some(t) = self.trace.as_mut() {
            t.record(now, side, kind);
        }
    }

    /// 把报文交给信道：可能丢失、损坏，否则在随机时延后到达对端。
    #[tracing::instrument(skip(self, pkt, sim), fields(seq = pkt.seq, ack = pkt.ack))]
    pub fn send_packet(&mut self, from: Side, pkt: Packet, sim: &mut Simulator) {
        let now = sim.now();
        self.stats.to_layer3 += 1;
        self.record(now, from, TraceEventKind::PacketSent(TracePacket::from(&pkt)));

        if self.uniform() < self.cfg.loss {
            self.stats.lost += 1;
            debug!("💥 报文丢失");
            self.record(now, from, TraceEventKind::PacketLost(TracePacket::from(&pkt)));
            return;
        }

        let pkt = if self.uniform() < self.cfg.corrupt {
            self.stats.corrupted += 1;
            let bad = self.corrupt_copy(&pkt);
            debug!(corrupted = %bad, "⚡ 报文损坏");
            self.record(now, from, TraceEventKind::PacketCorrupted(TracePacket::from(&bad)));
            bad
        } else {
            pkt
        };

        let to = from.peer();
        let delay = SimTime::from_units(1.0 + 2.0 * self.cfg.avg_delay * self.uniform());
        let depart = if self.cfg.reorder {
            now
        } else {
            now.max(self.last_arrival[to.index()])
        };
        let arrive = depart.saturating_add(delay);
        let slot = &mut self.last_arrival[to.index()];
        *slot = (*slot).max(arrive);

        trace!(?to, arrive = arrive.as_units(), "调度报文到达事件");
        sim.schedule(arrive, PacketArrival { to, pkt });
    }

    /// 生成损坏副本：3/4 改载荷首字符，其余改 seq 或 ack 字段。
    fn corrupt_copy(&mut self, pkt: &Packet) -> Packet {
        let x = self.uniform();
        if x < 0.75 {
            let mut chars = pkt.payload.chars();
            chars.next();
            let payload = format!("?{}", chars.as_str());
            Packet::with_checksum(pkt.seq, pkt.ack, pkt.checksum, payload)
        } else if x < 0.875 {
            Packet::with_checksum(CORRUPT_FIELD_VALUE, pkt.ack, pkt.checksum, pkt.payload.clone())
        } else {
            Packet::with_checksum(pkt.seq, CORRUPT_FIELD_VALUE, pkt.checksum, pkt.payload.clone())
        }
    }

    /// 启动定时器；若该端已有定时器在运行则忽略并告警。
    pub fn start_timer(&mut self, side: Side, after: SimTime, sim: &mut Simulator) {
        let now = sim.now();
        if self.timers[side.index()].is_some() {
            self.stats.timer_violations += 1;
            warn!(?side, "尝试启动一个已在运行的定时器，忽略");
            self.record(
                now,
                side,
                TraceEventKind::TimerViolation {
                    reason: "start while running".to_string(),
                },
            );
            return;
        }
        let id = self.next_timer_id;
        self.next_timer_id = self.next_timer_id.wrapping_add(1);
        self.timers[side.index()] = Some(id);

        let expires_at = now.saturating_add(after);
        self.record(
            now,
            side,
            TraceEventKind::TimerStarted {
                expires_at: expires_at.as_units(),
            },
        );
        trace!(?side, id, expires_at = expires_at.as_units(), "启动定时器");
        sim.schedule(expires_at, TimerExpiry { side, id });
    }

    /// 停止定时器；已调度的超时事件因编号失效而被忽略。
    pub fn stop_timer(&mut self, side: Side, now: SimTime) {
        if self.timers[side.index()].take().is_none() {
            self.stats.timer_violations += 1;
            warn!(?side, "尝试停止一个未运行的定时器");
            self.record(
                now,
                side,
                TraceEventKind::TimerViolation {
                    reason: "stop while idle".to_string(),
                },
            );
            return;
        }
        trace!(?side, "停止定时器");
        self.record(now, side, TraceEventKind::TimerStopped);
    }

    /// 超时事件到期：仍是当前定时器时清除并返回 true。
    pub(crate) fn fire_timer(&mut self, side: Side, id: u64) -> bool {
        let slot = &mut self.timers[side.index()];
        if *slot == Some(id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn deliver_to_app(&mut self, side: Side, payload: &str, now: SimTime) {
        self.stats.delivered_to_app += 1;
        info!(?side, payload, "📬 交付给应用层");
        self.record(
            now,
            side,
            TraceEventKind::DeliveredToApp {
                payload: payload.to_string(),
            },
        );
        self.delivered.push(payload.to_string());
    }
}

/// 绑定了仿真器的信道句柄，供端点回调使用。
pub struct ChannelCtx<'a> {
    pub channel: &'a mut Channel,
    pub sim: &'a mut Simulator,
}

impl<'a> ChannelCtx<'a> {
    pub fn new(channel: &'a mut Channel, sim: &'a mut Simulator) -> Self {
        Self { channel, sim }
    }
}

impl super::ChannelApi for ChannelCtx<'_> {
    fn now(&self) -> SimTime {
        self.sim.now()
    }

    fn send_packet(&mut self, from: Side, pkt: Packet) {
        self.channel.send_packet(from, pkt, self.sim);
    }

    fn start_timer(&mut self, side: Side, after: SimTime) {
        self.channel.start_timer(side, after, self.sim);
    }

    fn stop_timer(&mut self, side: Side) {
        self.channel.stop_timer(side, self.sim.now());
    }

    fn deliver_to_app(&mut self, side: Side, payload: &str) {
        self.channel.deliver_to_app(side, payload, self.sim.now());
    }
}
