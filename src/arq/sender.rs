//! 发送端（A）状态机
//!
//! 每个在途报文的生命周期：`Idle → Sent → {Acked, TimedOut → Sent}`。
//!
//! - 窗口模式（回退 N）：缓存恰好保存序号落在 `[base, next_seq)` 的报文，
//!   `next_seq - base <= window_size`；累计 ACK 滑动窗口，超时重传整个窗口。
//!   损坏或过期的 ACK 一律忽略，由超时驱动恢复。
//! - 单槽模式（停等 / 交替位）：同一时刻至多一个在途报文，状态显式记录在
//!   [`SlotState`] 中；重复/不匹配/损坏的确认可按配置立即从缓存重传。
//!
//! 本模块只管理状态；所有收发与定时器操作都经由 [`ChannelApi`]。

use std::collections::VecDeque;

use tracing::{debug, info, trace};

use super::codec::{is_corrupt, Message, Packet};
use super::config::{ArqConfig, Recovery};
use super::stats::SenderStats;
use crate::channel::{ChannelApi, Side};
use crate::sim::SimTime;

/// 单槽发送端的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// 无在途报文，可接受下一条应用消息
    Idle,
    /// 报文已发出，等待确认
    AwaitingAck(Packet),
    /// 对端已表示拒收，等下一次超时时重新封装并发送
    PendingResend(Message),
}

/// 应用消息的处理结果。被丢弃的消息不会再被投递，调用方不能假定成功。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(i32),
    Dropped,
}

#[derive(Debug)]
pub struct Sender {
    cfg: ArqConfig,
    /// 最早未确认报文的序号（左窗口边）
    base: i32,
    /// 下一个新报文使用的序号
    next_seq: i32,
    /// 未确认报文缓存（front = 最早）
    cache: VecDeque<Packet>,
    slot: SlotState,
    /// 是否有一个由本端启动、尚未停止/触发的定时器
    timer_armed: bool,
    last_send_at: SimTime,
    stats: SenderStats,
}

impl Sender {
    pub fn new(cfg: ArqConfig) -> Self {
        let cache = VecDeque::with_capacity(cfg.window_size);
        Self {
            cfg,
            base: 0,
            next_seq: 0,
            cache,
            slot: SlotState::Idle,
            timer_armed: false,
            last_send_at: SimTime::ZERO,
            stats: SenderStats::default(),
        }
    }

    /// 重置全部序号、缓存、定时器标记和统计。
    pub fn init(&mut self) {
        *self = Self::new(self.cfg.clone());
        debug!(variant = self.cfg.variant.name(), "发送端初始化");
    }

    pub fn base(&self) -> i32 {
        self.base
    }

    pub fn next_seq(&self) -> i32 {
        self.next_seq
    }

    /// 尚未被确认的报文数
    pub fn in_flight(&self) -> usize {
        if self.cfg.is_windowed() {
            self.cache.len()
        } else {
            match self.slot {
                SlotState::Idle => 0,
                _ => 1,
            }
        }
    }

    /// 窗口中的缓存报文（从旧到新）
    pub fn cached(&self) -> impl Iterator<Item = &Packet> {
        self.cache.iter()
    }

    pub fn state(&self) -> &SlotState {
        &self.slot
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer_armed
    }

    pub fn stats(&self) -> &SenderStats {
        &self.stats
    }

    /// 应用层有消息要发送。
    #[tracing::instrument(skip(self, message, ch), fields(payload = message.data()))]
    pub fn on_app_message(&mut self, message: Message, ch: &mut dyn ChannelApi) -> SendOutcome {
        if self.cfg.is_windowed() {
            self.send_windowed(message, ch)
        } else {
            self.send_single_slot(message, ch)
        }
    }

    fn send_windowed(&mut self, message: Message, ch: &mut dyn ChannelApi) -> SendOutcome {
        if self.cache.len() >= self.cfg.window_size {
            self.stats.dropped += 1;
            info!(
                base = self.base,
                next_seq = self.next_seq,
                window = self.cfg.window_size,
                "🚫 窗口已满，丢弃消息"
            );
            return SendOutcome::Dropped;
        }

        let seq = self.next_seq;
        let pkt = Packet::from_message(seq, &message);
        self.cache.push_back(pkt.clone());
        self.transmit(pkt, ch);
        self.stats.transmitted += 1;
        self.next_seq = self.next_seq.wrapping_add(1);
        debug!(seq, in_flight = self.cache.len(), "📤 发送数据报文");

        // 定时器始终对应最早的未确认报文
        if !self.timer_armed {
            self.arm_timer(ch);
        }
        SendOutcome::Sent(seq)
    }

    fn send_single_slot(&mut self, message: Message, ch: &mut dyn ChannelApi) -> SendOutcome {
        if self.slot != SlotState::Idle {
            self.stats.dropped += 1;
            info!(seq = self.next_seq, "🚫 已有在途报文，丢弃消息");
            return SendOutcome::Dropped;
        }

        let seq = self.next_seq;
        let pkt = Packet::from_message(seq, &message);
        self.slot = SlotState::AwaitingAck(pkt.clone());
        self.transmit(pkt, ch);
        self.stats.transmitted += 1;
        debug!(seq, "📤 发送数据报文");
        self.arm_timer(ch);
        SendOutcome::Sent(seq)
    }

    /// 来自 B 的报文（ACK/NAK）到达。
    #[tracing::instrument(skip(self, pkt, ch), fields(seq = pkt.seq, ack = pkt.ack))]
    pub fn on_packet(&mut self, pkt: Packet, ch: &mut dyn ChannelApi) {
        // 只有一个在途报文时才是真实 RTT；窗口模式下是近似值
        let sample = ch.now().saturating_sub(self.last_send_at).as_units();
        self.stats.record_rtt(sample);

        if is_corrupt(&pkt) {
            self.stats.corrupt_received += 1;
            if self.cfg.is_windowed() {
                debug!("⚠️ 收到损坏报文，等待超时");
            } else {
                debug!("⚠️ 收到损坏报文");
                self.on_rejection(ch);
            }
            return;
        }

        if self.cfg.is_windowed() {
            self.on_cumulative_ack(pkt, ch);
        } else {
            self.on_slot_ack(pkt, ch);
        }
    }

    fn on_cumulative_ack(&mut self, pkt: Packet, ch: &mut dyn ChannelApi) {
        let ack = pkt.seq;
        if !pkt.is_ack() || ack <= self.base || ack > self.next_seq {
            self.stats.stale_acks += 1;
            debug!(
                base = self.base,
                next_seq = self.next_seq,
                "过期或越界的确认，忽略"
            );
            return;
        }

        let newly_acked = (ack - self.base) as usize;
        for _ in 0..newly_acked {
            if let Some(evicted) = self.cache.pop_front() {
                trace!(seq = evicted.seq, "移出已确认报文");
            }
        }
        self.base = ack;
        self.stats.acks_received += 1;

        self.disarm_timer(ch);
        if !self.cache.is_empty() {
            self.arm_timer(ch);
        }
        info!(
            base = self.base,
            next_seq = self.next_seq,
            newly_acked,
            "✅ 累计确认，窗口前移"
        );
    }

    fn on_slot_ack(&mut self, pkt: Packet, ch: &mut dyn ChannelApi) {
        if self.slot == SlotState::Idle {
            self.stats.stale_acks += 1;
            debug!("无在途报文，忽略确认");
            return;
        }

        if pkt.is_ack() && pkt.seq == self.next_seq {
            self.disarm_timer(ch);
            self.slot = SlotState::Idle;
            self.stats.acks_received += 1;
            self.next_seq = self.cfg.next_seq(self.next_seq);
            self.base = self.next_seq;
            info!(next_seq = self.next_seq, "✅ 收到确认");
        } else {
            debug!(expected = self.next_seq, "重复或否定确认");
            self.on_rejection(ch);
        }
    }

    /// 单槽模式下对端拒收（NAK、重复 ACK 或损坏的确认）
    fn on_rejection(&mut self, ch: &mut dyn ChannelApi) {
        match self.cfg.recovery {
            Recovery::ImmediateResend => self.resend_slot(ch),
            Recovery::TimeoutOnly => {
                if let SlotState::AwaitingAck(pkt) = &self.slot {
                    self.slot = SlotState::PendingResend(Message::from_payload(pkt));
                    debug!("标记待重传，等待超时");
                }
            }
        }
    }

    fn resend_slot(&mut self, ch: &mut dyn ChannelApi) {
        let pkt = match &self.slot {
            SlotState::Idle => {
                trace!("无在途报文，无需重传");
                return;
            }
            SlotState::AwaitingAck(pkt) => pkt.clone(),
            SlotState::PendingResend(message) => Packet::from_message(self.next_seq, message),
        };
        self.slot = SlotState::AwaitingAck(pkt.clone());
        info!(seq = pkt.seq, "🔁 从缓存重传");
        self.transmit(pkt, ch);
        self.stats.retransmissions += 1;
        self.arm_timer(ch);
    }

    /// A 端定时器超时。
    #[tracing::instrument(skip(self, ch), fields(base = self.base, next_seq = self.next_seq))]
    pub fn on_timer(&mut self, ch: &mut dyn ChannelApi) {
        // 触发即失效
        self.timer_armed = false;

        if !self.cfg.is_windowed() {
            info!("⏰ 超时");
            self.resend_slot(ch);
            return;
        }

        if self.cache.is_empty() {
            debug!("⏰ 超时但窗口为空");
            return;
        }
        info!(in_flight = self.cache.len(), "⏰ 超时，重传整个窗口");
        for pkt in &self.cache {
            trace!(seq = pkt.seq, "重传");
            ch.send_packet(Side::A, pkt.clone());
        }
        self.last_send_at = ch.now();
        self.stats.retransmissions += self.cache.len() as u64;
        self.arm_timer(ch);
    }

    fn transmit(&mut self, pkt: Packet, ch: &mut dyn ChannelApi) {
        self.last_send_at = ch.now();
        ch.send_packet(Side::A, pkt);
    }

    /// 启动定时器；若仍有一个在运行则先停止，保证同时最多一个。
    fn arm_timer(&mut self, ch: &mut dyn ChannelApi) {
        if self.timer_armed {
            ch.stop_timer(Side::A);
        }
        ch.start_timer(Side::A, self.cfg.timeout);
        self.timer_armed = true;
    }

    fn disarm_timer(&mut self, ch: &mut dyn ChannelApi) {
        if self.timer_armed {
            ch.stop_timer(Side::A);
            self.timer_armed = false;
        }
    }
}
