//! 测试用的记录型信道：不调度任何事件，只记录端点的调用。

use crate::arq::Packet;
use crate::channel::{ChannelApi, Side};
use crate::sim::SimTime;

#[derive(Debug, Default)]
pub struct RecordingChannel {
    pub now: SimTime,
    pub sent: Vec<(Side, Packet)>,
    pub delivered: Vec<String>,
    /// 当前运行中的定时器（A, B）
    pub timers: [Option<SimTime>; 2],
    pub timer_starts: usize,
    pub timer_stops: usize,
    pub violations: usize,
}

impl RecordingChannel {
    pub fn timer_running(&self, side: Side) -> bool {
        self.timers[side.index()].is_some()
    }

    /// 模拟定时器到期：清除后由调用方触发端点回调
    pub fn expire(&mut self, side: Side) {
        assert!(
            self.timers[side.index()].take().is_some(),
            "no timer running on {side:?}"
        );
    }

    pub fn take_sent(&mut self) -> Vec<Packet> {
        self.sent.drain(..).map(|(_, p)| p).collect()
    }

    pub fn sent_seqs(&self) -> Vec<i32> {
        self.sent.iter().map(|(_, p)| p.seq).collect()
    }
}

impl ChannelApi for RecordingChannel {
    fn now(&self) -> SimTime {
        self.now
    }

    fn send_packet(&mut self, from: Side, pkt: Packet) {
        self.sent.push((from, pkt));
    }

    fn start_timer(&mut self, side: Side, after: SimTime) {
        let slot = &mut self.timers[side.index()];
        if slot.is_some() {
            self.violations += 1;
            return;
        }
        *slot = Some(self.now.saturating_add(after));
        self.timer_starts += 1;
    }

    fn stop_timer(&mut self, side: Side) {
        if self.timers[side.index()].take().is_none() {
            self.violations += 1;
            return;
        }
        self.timer_stops += 1;
    }

    fn deliver_to_app(&mut self, _side: Side, payload: &str) {
        self.delivered.push(payload.to_string());
    }
}

pub fn msg(data: &str) -> crate::arq::Message {
    crate::arq::Message::new(data).expect("test message fits")
}

pub fn ack(seq: i32) -> Packet {
    Packet::new(seq, crate::arq::ACK, "")
}
