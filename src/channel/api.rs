//! Channel-facing API used by the protocol endpoints.

use crate::arq::Packet;
use crate::sim::SimTime;

use super::Side;

/// Minimal channel API for ARQ endpoints.
///
/// 端点通过它发送报文、启停定时器、向应用层交付；信道负责丢包/损坏/时延注入
/// 与定时器簿记。每一端同一时刻最多一个定时器。
pub trait ChannelApi {
    fn now(&self) -> SimTime;
    fn send_packet(&mut self, from: Side, pkt: Packet);
    fn start_timer(&mut self, side: Side, after: SimTime);
    fn stop_timer(&mut self, side: Side);
    fn deliver_to_app(&mut self, side: Side, payload: &str);
}
