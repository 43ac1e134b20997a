//! 信道事件
//!
//! 报文到达、定时器超时、应用层产生新消息。事件执行时取出 [`ArqWorld`]，
//! 把信道句柄交给对应端点的回调。

use tracing::{debug, info, warn};

use super::side::Side;
use super::unreliable::ChannelCtx;
use super::world::ArqWorld;
use crate::arq::{Packet, SendOutcome};
use crate::sim::{Event, SimTime, Simulator, World};
use crate::trace::{TraceEventKind, TracePacket};

fn arq_world(world: &mut dyn World) -> &mut ArqWorld {
    world
        .as_any_mut()
        .downcast_mut::<ArqWorld>()
        .expect("world must be ArqWorld")
}

/// 事件：报文到达某一端。
#[derive(Debug)]
pub struct PacketArrival {
    pub to: Side,
    pub pkt: Packet,
}

impl Event for PacketArrival {
    #[tracing::instrument(skip(self, sim, world), fields(to = ?self.to, seq = self.pkt.seq))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let PacketArrival { to, pkt } = *self;
        let w = arq_world(world);
        w.channel.stats.arrived += 1;
        w.channel.record(
            sim.now(),
            to,
            TraceEventKind::PacketArrived(TracePacket::from(&pkt)),
        );
        debug!(pkt = %pkt, "📨 报文到达");

        let ArqWorld {
            channel,
            sender,
            receiver,
            ..
        } = w;
        let mut ctx = ChannelCtx::new(channel, sim);
        match to {
            Side::A => sender.on_packet(pkt, &mut ctx),
            Side::B => receiver.on_packet(pkt, &mut ctx),
        }
    }
}

/// 事件：某一端的定时器到期。`id` 不再是当前定时器时（已被停止）直接忽略。
#[derive(Debug)]
pub struct TimerExpiry {
    pub side: Side,
    pub id: u64,
}

impl Event for TimerExpiry {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let TimerExpiry { side, id } = *self;
        let w = arq_world(world);
        if !w.channel.fire_timer(side, id) {
            debug!(?side, id, "过期的定时器事件，忽略");
            return;
        }
        w.channel.record(sim.now(), side, TraceEventKind::TimerExpired);

        let ArqWorld {
            channel, sender, ..
        } = w;
        match side {
            Side::A => sender.on_timer(&mut ChannelCtx::new(channel, sim)),
            Side::B => warn!("B 端不应启动定时器"),
        }
    }
}

/// 事件：A 端应用层产生一条新消息，并调度下一条。
#[derive(Debug)]
pub struct AppMessageArrival;

impl Event for AppMessageArrival {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = arq_world(world);
        let Some(message) = w.app.next_message() else {
            return;
        };
        let payload = message.data().to_string();

        let outcome = {
            let ArqWorld {
                channel, sender, ..
            } = &mut *w;
            sender.on_app_message(message, &mut ChannelCtx::new(channel, sim))
        };
        let accepted = matches!(outcome, SendOutcome::Sent(_));
        info!(n = w.app.generated, accepted, "📝 应用层消息");
        w.channel.record(
            sim.now(),
            Side::A,
            TraceEventKind::AppMessage { payload, accepted },
        );

        if w.app.has_more() {
            let gap = 2.0 * w.app.message_interval * w.channel.uniform();
            sim.schedule(
                sim.now().saturating_add(SimTime::from_units(gap)),
                AppMessageArrival,
            );
        }
    }
}
