//! 完整跑一次仿真：初始化两端、调度消息源、运行事件循环、汇总统计。

use tracing::info;

use super::events::AppMessageArrival;
use super::report::Summary;
use super::unreliable::ChannelConfig;
use super::world::{AppLayer, ArqWorld};
use crate::arq::ArqConfig;
use crate::sim::{SimTime, Simulator};
use crate::trace::{TraceEventKind, TraceLogger};

/// 解析完毕的运行参数
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub arq: ArqConfig,
    pub channel: ChannelConfig,
    pub num_messages: u64,
    /// 平均消息间隔（时间单位）
    pub message_interval: f64,
    /// 仿真时间上限；None 表示跑到事件队列为空
    pub until: Option<SimTime>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            arq: ArqConfig::default(),
            channel: ChannelConfig::default(),
            num_messages: 10,
            message_interval: 100.0,
            until: None,
        }
    }
}

pub struct RunOutput {
    pub summary: Summary,
    /// B 端应用层按顺序收到的载荷
    pub delivered: Vec<String>,
    pub trace: Option<TraceLogger>,
}

pub fn run_scenario(scenario: &Scenario, record_trace: bool) -> RunOutput {
    let mut sim = Simulator::default();
    let mut world = ArqWorld::new(
        scenario.arq.clone(),
        scenario.channel.clone(),
        AppLayer::new(scenario.num_messages, scenario.message_interval),
    );
    world.init();

    if record_trace {
        let mut logger = TraceLogger::default();
        logger.record(
            SimTime::ZERO,
            crate::channel::Side::A,
            TraceEventKind::meta(&scenario.arq, &scenario.channel),
        );
        world.channel.trace = Some(logger);
    }

    if scenario.num_messages > 0 {
        let first = 2.0 * scenario.message_interval * world.channel.uniform();
        sim.schedule(SimTime::from_units(first), AppMessageArrival);
    }

    info!(
        protocol = scenario.arq.variant.name(),
        messages = scenario.num_messages,
        loss = scenario.channel.loss,
        corrupt = scenario.channel.corrupt,
        "开始 ARQ 仿真"
    );
    match scenario.until {
        Some(until) => sim.run_until(until, &mut world),
        None => sim.run(&mut world),
    }

    let summary = Summary {
        protocol: scenario.arq.variant,
        sim_time: sim.now().as_units(),
        messages_generated: world.app.generated,
        average_rtt: world.sender.stats().average_rtt(),
        sender: world.sender.stats().clone(),
        receiver: world.receiver.stats().clone(),
        channel: world.channel.stats.clone(),
    };
    RunOutput {
        summary,
        delivered: std::mem::take(&mut world.channel.delivered),
        trace: world.channel.trace.take(),
    }
}
