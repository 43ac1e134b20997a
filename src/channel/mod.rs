//! 信道 / 事件仿真协作方
//!
//! 模拟 layer 3：在 A、B 两端之间传递报文，按概率注入丢包与损坏，
//! 引入随机时延，并为每端维护至多一个定时器。协议端点只看到 [`ChannelApi`]。

mod api;
mod events;
mod report;
mod runner;
mod side;
mod stats;
mod unreliable;
mod world;

pub use api::ChannelApi;
pub use events::{AppMessageArrival, PacketArrival, TimerExpiry};
pub use report::Summary;
pub use runner::{run_scenario, RunOutput, Scenario};
pub use side::Side;
pub use stats::ChannelStats;
pub use unreliable::{Channel, ChannelConfig, ChannelCtx, CORRUPT_FIELD_VALUE};
pub use world::{message_body, AppLayer, ArqWorld};
