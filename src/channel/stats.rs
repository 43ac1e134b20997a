//! 信道统计信息

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// 交给信道（layer 3）的报文数
    pub to_layer3: u64,
    pub lost: u64,
    pub corrupted: u64,
    /// 到达对端的报文数（含损坏）
    pub arrived: u64,
    /// 交付给应用层（layer 5）的载荷数
    pub delivered_to_app: u64,
    /// 违反“每端最多一个定时器”约定的次数
    pub timer_violations: u64,
}
