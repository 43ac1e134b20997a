//! 仿真时间类型
//!
//! 定义仿真时间及其单位转换。协议层以“时间单位”（浮点）描述超时与时延，
//! 内部统一换算成整数 tick，保证事件队列排序稳定。

/// 每个仿真时间单位对应的 tick 数。
pub const TICKS_PER_UNIT: u64 = 1_000_000;

/// 仿真时间（tick）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// 由浮点时间单位构造；负数/NaN 视为 0，溢出时饱和。
    pub fn from_units(units: f64) -> SimTime {
        if !units.is_finite() {
            return if units > 0.0 { SimTime(u64::MAX) } else { SimTime::ZERO };
        }
        if units <= 0.0 {
            return SimTime::ZERO;
        }
        let ticks = (units * TICKS_PER_UNIT as f64).round();
        if ticks >= u64::MAX as f64 {
            SimTime(u64::MAX)
        } else {
            SimTime(ticks as u64)
        }
    }

    /// 换算回浮点时间单位
    pub fn as_units(self) -> f64 {
        self.0 as f64 / TICKS_PER_UNIT as f64
    }

    pub fn saturating_add(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(other.0))
    }
}
