// ==========================================
// 回收公司模拟系统 - 模拟时钟
// ==========================================
// 职责: 把真实流逝时间映射为加速的模拟日历
// 模型: now() = 模拟纪元 + 真实流逝分钟 × 加速系数(模拟天/分钟)
// 生命周期: 进程级单例（显式构造注入，启动一次、多处读取）
// 注意: 锚点不落库，进程重启后时间相关记录仅在单次连续运行内有意义
// ==========================================

use crate::engine::{EngineError, EngineResult};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::RwLock;

/// 默认加速系数：每真实分钟 0.5 模拟天（即 2 真实分钟 = 1 模拟天）
pub const DEFAULT_SIM_DAYS_PER_REAL_MINUTE: f64 = 0.5;

/// 模拟纪元：2050-01-01T00:00:00Z
pub fn simulation_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2050, 1, 1, 0, 0, 0).unwrap()
}

/// 模拟时钟
///
/// start() 设定真实时间锚点；now() 依据锚点换算当前模拟时间。
/// 未启动即读取是前置条件违反，返回 ClockNotStarted。
pub struct SimulationClock {
    anchor: RwLock<Option<DateTime<Utc>>>,
    sim_days_per_real_minute: f64,
}

impl SimulationClock {
    /// 以默认加速系数创建时钟（未启动状态）
    pub fn new() -> Self {
        Self::with_acceleration(DEFAULT_SIM_DAYS_PER_REAL_MINUTE)
    }

    /// 以指定加速系数创建时钟
    pub fn with_acceleration(sim_days_per_real_minute: f64) -> Self {
        Self {
            anchor: RwLock::new(None),
            sim_days_per_real_minute,
        }
    }

    /// 启动时钟
    ///
    /// # 参数
    /// - real_start: 真实时间锚点，None 表示取当前真实时间
    pub fn start(&self, real_start: Option<DateTime<Utc>>) {
        let mut anchor = self.anchor.write().expect("clock anchor lock poisoned");
        *anchor = Some(real_start.unwrap_or_else(Utc::now));
    }

    /// 时钟是否已启动
    pub fn is_started(&self) -> bool {
        self.anchor.read().expect("clock anchor lock poisoned").is_some()
    }

    /// 当前模拟时间
    pub fn now(&self) -> EngineResult<DateTime<Utc>> {
        self.simulation_time_for(Utc::now())
    }

    /// 把任意真实时刻换算为模拟时刻
    ///
    /// # 返回
    /// - Ok(DateTime<Utc>): 模拟时刻
    /// - Err(ClockNotStarted): 时钟未启动
    pub fn simulation_time_for(&self, real: DateTime<Utc>) -> EngineResult<DateTime<Utc>> {
        let anchor = self
            .anchor
            .read()
            .expect("clock anchor lock poisoned")
            .ok_or(EngineError::ClockNotStarted)?;

        let elapsed_ms = (real - anchor).num_milliseconds();
        let sim_days = elapsed_ms as f64 / 60_000.0 * self.sim_days_per_real_minute;
        let sim_offset_ms = (sim_days * 86_400_000.0).round() as i64;

        Ok(simulation_epoch() + Duration::milliseconds(sim_offset_ms))
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_before_start_is_error() {
        let clock = SimulationClock::new();
        assert!(matches!(clock.now(), Err(EngineError::ClockNotStarted)));
    }

    #[test]
    fn test_epoch_at_anchor() {
        let clock = SimulationClock::new();
        let anchor = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        clock.start(Some(anchor));

        let sim = clock.simulation_time_for(anchor).unwrap();
        assert_eq!(sim, simulation_epoch());
    }

    #[test]
    fn test_two_real_minutes_is_one_sim_day() {
        let clock = SimulationClock::new();
        let anchor = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        clock.start(Some(anchor));

        let sim = clock
            .simulation_time_for(anchor + Duration::minutes(2))
            .unwrap();
        assert_eq!(sim, simulation_epoch() + Duration::days(1));
    }

    #[test]
    fn test_monotonic_and_acceleration_ratio() {
        let clock = SimulationClock::new();
        let anchor = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        clock.start(Some(anchor));

        let t1 = clock.simulation_time_for(anchor + Duration::minutes(10)).unwrap();
        let t2 = clock.simulation_time_for(anchor + Duration::minutes(30)).unwrap();
        assert!(t2 > t1);

        // 20 真实分钟 → 10 模拟天
        let sim_delta_days = (t2 - t1).num_milliseconds() as f64 / 86_400_000.0;
        assert!((sim_delta_days - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_restart_moves_anchor() {
        let clock = SimulationClock::new();
        let anchor1 = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        clock.start(Some(anchor1));

        let anchor2 = anchor1 + Duration::hours(1);
        clock.start(Some(anchor2));

        // 新锚点下，anchor2 即模拟纪元
        assert_eq!(clock.simulation_time_for(anchor2).unwrap(), simulation_epoch());
    }
}
