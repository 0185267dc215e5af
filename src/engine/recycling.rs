// ==========================================
// 回收公司模拟系统 - 回收分配引擎
// ==========================================
// 职责: 在机器吞吐约束下，把手机库存批量转换为材料库存
// 规则:
// 1) 容量 = 可运转机器数 × 单机吞吐
// 2) 库存组按数量降序处理（最大组优先的贪心，非装箱最优，接受的简化）
// 3) 产出按材料取整数 kg 下限后入库；不足 1kg 的尾数舍弃
// 4) 整次运行一个事务，任何持久层失败回滚全部变动
// ==========================================

use crate::domain::{RecycledMaterialResult, RecyclingResult};
use crate::engine::clock::SimulationClock;
use crate::engine::yield_calc::YieldCalculator;
use crate::engine::EngineResult;
use crate::repository::{
    MachineRepository, MaterialInventoryRepository, PhoneInventoryRepository,
    RawMaterialRepository, RepositoryError,
};
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// RecyclingAllocationEngine - 回收分配引擎
// ==========================================

/// 回收分配引擎
pub struct RecyclingAllocationEngine {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<SimulationClock>,
    /// 单台机器单次运行可处理的手机数
    machine_production_rate: i64,
}

impl RecyclingAllocationEngine {
    /// 创建回收分配引擎实例
    ///
    /// # 参数
    /// - conn: 共享数据库连接
    /// - clock: 模拟时钟（处理时间戳来源）
    /// - machine_production_rate: 单机吞吐（手机/次）
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        clock: Arc<SimulationClock>,
        machine_production_rate: i64,
    ) -> Self {
        Self {
            conn,
            clock,
            machine_production_rate,
        }
    }

    /// 执行一次回收运行
    ///
    /// 短路条件（依次判断，均不产生库存变动）：
    /// 1. 无任何机器登记
    /// 2. 机器全部故障
    /// 3. 无手机库存
    ///
    /// # 返回
    /// - Ok(RecyclingResult): 业务结果（成功或带原因的失败）
    /// - Err(EngineError): 时钟未启动 / 持久层失败（事务已回滚）
    #[instrument(skip(self))]
    pub fn start_recycling(&self) -> EngineResult<RecyclingResult> {
        let processing_date = self.clock.now()?;

        let mut guard = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::from)?;

        // 1. 机器登记检查
        let machine_count = MachineRepository::count_all_in(&tx)?;
        if machine_count == 0 {
            warn!("回收中止: 无任何机器登记");
            return Ok(RecyclingResult::failure(
                "No recycling machines are registered",
                processing_date,
            ));
        }

        // 2. 可运转机器检查
        let operational_count = MachineRepository::count_operational_in(&tx)?;
        if operational_count == 0 {
            warn!(machine_count, "回收中止: 机器全部故障待修");
            return Ok(RecyclingResult::failure(
                "No operational machines available, recycling machines require repair",
                processing_date,
            ));
        }

        // 3. 运行容量
        let capacity = operational_count * self.machine_production_rate;

        // 4. 手机库存组（数量降序）
        let groups = PhoneInventoryRepository::find_available_desc_in(&tx)?;
        if groups.is_empty() {
            return Ok(RecyclingResult::failure(
                "No phones available for recycling",
                processing_date,
            ));
        }

        let total_units: i64 = groups.iter().map(|g| g.quantity).sum();
        let units_to_process = total_units.min(capacity);

        let mut recycled_materials: Vec<RecycledMaterialResult> = Vec::new();
        let mut processed_models: Vec<String> = Vec::new();
        let mut units_processed: i64 = 0;

        // 5~7. 逐组分配容量并转换
        for group in &groups {
            let remaining = units_to_process - units_processed;
            if remaining <= 0 {
                break;
            }
            let take = group.quantity.min(remaining);
            if take == 0 {
                continue;
            }

            let estimate =
                YieldCalculator::estimate_in(&tx, group.phone_id, &group.brand, &group.model, take)?;

            // 写穿式扣减手机库存
            PhoneInventoryRepository::decrement_in(&tx, group.phone_id, take)?;

            let source = format!("{} {}", group.brand, group.model);
            for (material_name, estimated_kg) in &estimate.estimated_materials {
                // 整数 kg 下限入库；不足 1kg 舍弃
                let floored_kg = estimated_kg.floor();
                if floored_kg <= 0.0 {
                    continue;
                }

                let material = match RawMaterialRepository::find_by_name_in(&tx, material_name)? {
                    Some(material) => material,
                    // 配比表指向的材料缺主数据行时跳过该材料
                    None => continue,
                };

                MaterialInventoryRepository::add_available_in(&tx, material.id, floored_kg)?;

                match recycled_materials
                    .iter_mut()
                    .find(|r| r.material_id == material.id)
                {
                    Some(existing) => existing.quantity_kg += floored_kg,
                    None => recycled_materials.push(RecycledMaterialResult {
                        material_id: material.id,
                        material_name: material.name.clone(),
                        quantity_kg: floored_kg,
                        recycled_date: processing_date,
                        source_phone_models: source.clone(),
                    }),
                }
            }

            processed_models.push(format!("{}x {}", take, source));
            units_processed += take;
        }

        // 8. 剩余量与运行消息
        let leftover = total_units - units_processed;
        let message = if leftover == 0 {
            format!(
                "Recycling process completed! Processed {} phones using {} operational machines. Processed: {}",
                units_processed,
                operational_count,
                processed_models.join(", ")
            )
        } else {
            format!(
                "Recycling process completed! Processed {} of {} phones, {} left due to machine capacity. Processed: {}",
                units_processed,
                total_units,
                leftover,
                processed_models.join(", ")
            )
        };

        // 9. 整体提交；任何失败走 Err 路径，事务随 drop 回滚
        tx.commit().map_err(RepositoryError::from)?;

        let total_kg: f64 = recycled_materials.iter().map(|r| r.quantity_kg).sum();
        info!(units_processed, leftover, total_kg, "回收运行完成");

        Ok(RecyclingResult {
            success: true,
            message,
            recycled_materials,
            total_materials_recycled_kg: total_kg,
            phones_processed: units_processed,
            processing_date,
        })
    }
}
