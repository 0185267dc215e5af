// ==========================================
// 回收公司模拟系统 - 产出计算器
// ==========================================
// 职责: 由配比表推导回收产出（纯线性模型）
// 模型: 材料产出/手机 = parts_per_phone × material_per_part，
//       同一材料经多个部件产出时必须累加
// 无副作用，估算查询与回收分配引擎共用
// ==========================================

use crate::domain::{PhoneYieldEstimate, YieldRatioRow};
use crate::engine::{EngineError, EngineResult};
use crate::repository::{PhoneRepository, RatioRepository, RepositoryResult};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 纯计算：配比行 × 数量 → 按材料名称汇总的产出(kg)
///
/// 对数量满足线性：compute(q1) + compute(q2) == compute(q1 + q2)
pub fn compute_yield(rows: &[YieldRatioRow], quantity: i64) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for row in rows {
        let per_phone = row.parts_per_phone * row.material_per_part;
        *totals.entry(row.material_name.clone()).or_insert(0.0) += per_phone * quantity as f64;
    }

    totals
}

// ==========================================
// YieldCalculator - 产出计算器
// ==========================================

/// 产出计算器
///
/// 持有连接仅用于读取静态配比表与型号信息
pub struct YieldCalculator {
    phone_repo: Arc<PhoneRepository>,
    ratio_repo: Arc<RatioRepository>,
}

impl YieldCalculator {
    /// 从共享连接创建计算器实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            phone_repo: Arc::new(PhoneRepository::from_connection(conn.clone())),
            ratio_repo: Arc::new(RatioRepository::from_connection(conn)),
        }
    }

    /// 估算某型号手机指定数量的回收产出
    ///
    /// # 返回
    /// - Ok(PhoneYieldEstimate): 按材料汇总的产出估算
    /// - Err(NotFound): 型号不存在
    pub fn estimate(&self, phone_id: i64, quantity: i64) -> EngineResult<PhoneYieldEstimate> {
        let phone = self
            .phone_repo
            .find_by_id(phone_id)?
            .ok_or(EngineError::NotFound { entity: "Phone", id: phone_id })?;

        let rows = self.ratio_repo.find_yield_rows(phone_id)?;
        Ok(Self::build_estimate(phone_id, &phone.brand, &phone.model, &rows, quantity))
    }

    /// 事务内估算（回收分配引擎在持有连接守卫时调用）
    pub fn estimate_in(
        conn: &Connection,
        phone_id: i64,
        brand: &str,
        model: &str,
        quantity: i64,
    ) -> RepositoryResult<PhoneYieldEstimate> {
        let rows = RatioRepository::find_yield_rows_in(conn, phone_id)?;
        Ok(Self::build_estimate(phone_id, brand, model, &rows, quantity))
    }

    fn build_estimate(
        phone_id: i64,
        brand: &str,
        model: &str,
        rows: &[YieldRatioRow],
        quantity: i64,
    ) -> PhoneYieldEstimate {
        let estimated_materials = compute_yield(rows, quantity);
        let total_estimated_kg = estimated_materials.values().sum();

        PhoneYieldEstimate {
            phone_id,
            phone_model: model.to_string(),
            brand: brand.to_string(),
            estimated_materials,
            total_estimated_kg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(part: &str, ppp: f64, material: &str, mpp: f64) -> YieldRatioRow {
        YieldRatioRow {
            part_name: part.to_string(),
            parts_per_phone: ppp,
            material_id: 0,
            material_name: material.to_string(),
            material_per_part: mpp,
        }
    }

    #[test]
    fn test_compute_yield_chains_both_ratios() {
        // 每台 2 块电路板，每块 0.5kg 铜 → 每台 1kg 铜
        let rows = vec![row("Circuit Board", 2.0, "Copper", 0.5)];
        let totals = compute_yield(&rows, 10);
        assert_eq!(totals.get("Copper"), Some(&10.0));
    }

    #[test]
    fn test_compute_yield_sums_same_material_across_parts() {
        // 铜经电路板与线缆两条路径产出，必须累加而非覆盖
        let rows = vec![
            row("Circuit Board", 2.0, "Copper", 0.5),
            row("Wiring", 4.0, "Copper", 0.25),
        ];
        let totals = compute_yield(&rows, 3);
        assert_eq!(totals.get("Copper"), Some(&6.0)); // (1.0 + 1.0) × 3
    }

    #[test]
    fn test_compute_yield_additivity() {
        let rows = vec![
            row("Circuit Board", 2.0, "Copper", 0.5),
            row("Circuit Board", 2.0, "Gold", 0.01),
            row("Screen", 1.0, "Glass", 0.12),
        ];

        let combined = compute_yield(&rows, 7);
        let a = compute_yield(&rows, 3);
        let b = compute_yield(&rows, 4);

        for (name, total) in &combined {
            let split = a.get(name).unwrap_or(&0.0) + b.get(name).unwrap_or(&0.0);
            assert!((total - split).abs() < 1e-9, "material {name} not additive");
        }
    }

    #[test]
    fn test_compute_yield_empty_rows() {
        let totals = compute_yield(&[], 100);
        assert!(totals.is_empty());
    }
}
