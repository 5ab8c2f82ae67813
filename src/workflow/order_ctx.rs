//! 订单处理上下文
//!
//! 封装"我正在处理数据集的第几行"这一信息

use std::fmt::Display;

/// 订单处理上下文
///
/// 包含处理单个订单所需的上下文信息
#[derive(Debug, Clone)]
pub struct OrderCtx {
    /// 数据集行号（从1开始，仅用于日志显示）
    pub row_index: usize,

    /// 数据集总行数
    pub total_rows: usize,

    /// 数据集里的行标识（CSV 的 Order number 列）
    pub row_id: String,
}

impl OrderCtx {
    /// 创建新的订单上下文
    pub fn new(row_index: usize, total_rows: usize, row_id: String) -> Self {
        Self {
            row_index,
            total_rows,
            row_id,
        }
    }
}

impl Display for OrderCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[订单 {}/{} 数据行#{}]",
            self.row_index, self.total_rows, self.row_id
        )
    }
}
