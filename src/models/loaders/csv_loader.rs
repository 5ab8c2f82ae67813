//! 订单数据集加载器
//!
//! 从网络位置下载 orders.csv 并解析为 [`OrderRecord`] 列表。
//! 下载与解析分离，解析部分可以离线测试。

use anyhow::{Context, Result};

use crate::models::order::OrderRecord;

/// 下载订单 CSV 并解析为订单列表
///
/// # 参数
/// - `url`: 数据集的网络位置
///
/// # 返回
/// 按数据集行序排列的订单列表
pub async fn download_orders(url: &str) -> Result<Vec<OrderRecord>> {
    tracing::info!("正在下载订单数据: {}", url);

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("下载订单数据失败: {}", url))?
        .error_for_status()
        .with_context(|| format!("订单数据请求被拒绝: {}", url))?;

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("读取订单数据失败: {}", url))?;

    let orders = parse_orders(&bytes)?;
    tracing::info!("成功加载 {} 个订单", orders.len());

    Ok(orders)
}

/// 解析 CSV 字节流为订单列表
///
/// 要求表头包含 `Order number, Head, Body, Legs, Address` 五列。
pub fn parse_orders(bytes: &[u8]) -> Result<Vec<OrderRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut orders = Vec::new();
    for (index, row) in reader.deserialize::<OrderRecord>().enumerate() {
        let record = row.with_context(|| format!("无法解析第 {} 行订单数据", index + 1))?;
        orders.push(record);
    }

    Ok(orders)
}
