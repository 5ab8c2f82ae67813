use serde::{Deserialize, Serialize};

/// 一行订单数据：要提交的机器人配置
///
/// 读入后不再修改。`order_number` 是数据集里的行号，只用于日志；
/// 真正作为产物键的订单编号由远端系统在提交成功后分配。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Order number")]
    pub order_number: String,
    #[serde(rename = "Head")]
    pub head: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Legs")]
    pub legs: String,
    #[serde(rename = "Address")]
    pub address: String,
}
