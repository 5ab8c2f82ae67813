//! 应用程序错误类型
//!
//! 按领域分组：浏览器会话 / 订单提交 / 产物文件。
//! 编排层统一用 anyhow 传播，这里只给需要被上层 match 的错误类一个
//! 具名类型（重试耗尽、合并输入缺失、归档目录缺失等）。

use std::path::PathBuf;

use thiserror::Error;

/// 浏览器会话错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 页面元素未找到
    #[error("页面元素未找到: {selector}")]
    ElementNotFound { selector: String },

    /// 等待页面元素超时
    #[error("等待页面元素超时: {selector} ({timeout_ms}ms)")]
    WaitTimeout { selector: String, timeout_ms: u64 },
}

/// 订单提交错误
#[derive(Debug, Error)]
pub enum SubmitError {
    /// 重试次数耗尽，远端仍返回失败指示
    #[error("订单提交重试 {attempts} 次后仍被拒绝")]
    RetryExhausted { attempts: usize },

    /// 提交成功但页面上没有订单编号
    #[error("提交已被接受，但未能读到订单编号")]
    MissingOrderNumber,
}

/// 产物文件错误
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// 合并所需的输入文件不存在
    #[error("合并输入文件不存在: {path}")]
    MissingInput { path: PathBuf },

    /// 归档时 receipts 目录不存在（本次运行没有任何订单成功）
    #[error("回执目录不存在: {path}")]
    ReceiptsDirMissing { path: PathBuf },
}
