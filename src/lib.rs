//! # Robot Order Submit
//!
//! 一个用于自动化机器人订单提交的 Rust 应用程序
//!
//! 对数据集中的每一行：驱动浏览器填写订单表单并提交，截取机器人预览图，
//! 把 HTML 回执渲染成 PDF 并把截图追加为第二页，最后把所有回执打包成
//! 一个 zip 压缩包。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `Session` - 订单表单页面的唯一 owner，提供导航/点击/填写/截图能力
//! - `PdfRenderer` - 渲染页面的唯一 owner，提供 HTML → PDF 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个订单
//! - `OrderSubmitter` - 填表 + 有界重试提交能力
//! - `ArtifactCapturer` - 截图 + 回执 HTML 提取能力
//! - `ReceiptAssembler` - 回执渲染 + 合并截图页能力
//! - `ArchiveFinalizer` - 打包 receipts 目录能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个订单"的完整处理流程
//! - `OrderCtx` - 上下文封装（行号 + 行标识）
//! - `OrderFlow` - 流程编排（弹窗 → 提交 → 截图 → 合并 → 下一单）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/run_processor` - 整趟运行处理器，管理资源、顺序遍历、
//!   汇总报告并在最后归档
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use config::Config;
pub use error::{ArtifactError, SessionError, SubmitError};
pub use infrastructure::{PdfRenderer, Session};
pub use models::loaders::parse_orders;
pub use models::OrderRecord;
pub use orchestrator::App;
pub use services::{
    run_submit_loop, ArchiveFinalizer, ArtifactCapturer, OrderSubmitter, ReceiptAssembler,
    RetryPolicy, SubmissionState, SubmitSurface,
};
pub use store::ArtifactStore;
pub use workflow::{OrderCtx, OrderFlow};
