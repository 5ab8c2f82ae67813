//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整趟运行的调度，是整个系统的"指挥中心"。
//!
//! ### `run_processor` - 运行处理器
//! - 管理应用生命周期（初始化、运行、关闭浏览器）
//! - 加载订单数据集（Vec<OrderRecord>）
//! - 严格按行序逐个处理订单（远端会话只有一个写者，禁止并发）
//! - 管理浏览器资源（Browser、Session、PdfRenderer）
//! - 汇总运行报告，最后归档全部回执
//!
//! ## 层次关系
//!
//! ```text
//! run_processor (处理 Vec<OrderRecord>)
//!     ↓
//! workflow::OrderFlow (处理单个 OrderRecord)
//!     ↓
//! services (能力层：submit / capture / assemble / archive)
//!     ↓
//! infrastructure (基础设施：Session / PdfRenderer)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：编排层只做调度和统计，不做具体业务判断
//! 2. **资源隔离**：只有编排层持有 Browser
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod run_processor;

// 重新导出主要类型
pub use run_processor::{App, OrderFailure, RunReport};
