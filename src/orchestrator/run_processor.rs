//! 运行处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一整趟订单处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动/连接浏览器、创建 Session 和 PdfRenderer
//! 2. **数据加载**：下载并解析订单 CSV（`Vec<OrderRecord>`）
//! 3. **顺序处理**：严格按数据集行序逐个处理，远端会话单写者
//! 4. **失败语义**：默认首错中止（归档不会执行）；开启
//!    `continue_on_error` 后记录失败、重置表单并继续处理后续订单
//! 5. **收尾归档**：全部行处理完后把 receipts 目录打成一个压缩包
//! 6. **全局统计**：汇总整趟运行的处理结果

use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{PdfRenderer, Session};
use crate::models;
use crate::services::ArchiveFinalizer;
use crate::store::ArtifactStore;
use crate::workflow::{OrderCtx, OrderFlow};

/// 应用主结构
pub struct App {
    config: Config,
    browser: Browser,
    session: Session,
    renderer: PdfRenderer,
    store: ArtifactStore,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        // 设置了调试端口就连接现有浏览器，否则启动无头浏览器
        let (browser, page) = match config.browser_debug_port {
            Some(port) => {
                browser::connect_to_browser_and_page(port, &config.target_url).await?
            }
            None => browser::launch_headless_browser(&config.target_url).await?,
        };

        // 渲染回执用的独立标签页，不扰动订单表单
        let render_page = browser
            .new_page("about:blank")
            .await
            .context("创建渲染页面失败")?;

        let session = Session::new(page, Duration::from_millis(config.slowmo_ms));
        let renderer = PdfRenderer::new(render_page);
        let store = ArtifactStore::new(&config.output_dir);

        Ok(Self {
            config,
            browser,
            session,
            renderer,
            store,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<()> {
        let result = self.run_inner().await;
        self.shutdown().await;
        result
    }

    async fn run_inner(&mut self) -> Result<()> {
        // 加载所有待处理的订单
        let orders = models::download_orders(&self.config.orders_url)
            .await
            .context("加载订单数据集失败")?;

        if orders.is_empty() {
            warn!("⚠️ 数据集中没有任何订单，程序结束");
            return Ok(());
        }

        let total = orders.len();
        log_orders_loaded(total);

        // 创建流程对象（只创建一次，复用）
        let flow = OrderFlow::new(&self.config);
        let mut report = RunReport::new(total);

        // ========== 按行序遍历所有订单（Vec<OrderRecord>） ==========
        for (index, record) in orders.iter().enumerate() {
            let ctx = OrderCtx::new(index + 1, total, record.order_number.clone());
            log_order_start(&ctx);

            match flow
                .run(&self.session, &self.renderer, &self.store, record, &ctx)
                .await
            {
                Ok(order_number) => {
                    info!("[订单 {}] ✅ 处理完成\n", ctx.row_index);
                    report.succeeded.push(order_number);
                }
                Err(e) => {
                    error!("[订单 {}] ❌ 处理过程中发生错误: {:#}", ctx.row_index, e);
                    report.failed.push(OrderFailure {
                        row_index: ctx.row_index,
                        reason: format!("{:#}", e),
                    });

                    if !self.config.continue_on_error {
                        return Err(e);
                    }

                    // 失败订单留下的页面状态不可知，回到表单页重新开始
                    warn!("[订单 {}] ⚠️ 已记录失败，重置表单后继续", ctx.row_index);
                    self.session
                        .goto(&self.config.target_url)
                        .await
                        .context("失败后重置订单表单失败")?;
                }
            }
        }

        // ========== 收尾：归档全部回执（整趟只执行一次） ==========
        info!("🗜️ 正在归档回执...");
        let archive_path = ArchiveFinalizer::new().archive(&self.store)?;
        info!("✓ 压缩包已生成: {}", archive_path.display());

        print_final_stats(&report);

        Ok(())
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
    }
}

/// 整趟运行的处理报告
#[derive(Debug, Default)]
pub struct RunReport {
    /// 订单总数
    pub total: usize,
    /// 成功订单的远端编号（按处理顺序）
    pub succeeded: Vec<String>,
    /// 失败订单明细
    pub failed: Vec<OrderFailure>,
}

impl RunReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }
}

/// 单个失败订单的记录
#[derive(Debug)]
pub struct OrderFailure {
    /// 数据集行号（从1开始）
    pub row_index: usize,
    /// 失败原因
    pub reason: String,
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 机器人订单自动提交模式");
    info!("📦 输出目录: {}", config.output_dir);
    info!(
        "🔁 最大提交尝试次数: {} (退避 {}ms)",
        config.max_submit_attempts, config.retry_backoff_ms
    );
    info!("{}", "=".repeat(60));
}

fn log_orders_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的订单", total);
    info!("💡 将按数据集行序逐个处理\n");
}

fn log_order_start(ctx: &OrderCtx) {
    info!("\n[订单 {}] {}", ctx.row_index, "─".repeat(30));
    info!(
        "[订单 {}] 处理第 {}/{} 个订单 (数据行#{})",
        ctx.row_index, ctx.row_index, ctx.total_rows, ctx.row_id
    );
}

fn print_final_stats(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.succeeded.len(), report.total);
    info!("❌ 失败: {}", report.failed.len());
    for failure in &report.failed {
        info!("  - 第 {} 行: {}", failure.row_index, failure.reason);
    }
    info!("{}", "=".repeat(60));
}
