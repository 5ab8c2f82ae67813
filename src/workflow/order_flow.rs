//! 订单处理流程 - 流程层
//!
//! 核心职责：定义"一个订单"的完整处理流程
//!
//! 流程顺序：
//! 1. 关闭拦路弹窗
//! 2. 填表 → 预览 → 有界重试提交 → 拿到订单编号
//! 3. 截图 + 提取回执 HTML
//! 4. 渲染回执并合并截图页
//! 5. 点击"再订一台"，为下一行重置表单

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::infrastructure::{PdfRenderer, Session};
use crate::models::OrderRecord;
use crate::services::{ArtifactCapturer, OrderSubmitter, ReceiptAssembler};
use crate::store::ArtifactStore;
use crate::utils::logging::truncate_text;
use crate::workflow::order_ctx::OrderCtx;

/// 拦路弹窗里的确认按钮文本
const MODAL_OK_TEXT: &str = "OK";
/// 进入下一单的按钮
const ORDER_ANOTHER: &str = "#order-another";

/// 订单处理流程
///
/// - 编排完整的订单处理流程
/// - 决定何时提交、何时截图、何时合并
/// - 不持有任何资源（session / renderer 由编排层传入）
/// - 只依赖业务能力（services）
pub struct OrderFlow {
    submitter: OrderSubmitter,
    capturer: ArtifactCapturer,
    assembler: ReceiptAssembler,
    verbose_logging: bool,
}

impl OrderFlow {
    /// 创建新的订单处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            submitter: OrderSubmitter::new(config),
            capturer: ArtifactCapturer::new(),
            assembler: ReceiptAssembler::new(),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理一个订单，返回远端分配的订单编号
    pub async fn run(
        &self,
        session: &Session,
        renderer: &PdfRenderer,
        store: &ArtifactStore,
        record: &OrderRecord,
        ctx: &OrderCtx,
    ) -> Result<String> {
        // ========== 步骤 1: 关闭弹窗 ==========
        // 数据录入开始前必须关掉拦在表单前面的弹窗
        if session.click_text(MODAL_OK_TEXT).await? {
            debug!("[订单 {}] 已关闭弹窗", ctx.row_index);
        } else {
            debug!("[订单 {}] 没有弹窗需要关闭", ctx.row_index);
        }

        // ========== 步骤 2: 提交订单 ==========
        info!("[订单 {}] 📤 正在填写并提交订单...", ctx.row_index);
        let order_number = self
            .submitter
            .submit(session, record)
            .await
            .with_context(|| format!("{} 提交失败", ctx))?;
        info!(
            "[订单 {}] ✓ 订单已受理，编号: {}",
            ctx.row_index, order_number
        );

        // ========== 步骤 3: 捕获证据 ==========
        let receipt_html = self
            .capturer
            .capture(session, store, &order_number)
            .await
            .with_context(|| format!("{} 捕获产物失败", ctx))?;
        info!("[订单 {}] 📷 截图与回执已捕获", ctx.row_index);

        if self.verbose_logging {
            info!(
                "[订单 {}] 回执片段: {}",
                ctx.row_index,
                truncate_text(&receipt_html, 80)
            );
        }

        // ========== 步骤 4: 装配两页回执 ==========
        self.assembler
            .assemble(renderer, store, &order_number, &receipt_html)
            .await
            .with_context(|| format!("{} 装配回执失败", ctx))?;
        info!(
            "[订单 {}] 🧾 两页回执已生成: {}",
            ctx.row_index,
            store.receipt_path(&order_number).display()
        );

        // ========== 步骤 5: 进入下一单 ==========
        session
            .click(ORDER_ANOTHER)
            .await
            .with_context(|| format!("{} 重置表单失败", ctx))?;

        Ok(order_number)
    }
}
