//! PDF 渲染器 - 基础设施层
//!
//! 持有一个专用的渲染 Page，只暴露"HTML → PDF"能力。
//! 渲染发生在独立标签页上，不会扰动订单表单页面的状态。

use std::path::Path;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use tracing::debug;

/// PDF 渲染器
///
/// 职责：
/// - 持有唯一的渲染 Page 资源
/// - 暴露 render_html() 能力
/// - 不认识 OrderRecord，不处理业务流程
pub struct PdfRenderer {
    page: Page,
}

impl PdfRenderer {
    /// 创建新的 PDF 渲染器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 把 HTML 片段渲染为单独的 PDF 文档
    ///
    /// # 参数
    /// - `html`: 回执的 HTML 片段
    /// - `output`: PDF 输出路径（已存在的文件会被覆盖）
    pub async fn render_html(&self, html: &str, output: &Path) -> Result<()> {
        self.page
            .set_content(html)
            .await
            .context("设置渲染页面内容失败")?;

        let mut params = PrintToPdfParams::default();
        params.print_background = Some(true);

        let bytes = self.page.pdf(params).await.context("打印 PDF 失败")?;
        tokio::fs::write(output, bytes)
            .await
            .with_context(|| format!("写入 PDF 失败: {}", output.display()))?;

        debug!("回执已渲染: {}", output.display());
        Ok(())
    }
}
