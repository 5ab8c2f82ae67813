//! 产物捕获服务 - 业务能力层
//!
//! 只负责为刚提交成功的订单留下证据：机器人预览区域的截图，
//! 以及回执区域的 HTML。不关心提交，也不关心 PDF。

use anyhow::{Context, Result};
use tracing::debug;

use crate::infrastructure::Session;
use crate::store::ArtifactStore;

/// 机器人预览区域（截图范围仅限此元素）
const ROBOT_PREVIEW: &str = "#robot-preview-image";
/// 回执区域（提取其内部 HTML）
const RECEIPT_REGION: &str = "#receipt";

/// 产物捕获服务
///
/// 职责：
/// - 确保输出目录存在（幂等）
/// - 把机器人预览截图写到 images/<订单编号>.png
/// - 提取回执区域的 HTML 字符串交给下游渲染
pub struct ArtifactCapturer;

impl ArtifactCapturer {
    /// 创建新的产物捕获服务
    pub fn new() -> Self {
        Self
    }

    /// 捕获截图并提取回执 HTML
    ///
    /// # 参数
    /// - `session`: 仍停留在回执页面的会话
    /// - `order_number`: 远端分配的订单编号（产物键）
    ///
    /// # 返回
    /// 返回回执区域的 HTML 片段
    pub async fn capture(
        &self,
        session: &Session,
        store: &ArtifactStore,
        order_number: &str,
    ) -> Result<String> {
        store.ensure_dirs()?;

        let image_path = store.image_path(order_number);
        session
            .screenshot_element(ROBOT_PREVIEW, &image_path)
            .await
            .context("截取机器人预览失败")?;

        let receipt_html = session
            .inner_html(RECEIPT_REGION)
            .await
            .context("提取回执 HTML 失败")?;
        debug!("回执 HTML 长度: {}", receipt_html.len());

        Ok(receipt_html)
    }
}

impl Default for ArtifactCapturer {
    fn default() -> Self {
        Self::new()
    }
}
