//! 浏览器会话 - 基础设施层
//!
//! 持有订单表单页面这一稀缺资源，只暴露驱动原语。
//! 整条流水线共享同一个会话句柄，单写者纪律由顺序编排保证，
//! 这里不做任何加锁。

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::Page;
use serde_json::Value as JsonValue;
use tokio::time::sleep;
use tracing::debug;

use crate::error::SessionError;

/// 轮询元素时的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 浏览器会话
///
/// 职责：
/// - 持有唯一的订单表单 Page 资源
/// - 暴露导航/点击/填写/选择/读取/截图原语
/// - 每个改变页面状态的动作之后施加统一的减速延迟
/// - 不认识 OrderRecord，不处理业务流程
pub struct Session {
    page: Page,
    pacing: Duration,
}

impl Session {
    /// 创建新的会话
    ///
    /// # 参数
    /// - `page`: 订单表单页面
    /// - `pacing`: 每个动作之后的减速延迟
    pub fn new(page: Page, pacing: Duration) -> Self {
        Self { page, pacing }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航到指定 URL 并等待加载完成
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?
            .wait_for_navigation()
            .await
            .with_context(|| format!("等待 {} 加载失败", url))?;
        self.pace().await;
        Ok(())
    }

    /// 点击匹配 CSS 选择器的元素
    pub async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("未找到元素: {}", selector))?;
        element
            .click()
            .await
            .with_context(|| format!("点击 {} 失败", selector))?;
        self.pace().await;
        Ok(())
    }

    /// 点击可见文本完全匹配的按钮
    ///
    /// # 返回
    /// 返回是否找到并点击了按钮（按钮不存在不算错误，由调用方决定）
    pub async fn click_text(&self, text: &str) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const btn = [...document.querySelectorAll('button')]
                    .find(b => b.textContent.trim() === {});
                if (!btn) return false;
                btn.click();
                return true;
            }})()
            "#,
            serde_json::to_string(text)?
        );
        let clicked = matches!(self.eval(js_code).await?, JsonValue::Bool(true));
        if clicked {
            self.pace().await;
        }
        Ok(clicked)
    }

    /// 向匹配选择器的输入框键入文本
    pub async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("未找到输入框: {}", selector))?;
        // 先点击获取焦点，再键入
        element
            .click()
            .await
            .with_context(|| format!("聚焦 {} 失败", selector))?;
        element
            .type_str(text)
            .await
            .with_context(|| format!("向 {} 键入失败", selector))?;
        self.pace().await;
        Ok(())
    }

    /// 在下拉框中按 value 选中选项，并触发 change 事件
    pub async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.value = {val};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            sel = serde_json::to_string(selector)?,
            val = serde_json::to_string(value)?,
        );
        if !matches!(self.eval(js_code).await?, JsonValue::Bool(true)) {
            return Err(SessionError::ElementNotFound {
                selector: selector.to_string(),
            }
            .into());
        }
        self.pace().await;
        Ok(())
    }

    /// 读取元素的属性值
    pub async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("未找到元素: {}", selector))?;
        let value = element
            .attribute(name)
            .await
            .with_context(|| format!("读取 {} 的 {} 属性失败", selector, name))?;
        Ok(value)
    }

    /// 在超时内等待元素出现后读取其属性值
    ///
    /// 每 100ms 轮询一次；超时前元素一直不出现则返回
    /// [`SessionError::WaitTimeout`]。
    pub async fn wait_for_attribute(
        &self,
        selector: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        let start = Instant::now();
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                let value = element
                    .attribute(name)
                    .await
                    .with_context(|| format!("读取 {} 的 {} 属性失败", selector, name))?;
                return Ok(value);
            }
            if start.elapsed() >= timeout {
                return Err(SessionError::WaitTimeout {
                    selector: selector.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into());
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 读取元素的文本内容
    pub async fn text_content(&self, selector: &str) -> Result<String> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                return el ? el.textContent : null;
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        match self.eval(js_code).await? {
            JsonValue::String(text) => Ok(text),
            _ => Err(SessionError::ElementNotFound {
                selector: selector.to_string(),
            }
            .into()),
        }
    }

    /// 读取元素的内部 HTML
    pub async fn inner_html(&self, selector: &str) -> Result<String> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                return el ? el.innerHTML : null;
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        match self.eval(js_code).await? {
            JsonValue::String(html) => Ok(html),
            _ => Err(SessionError::ElementNotFound {
                selector: selector.to_string(),
            }
            .into()),
        }
    }

    /// 对匹配选择器的单个元素截图（PNG），写入指定路径
    ///
    /// 截图范围仅限该元素，不是整页。已存在的文件会被覆盖。
    pub async fn screenshot_element(&self, selector: &str, output: &Path) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("未找到截图区域: {}", selector))?;
        let bytes = element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .with_context(|| format!("对 {} 截图失败", selector))?;
        tokio::fs::write(output, bytes)
            .await
            .with_context(|| format!("写入截图失败: {}", output.display()))?;
        debug!("截图已保存: {}", output.display());
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 动作之间的减速延迟
    async fn pace(&self) {
        if !self.pacing.is_zero() {
            sleep(self.pacing).await;
        }
    }
}
