//! 回执装配服务 - 业务能力层
//!
//! 把一个订单的两份证据装配成一份两页 PDF：
//! 第 1 页永远是渲染后的 HTML 回执，第 2 页永远是截图。
//!
//! 合并写入暂存文件后原子 rename 到最终路径，中途崩溃不会留下
//! 伪装成完整回执的半成品。

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lopdf::{dictionary, xobject, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::error::ArtifactError;
use crate::infrastructure::PdfRenderer;
use crate::store::ArtifactStore;

/// A4 页面尺寸（点）
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
/// 截图页四周留白（点）
const PAGE_MARGIN: f32 = 30.0;

/// 回执装配服务
///
/// 职责：
/// - 把回执 HTML 渲染成 receipts/<订单编号>.pdf
/// - 把 images/<订单编号>.png 追加为同一文档的第 2 页
/// - 保证页序固定：第 1 页回执，第 2 页截图
pub struct ReceiptAssembler;

impl ReceiptAssembler {
    /// 创建新的回执装配服务
    pub fn new() -> Self {
        Self
    }

    /// 装配一个订单的两页回执
    pub async fn assemble(
        &self,
        renderer: &PdfRenderer,
        store: &ArtifactStore,
        order_number: &str,
        receipt_html: &str,
    ) -> Result<()> {
        let receipt_path = store.receipt_path(order_number);
        renderer
            .render_html(receipt_html, &receipt_path)
            .await
            .context("渲染回执 PDF 失败")?;

        Self::append_screenshot_page(
            &receipt_path,
            &store.image_path(order_number),
            &store.merge_scratch_path(order_number),
        )
        .context("追加截图页失败")?;

        Ok(())
    }

    /// 把截图追加为回执 PDF 的最后一页
    ///
    /// # 参数
    /// - `receipt`: 已渲染的回执 PDF（就地被替换）
    /// - `screenshot`: 截图 PNG
    /// - `scratch`: 暂存路径，合并结果先写到这里再 rename 到 `receipt`
    ///
    /// 两个输入文件任一不存在即失败（[`ArtifactError::MissingInput`]）。
    pub fn append_screenshot_page(receipt: &Path, screenshot: &Path, scratch: &Path) -> Result<()> {
        if !receipt.exists() {
            return Err(ArtifactError::MissingInput {
                path: receipt.to_path_buf(),
            }
            .into());
        }
        if !screenshot.exists() {
            return Err(ArtifactError::MissingInput {
                path: screenshot.to_path_buf(),
            }
            .into());
        }

        let mut doc = Document::load(receipt)
            .with_context(|| format!("无法读取回执 PDF: {}", receipt.display()))?;

        let page_id = append_blank_page(&mut doc)?;

        let (px_w, px_h) = image::image_dimensions(screenshot)
            .with_context(|| format!("无法读取截图尺寸: {}", screenshot.display()))?;
        let (w, h) = fit_to_page(px_w, px_h);

        let img = xobject::image(screenshot)
            .with_context(|| format!("无法嵌入截图: {}", screenshot.display()))?;
        doc.insert_image(page_id, img, (PAGE_MARGIN, PAGE_HEIGHT - PAGE_MARGIN - h), (w, h))
            .context("写入截图页失败")?;

        // 先落盘暂存文件，再原子替换最终路径
        doc.save(scratch)
            .with_context(|| format!("写入暂存文件失败: {}", scratch.display()))?;
        fs::rename(scratch, receipt)
            .with_context(|| format!("替换回执 PDF 失败: {}", receipt.display()))?;

        debug!("已合并为两页回执: {}", receipt.display());
        Ok(())
    }
}

impl Default for ReceiptAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// 在文档末尾追加一页空白 A4 页
fn append_blank_page(doc: &mut Document) -> Result<ObjectId> {
    let pages_id = doc
        .catalog()
        .context("回执 PDF 缺少 catalog")?
        .get(b"Pages")
        .context("回执 PDF 缺少页面树")?
        .as_reference()
        .context("页面树引用无效")?;

    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => vec![
            0.into(),
            0.into(),
            PAGE_WIDTH.into(),
            PAGE_HEIGHT.into(),
        ],
        "Contents" => Object::Reference(content_id),
    });

    let pages = doc
        .get_object_mut(pages_id)
        .context("页面树对象缺失")?
        .as_dict_mut()
        .context("页面树不是字典")?;

    let count = pages
        .get(b"Count")
        .context("页面树缺少 Count")?
        .as_i64()
        .context("Count 不是整数")?;
    pages.set("Count", count + 1);

    let kids = pages
        .get_mut(b"Kids")
        .context("页面树缺少 Kids")?
        .as_array_mut()
        .context("Kids 不是数组")?;
    kids.push(Object::Reference(page_id));

    Ok(page_id)
}

/// 把像素尺寸缩放进 A4 内容区，保持纵横比，不放大
fn fit_to_page(px_w: u32, px_h: u32) -> (f32, f32) {
    let max_w = PAGE_WIDTH - 2.0 * PAGE_MARGIN;
    let max_h = PAGE_HEIGHT - 2.0 * PAGE_MARGIN;
    let scale = (max_w / px_w as f32)
        .min(max_h / px_h as f32)
        .min(1.0);
    (px_w as f32 * scale, px_h as f32 * scale)
}
