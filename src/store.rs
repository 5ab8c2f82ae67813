//! 产物存储布局
//!
//! 只负责"路径从哪来"：截图、回执、合并暂存文件和最终压缩包的磁盘布局。
//! 订单编号在一次运行内假定唯一；同一编号再次写入会直接覆盖旧产物。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// 产物存储
///
/// 布局：
/// ```text
/// <root>/
///   images/<order_number>.png
///   receipts/<order_number>.pdf
///   receipts.zip
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// 创建新的产物存储（不触碰磁盘）
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 输出根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 截图目录
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// 回执目录
    pub fn receipts_dir(&self) -> PathBuf {
        self.root.join("receipts")
    }

    /// 某个订单的截图路径
    pub fn image_path(&self, order_number: &str) -> PathBuf {
        self.images_dir().join(format!("{}.png", order_number))
    }

    /// 某个订单的回执 PDF 路径
    pub fn receipt_path(&self, order_number: &str) -> PathBuf {
        self.receipts_dir().join(format!("{}.pdf", order_number))
    }

    /// 合并时使用的暂存路径（写完后原子 rename 到 receipt_path）
    pub fn merge_scratch_path(&self, order_number: &str) -> PathBuf {
        self.receipts_dir().join(format!("{}.pdf.tmp", order_number))
    }

    /// 最终压缩包路径
    pub fn archive_path(&self) -> PathBuf {
        self.root.join("receipts.zip")
    }

    /// 确保 images/ 和 receipts/ 目录存在
    ///
    /// 幂等：每个订单处理前都可以安全调用，不会影响已有文件。
    pub fn ensure_dirs(&self) -> Result<()> {
        let images = self.images_dir();
        fs::create_dir_all(&images)
            .with_context(|| format!("无法创建目录: {}", images.display()))?;
        let receipts = self.receipts_dir();
        fs::create_dir_all(&receipts)
            .with_context(|| format!("无法创建目录: {}", receipts.display()))?;
        Ok(())
    }
}
