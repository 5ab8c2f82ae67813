//! 归档服务 - 业务能力层
//!
//! 整趟运行只调用一次：把 receipts 目录当前的全部内容打进一个
//! zip 压缩包。压缩包反映的是目录状态，不是某个显式的成功列表。

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArtifactError;
use crate::store::ArtifactStore;

/// 归档服务
///
/// 职责：
/// - 把 receipts/ 目录内容压缩为 output/receipts.zip
/// - 覆盖已存在的旧压缩包
/// - receipts 目录不存在（没有任何订单成功）即失败
pub struct ArchiveFinalizer;

impl ArchiveFinalizer {
    /// 创建新的归档服务
    pub fn new() -> Self {
        Self
    }

    /// 归档全部回执，返回压缩包路径
    pub fn archive(&self, store: &ArtifactStore) -> Result<PathBuf> {
        let receipts_dir = store.receipts_dir();
        if !receipts_dir.is_dir() {
            return Err(ArtifactError::ReceiptsDirMissing { path: receipts_dir }.into());
        }

        // 固定条目顺序，压缩包内容可复现
        let mut entries: Vec<PathBuf> = fs::read_dir(&receipts_dir)
            .with_context(|| format!("无法读取回执目录: {}", receipts_dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        entries.sort();

        let archive_path = store.archive_path();
        // File::create 截断旧文件，旧压缩包直接被替换
        let file = File::create(&archive_path)
            .with_context(|| format!("无法创建压缩包: {}", archive_path.display()))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for path in &entries {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            debug!("归档条目: {}", name);
            zip.start_file(name, options)
                .with_context(|| format!("无法写入压缩包条目: {}", path.display()))?;
            let mut src = File::open(path)
                .with_context(|| format!("无法读取回执: {}", path.display()))?;
            io::copy(&mut src, &mut zip)
                .with_context(|| format!("压缩失败: {}", path.display()))?;
        }

        zip.finish().context("关闭压缩包失败")?;
        info!("🗜️ 已归档 {} 份回执 → {}", entries.len(), archive_path.display());

        Ok(archive_path)
    }
}

impl Default for ArchiveFinalizer {
    fn default() -> Self {
        Self::new()
    }
}
