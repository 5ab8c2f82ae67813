//! 离线属性测试
//!
//! 不需要浏览器即可验证的核心性质：存储布局的幂等性、提交重试的
//! 终止语义、合并后的页序、归档的完整性，以及订单 CSV 的解析。

use std::fs::{self, File};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use robot_order_submit::services::{
    run_submit_loop, ArchiveFinalizer, ReceiptAssembler, RetryPolicy, SubmissionState,
    SubmitSurface,
};
use robot_order_submit::{parse_orders, ArtifactError, ArtifactStore, Config, SubmitError};

// ========== 存储布局 ==========

#[test]
fn artifact_paths_follow_layout() {
    let store = ArtifactStore::new("output");

    assert_eq!(store.image_path("12345"), Path::new("output/images/12345.png"));
    assert_eq!(
        store.receipt_path("12345"),
        Path::new("output/receipts/12345.pdf")
    );
    assert_eq!(store.archive_path(), Path::new("output/receipts.zip"));
    assert_eq!(
        store.merge_scratch_path("12345"),
        Path::new("output/receipts/12345.pdf.tmp")
    );
}

#[test]
fn ensure_dirs_is_idempotent() {
    let tmp = tempfile::tempdir().expect("创建临时目录失败");
    let store = ArtifactStore::new(tmp.path());

    store.ensure_dirs().expect("第一次创建目录失败");

    // 第二次调用之间写入的文件必须原样保留
    let sibling = store.receipts_dir().join("12345.pdf");
    fs::write(&sibling, b"receipt").unwrap();

    store.ensure_dirs().expect("重复创建目录失败");

    assert!(store.images_dir().is_dir());
    assert!(store.receipts_dir().is_dir());
    assert_eq!(fs::read(&sibling).unwrap(), b"receipt");
}

// ========== 提交重试 ==========

/// 脚本化的提交表面：先拒绝 N 次，之后接受
struct ScriptedSurface {
    rejections: usize,
    presses: AtomicUsize,
}

impl ScriptedSurface {
    fn new(rejections: usize) -> Self {
        Self {
            rejections,
            presses: AtomicUsize::new(0),
        }
    }

    fn presses(&self) -> usize {
        self.presses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmitSurface for ScriptedSurface {
    async fn press_order(&self) -> anyhow::Result<()> {
        self.presses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn submission_state(&self) -> anyhow::Result<SubmissionState> {
        if self.presses() <= self.rejections {
            Ok(SubmissionState::Rejected)
        } else {
            Ok(SubmissionState::Accepted)
        }
    }
}

fn no_backoff(max_attempts: usize) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff: std::time::Duration::ZERO,
    }
}

#[tokio::test]
async fn submit_retry_presses_exactly_k_plus_one_times() {
    // 拒绝 3 次之后接受 → 恰好按 4 次提交键
    let surface = ScriptedSurface::new(3);

    let attempts = run_submit_loop(&surface, &no_backoff(10))
        .await
        .expect("循环应在接受时返回");

    assert_eq!(attempts, 4);
    assert_eq!(surface.presses(), 4);
}

#[tokio::test]
async fn submit_retry_accepts_first_attempt_without_retry() {
    let surface = ScriptedSurface::new(0);

    let attempts = run_submit_loop(&surface, &no_backoff(10)).await.unwrap();

    assert_eq!(attempts, 1);
    assert_eq!(surface.presses(), 1);
}

#[tokio::test]
async fn submit_retry_exhaustion_is_typed() {
    // 永远拒绝 → 用完配额后返回具名错误，不会无限循环
    let surface = ScriptedSurface::new(usize::MAX);

    let err = run_submit_loop(&surface, &no_backoff(3))
        .await
        .expect_err("重试应耗尽");

    assert_eq!(surface.presses(), 3);
    match err.downcast_ref::<SubmitError>() {
        Some(SubmitError::RetryExhausted { attempts }) => assert_eq!(*attempts, 3),
        other => panic!("期望 RetryExhausted，实际: {:?}", other),
    }
}

// ========== 回执合并 ==========

/// 生成一份单页 PDF，内容为给定文本
fn write_single_page_pdf(path: &Path, text: &str) {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    });
    let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
        "Resources" => Object::Reference(resources_id),
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("写入测试 PDF 失败");
}

/// 生成一张纯色截图 PNG
fn write_screenshot_png(path: &Path) {
    let img = image::RgbImage::new(64, 48);
    img.save(path).expect("写入测试 PNG 失败");
}

#[test]
fn merged_receipt_keeps_receipt_first_and_screenshot_second() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path());
    store.ensure_dirs().unwrap();

    let receipt = store.receipt_path("12345");
    let screenshot = store.image_path("12345");
    let scratch = store.merge_scratch_path("12345");
    write_single_page_pdf(&receipt, "receipt");
    write_screenshot_png(&screenshot);

    ReceiptAssembler::append_screenshot_page(&receipt, &screenshot, &scratch)
        .expect("合并应成功");

    let doc = lopdf::Document::load(&receipt).expect("合并结果应是合法 PDF");
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 2, "合并后必须恰好两页");

    // 第 1 页仍是原始回执内容
    let first_content = doc.get_page_content(pages[&1]).unwrap();
    assert!(String::from_utf8_lossy(&first_content).contains("receipt"));

    // 第 2 页挂着图片资源
    let second = doc.get_object(pages[&2]).unwrap().as_dict().unwrap();
    assert!(second.has(b"Resources"));

    // 暂存文件不能留在最终目录里
    assert!(!scratch.exists());
}

#[test]
fn merge_fails_when_screenshot_is_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path());
    store.ensure_dirs().unwrap();

    let receipt = store.receipt_path("12345");
    write_single_page_pdf(&receipt, "receipt");

    let err = ReceiptAssembler::append_screenshot_page(
        &receipt,
        &store.image_path("12345"),
        &store.merge_scratch_path("12345"),
    )
    .expect_err("截图缺失必须失败");

    assert!(matches!(
        err.downcast_ref::<ArtifactError>(),
        Some(ArtifactError::MissingInput { .. })
    ));
}

#[test]
fn same_order_number_overwrites_prior_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path());
    store.ensure_dirs().unwrap();

    // 同一个编号走两遍装配，后一次静默覆盖前一次
    for text in ["first", "second"] {
        let receipt = store.receipt_path("77");
        let screenshot = store.image_path("77");
        write_single_page_pdf(&receipt, text);
        write_screenshot_png(&screenshot);
        ReceiptAssembler::append_screenshot_page(
            &receipt,
            &screenshot,
            &store.merge_scratch_path("77"),
        )
        .expect("覆盖写入不应报错");
    }

    let receipts: Vec<_> = fs::read_dir(store.receipts_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(receipts.len(), 1, "同一编号只能留下一份回执");

    let doc = lopdf::Document::load(store.receipt_path("77")).unwrap();
    let content = doc.get_page_content(doc.get_pages()[&1]).unwrap();
    assert!(String::from_utf8_lossy(&content).contains("second"));
}

// ========== 归档 ==========

#[test]
fn archive_contains_every_receipt() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path());
    store.ensure_dirs().unwrap();

    fs::write(store.receipt_path("12345"), b"pdf-one").unwrap();
    fs::write(store.receipt_path("12346"), b"pdf-two").unwrap();

    let archive_path = ArchiveFinalizer::new().archive(&store).expect("归档失败");

    let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);
    assert!(archive.by_name("12345.pdf").is_ok());
    assert!(archive.by_name("12346.pdf").is_ok());
}

#[test]
fn archive_replaces_prior_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path());
    store.ensure_dirs().unwrap();

    fs::write(store.receipt_path("1"), b"one").unwrap();
    ArchiveFinalizer::new().archive(&store).unwrap();

    // 第二趟多了一份回执，压缩包必须反映目录的最新状态
    fs::write(store.receipt_path("2"), b"two").unwrap();
    let archive_path = ArchiveFinalizer::new().archive(&store).unwrap();

    let archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);
}

#[test]
fn archive_requires_receipts_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path());

    let err = ArchiveFinalizer::new()
        .archive(&store)
        .expect_err("没有回执目录必须失败");

    assert!(matches!(
        err.downcast_ref::<ArtifactError>(),
        Some(ArtifactError::ReceiptsDirMissing { .. })
    ));
}

// ========== 数据集解析 ==========

#[test]
fn parse_orders_reads_named_columns() {
    let csv = "\
Order number,Head,Body,Legs,Address
1,2,1,333,Main St
2,3,2,444,Side St
";
    let orders = parse_orders(csv.as_bytes()).expect("解析失败");

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].order_number, "1");
    assert_eq!(orders[0].head, "2");
    assert_eq!(orders[0].body, "1");
    assert_eq!(orders[0].legs, "333");
    assert_eq!(orders[0].address, "Main St");
    assert_eq!(orders[1].address, "Side St");
}

#[test]
fn parse_orders_keeps_dataset_row_order() {
    let csv = "\
Order number,Head,Body,Legs,Address
9,1,1,1,A
3,1,1,1,B
7,1,1,1,C
";
    let orders = parse_orders(csv.as_bytes()).unwrap();
    let ids: Vec<_> = orders.iter().map(|o| o.order_number.as_str()).collect();
    assert_eq!(ids, ["9", "3", "7"]);
}

#[test]
fn parse_orders_rejects_missing_columns() {
    let csv = "\
Order number,Head,Body
1,2,1
";
    assert!(parse_orders(csv.as_bytes()).is_err());
}

// ========== 配置 ==========

#[test]
fn config_defaults_match_baseline() {
    let config = Config::default();

    assert_eq!(config.output_dir, "output");
    assert_eq!(config.max_submit_attempts, 10);
    assert_eq!(config.alert_timeout_ms, 2000);
    assert!(!config.continue_on_error);
    assert!(config.browser_debug_port.is_none());
}
