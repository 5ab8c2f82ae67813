//! 订单提交服务 - 业务能力层
//!
//! 只负责"让远端接受一个订单"：填表、预览、带有界重试的提交、
//! 读取远端分配的订单编号。不关心截图与回执。
//!
//! 提交循环写在 [`SubmitSurface`] 之上：生产实现按在真实页面上
//! 点击按钮、探测状态指示器，测试实现可以脚本化拒绝次数。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::SubmitError;
use crate::infrastructure::Session;
use crate::models::OrderRecord;

/// 机器人头部下拉框
const HEAD_SELECT: &str = "#head";
/// 腿部编号输入框（按 placeholder 定位）
const LEGS_INPUT: &str = "input[placeholder='Enter the part number for the legs']";
/// 地址输入框
const ADDRESS_INPUT: &str = "#address";
/// 预览按钮
const PREVIEW_BUTTON: &str = "#preview";
/// 提交按钮
const ORDER_BUTTON: &str = "#order";
/// 提交状态指示器
const ALERT_BOX: &str = ".alert";
/// 远端分配的订单编号所在的徽标
const ORDER_BADGE: &str = ".badge-success";

/// 一次提交尝试之后远端的反馈
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// 订单被接受
    Accepted,
    /// 远端返回失败指示（瞬时拒绝，可重试）
    Rejected,
}

/// 提交循环操作的表面
///
/// 把"按一次提交键"和"探测状态指示器"从页面细节中抽出来，
/// 重试语义可以在没有浏览器的情况下验证。
#[async_trait]
pub trait SubmitSurface {
    /// 触发一次提交动作
    async fn press_order(&self) -> Result<()>;

    /// 探测提交状态指示器（单次探测自身有界）
    async fn submission_state(&self) -> Result<SubmissionState>;
}

/// 有界重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大提交尝试次数
    pub max_attempts: usize,
    /// 两次尝试之间的固定退避
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_submit_attempts.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// 运行提交循环，直到远端接受或重试耗尽
///
/// # 返回
/// 返回实际用掉的尝试次数；拒绝 K 次后被接受意味着恰好按了 K+1 次
/// 提交键。重试耗尽返回 [`SubmitError::RetryExhausted`]。
pub async fn run_submit_loop<S>(surface: &S, policy: &RetryPolicy) -> Result<usize>
where
    S: SubmitSurface + Sync + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        surface.press_order().await?;

        match surface.submission_state().await? {
            SubmissionState::Accepted => {
                debug!("提交在第 {} 次尝试时被接受", attempt);
                return Ok(attempt);
            }
            SubmissionState::Rejected => {
                warn!(
                    "⚠️ 提交被拒绝 (第 {}/{} 次尝试)",
                    attempt, max_attempts
                );
                if attempt < max_attempts && !policy.backoff.is_zero() {
                    sleep(policy.backoff).await;
                }
            }
        }
    }

    Err(SubmitError::RetryExhausted {
        attempts: max_attempts,
    }
    .into())
}

/// 生产用的提交表面：在真实订单页面上按键与探测
struct LiveSubmitSurface<'a> {
    session: &'a Session,
    alert_timeout: Duration,
}

#[async_trait]
impl SubmitSurface for LiveSubmitSurface<'_> {
    async fn press_order(&self) -> Result<()> {
        self.session.click(ORDER_BUTTON).await
    }

    async fn submission_state(&self) -> Result<SubmissionState> {
        // 状态指示器在拒绝时带 alert-danger；接受后回执区域同样
        // 挂着 .alert，但 class 不再是 danger
        let class = self
            .session
            .wait_for_attribute(ALERT_BOX, "class", self.alert_timeout)
            .await?;
        match class {
            Some(c) if c.contains("alert-danger") => Ok(SubmissionState::Rejected),
            _ => Ok(SubmissionState::Accepted),
        }
    }
}

/// 订单提交服务
///
/// 职责：
/// - 按订单记录填写表单
/// - 触发预览与提交
/// - 有界重试直到远端接受
/// - 读取远端分配的订单编号
pub struct OrderSubmitter {
    policy: RetryPolicy,
    alert_timeout: Duration,
}

impl OrderSubmitter {
    /// 创建新的订单提交服务
    pub fn new(config: &Config) -> Self {
        Self {
            policy: RetryPolicy::from_config(config),
            alert_timeout: Duration::from_millis(config.alert_timeout_ms),
        }
    }

    /// 提交一个订单并返回远端分配的订单编号
    pub async fn submit(&self, session: &Session, record: &OrderRecord) -> Result<String> {
        self.fill_form(session, record).await?;

        // 预览机器人，截图区域在提交后仍展示它
        session.click(PREVIEW_BUTTON).await.context("预览失败")?;

        let surface = LiveSubmitSurface {
            session,
            alert_timeout: self.alert_timeout,
        };
        let attempts = run_submit_loop(&surface, &self.policy).await?;
        debug!("订单提交用了 {} 次尝试", attempts);

        // 编号由远端分配，提交成功前不存在
        let order_number = session
            .text_content(ORDER_BADGE)
            .await
            .context("读取订单编号失败")?;
        let order_number = order_number.trim().to_string();
        if order_number.is_empty() {
            return Err(SubmitError::MissingOrderNumber.into());
        }

        Ok(order_number)
    }

    /// 按订单记录填写表单
    async fn fill_form(&self, session: &Session, record: &OrderRecord) -> Result<()> {
        session
            .select_option(HEAD_SELECT, &record.head)
            .await
            .context("选择头部失败")?;

        // 身体选项是一组单选框，按 value 匹配
        let body_radio = format!("input[type='radio'][value='{}']", record.body);
        session.click(&body_radio).await.context("选择身体失败")?;

        session
            .fill(LEGS_INPUT, &record.legs)
            .await
            .context("填写腿部编号失败")?;
        session
            .fill(ADDRESS_INPUT, &record.address)
            .await
            .context("填写地址失败")?;

        Ok(())
    }
}
