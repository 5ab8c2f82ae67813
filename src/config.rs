/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口（设置后连接已运行的浏览器，否则启动无头浏览器）
    pub browser_debug_port: Option<u16>,
    /// 订单表单页面 URL
    pub target_url: String,
    /// 订单数据集（CSV）下载地址
    pub orders_url: String,
    /// 产物输出目录
    pub output_dir: String,
    /// 每次浏览器动作之后的减速延迟（毫秒）
    pub slowmo_ms: u64,
    /// 每次探测提交状态指示器的等待上限（毫秒）
    pub alert_timeout_ms: u64,
    /// 单个订单的最大提交尝试次数
    pub max_submit_attempts: usize,
    /// 两次提交尝试之间的固定退避（毫秒）
    pub retry_backoff_ms: u64,
    /// 单个订单失败后是否继续处理后续订单
    pub continue_on_error: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: None,
            target_url: "https://robotsparebinindustries.com/#/robot-order".to_string(),
            orders_url: "https://robotsparebinindustries.com/orders.csv".to_string(),
            output_dir: "output".to_string(),
            slowmo_ms: 100,
            alert_timeout_ms: 2000,
            max_submit_attempts: 10,
            retry_backoff_ms: 500,
            continue_on_error: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            orders_url: std::env::var("ORDERS_URL").unwrap_or(default.orders_url),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            slowmo_ms: std::env::var("SLOWMO_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.slowmo_ms),
            alert_timeout_ms: std::env::var("ALERT_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.alert_timeout_ms),
            max_submit_attempts: std::env::var("MAX_SUBMIT_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_submit_attempts),
            retry_backoff_ms: std::env::var("RETRY_BACKOFF_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_backoff_ms),
            continue_on_error: std::env::var("CONTINUE_ON_ERROR").ok().and_then(|v| v.parse().ok()).unwrap_or(default.continue_on_error),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
