// ==========================================
// 缩放引擎 - 日志初始化
// ==========================================
// 输出格式: 文本（本地调试）或 JSON（宿主应用采集）
// 环境变量: RUST_LOG 控制级别，FORMULA_SCALING_LOG_FORMAT 控制格式
// ==========================================

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// 环境变量：日志输出格式（text / json）
pub const ENV_LOG_FORMAT: &str = "FORMULA_SCALING_LOG_FORMAT";

/// 未设置 RUST_LOG 时的缺省过滤器
pub const DEFAULT_FILTER: &str = "formula_scaling=info";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("未知日志格式: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl LogFormat {
    /// 从环境变量值解析；缺省或无法识别时为 Text
    pub fn from_env_value(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化日志系统，格式由 FORMULA_SCALING_LOG_FORMAT 决定
///
/// # 示例
/// ```no_run
/// use formula_scaling::logging;
/// logging::init();
/// ```
pub fn init() {
    let value = std::env::var(ENV_LOG_FORMAT).ok();
    init_with(LogFormat::from_env_value(value.as_deref()));
}

/// 按指定格式初始化；已有全局 subscriber 时不覆盖
pub fn init_with(format: LogFormat) {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    let installed = match format {
        LogFormat::Text => builder
            .with_target(true)
            .with_line_number(true)
            .try_init()
            .is_ok(),
        LogFormat::Json => builder.json().with_current_span(true).try_init().is_ok(),
    };
    if installed {
        tracing::debug!(format = %format, "日志系统已初始化");
    }
}

/// 初始化 JSON 格式日志（供宿主应用采集）
pub fn init_json() {
    init_with(LogFormat::Json);
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试；重复调用安全
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
