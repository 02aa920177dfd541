// ==========================================
// 缩放引擎 - 告警文本国际化
// ==========================================
// 语言: en（缺省/回退）、zh-CN
// 输入的语言标签先归一化，未知语言回退到 en
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

/// 回退语言
pub const FALLBACK_LOCALE: &str = "en";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 语言标签归一化（"zh_CN" / "zh-cn" / "zh-Hans" → "zh-CN"，"en-US" → "en"）
///
/// 无法识别时返回 None
pub fn normalize_locale(locale: &str) -> Option<&'static str> {
    let tag = locale.trim().replace('_', "-").to_ascii_lowercase();
    let primary = tag.split(['-', '.']).next().unwrap_or("");
    match primary {
        "en" => Some("en"),
        "zh" => Some("zh-CN"),
        _ => None,
    }
}

/// 设置语言，返回实际生效的语言
pub fn set_locale(locale: &str) -> &'static str {
    let applied = normalize_locale(locale).unwrap_or_else(|| {
        tracing::warn!(requested = locale, fallback = FALLBACK_LOCALE, "unsupported locale");
        FALLBACK_LOCALE
    });
    rust_i18n::set_locale(applied);
    applied
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use formula_scaling::i18n::t;
/// let msg = t("scaling.warning.zero_normalizable_sum");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use formula_scaling::i18n::t_with_args;
/// let msg = t_with_args("scaling.warning.balancing_row_unavailable", &[("row_id", "R1")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
