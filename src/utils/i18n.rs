//! 多语言字段：数据库中以 JSON 对象 `{ locale: text }` 保存

use serde_json::{Map, Value};

/// 取值顺序：请求语言 -> 主语言 -> 任意一个非空值
pub fn resolve_localized(value: &Value, locale: Option<&str>, main_language: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let pick = |key: &str| {
                map.get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            locale
                .and_then(pick)
                .or_else(|| pick(main_language))
                .or_else(|| {
                    map.values()
                        .filter_map(Value::as_str)
                        .find(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_default()
        }
        _ => String::new(),
    }
}

/// 将纯文本写入指定语言，保留其它语言的已有值
pub fn merge_localized(existing: Option<&Value>, text: &str, locale: &str) -> Value {
    let mut map = match existing {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    map.insert(locale.to_string(), Value::String(text.to_string()));
    Value::Object(map)
}

/// 请求语言不在支持列表中时回退为主语言
pub fn normalize_locale<'a>(
    requested: Option<&'a str>,
    languages: &'a [String],
    main_language: &'a str,
) -> &'a str {
    requested
        .filter(|l| languages.iter().any(|s| s == l))
        .unwrap_or(main_language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_localized_fallbacks() {
        let v = json!({"en": "Spin", "vi": "Quay"});
        assert_eq!(resolve_localized(&v, Some("vi"), "en"), "Quay");
        assert_eq!(resolve_localized(&v, Some("fr"), "en"), "Spin");
        assert_eq!(resolve_localized(&v, None, "en"), "Spin");

        let only_vi = json!({"vi": "Quay"});
        assert_eq!(resolve_localized(&only_vi, Some("en"), "en"), "Quay");

        assert_eq!(resolve_localized(&json!("plain"), Some("en"), "en"), "plain");
        assert_eq!(resolve_localized(&json!(null), Some("en"), "en"), "");
    }

    #[test]
    fn test_merge_localized_keeps_other_locales() {
        let v = json!({"en": "Spin"});
        let merged = merge_localized(Some(&v), "Quay", "vi");
        assert_eq!(merged, json!({"en": "Spin", "vi": "Quay"}));

        let replaced = merge_localized(Some(&merged), "Wheel", "en");
        assert_eq!(replaced["en"], "Wheel");
        assert_eq!(replaced["vi"], "Quay");

        assert_eq!(merge_localized(None, "x", "en"), json!({"en": "x"}));
    }

    #[test]
    fn test_normalize_locale() {
        let langs = vec!["en".to_string(), "vi".to_string()];
        assert_eq!(normalize_locale(Some("vi"), &langs, "en"), "vi");
        assert_eq!(normalize_locale(Some("jp"), &langs, "en"), "en");
        assert_eq!(normalize_locale(None, &langs, "en"), "en");
    }
}
