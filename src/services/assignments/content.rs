//! 内容快照构建
//!
//! 把原始作业内容（文本 + 任意形状的附件 JSON）转换为有序的内容块列表。
//! 附件数据来自旧表或客户端，格式不可信：无法解析时按空列表处理，从不报错。

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::models::assignments::entities::{Attachment, ContentBlock};

/// 内容为空时的占位文本
pub const PLACEHOLDER_TEXT: &str = "Homework details were not provided.";
/// 文本为空时的占位标题
pub const PLACEHOLDER_TITLE: &str = "Homework";
/// 标题最大字符数
pub const TITLE_MAX_CHARS: usize = 120;

const TITLE_ELLIPSIS: &str = "...";
const DEFAULT_FILE_NAME: &str = "attachment";

/// 从序列化的附件字符串构建快照（旧数据入口）
pub fn build_from_raw(text: Option<&str>, attachments_raw: Option<&str>) -> Vec<ContentBlock> {
    let attachments = parse_attachments_raw(attachments_raw);
    build_content_snapshot(text, &attachments)
}

/// 构建内容快照，保证至少包含一个内容块，TEXT 在 MEDIA 之前
pub fn build_content_snapshot(text: Option<&str>, attachments: &Value) -> Vec<ContentBlock> {
    let mut blocks = Vec::with_capacity(2);

    if let Some(content) = text.map(str::trim).filter(|t| !t.is_empty()) {
        blocks.push(ContentBlock::Text {
            id: new_id(),
            content: content.to_string(),
        });
    }

    let attachments = sanitize_attachments(attachments);
    if !attachments.is_empty() {
        blocks.push(ContentBlock::Media {
            id: new_id(),
            attachments,
        });
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            id: new_id(),
            content: PLACEHOLDER_TEXT.to_string(),
        });
    }

    blocks
}

/// 判断原始内容是否包含可用的文本或附件
pub fn has_usable_content(text: Option<&str>, attachments: &Value) -> bool {
    text.is_some_and(|t| !t.trim().is_empty()) || !sanitize_attachments(attachments).is_empty()
}

/// 解析序列化的附件列表，格式错误时返回 Null
pub fn parse_attachments_raw(raw: Option<&str>) -> Value {
    raw.map(str::trim)
        .filter(|r| !r.is_empty())
        .and_then(|r| serde_json::from_str(r).ok())
        .unwrap_or(Value::Null)
}

/// 过滤并规整附件：丢弃非对象或缺少 url 的条目，补全 id / fileName，修正 size
pub fn sanitize_attachments(value: &Value) -> Vec<Attachment> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    let mut seen_ids = HashSet::new();
    entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let url = non_empty_str(entry, &["url"])?;
            let mut id = entry_id(entry).unwrap_or_else(new_id);
            // 同一快照内 id 必须唯一
            if !seen_ids.insert(id.clone()) {
                id = new_id();
                seen_ids.insert(id.clone());
            }
            let file_name = non_empty_str(entry, &["fileName", "file_name", "name"])
                .or_else(|| file_name_from_url(&url))
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

            Some(Attachment {
                id,
                url,
                file_name,
                size: entry.get("size").map_or(0, coerce_size),
            })
        })
        .collect()
}

/// 由文本生成标题：折叠空白，过长截断为 117 字符 + "..."
pub fn derive_title(text: Option<&str>) -> String {
    let normalized = text
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    if normalized.is_empty() {
        return PLACEHOLDER_TITLE.to_string();
    }

    if normalized.chars().count() > TITLE_MAX_CHARS {
        let keep = TITLE_MAX_CHARS - TITLE_ELLIPSIS.chars().count();
        let mut title: String = normalized.chars().take(keep).collect();
        title.push_str(TITLE_ELLIPSIS);
        return title;
    }

    normalized
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn non_empty_str(entry: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn entry_id(entry: &Map<String, Value>) -> Option<String> {
    match entry.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn file_name_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
}

fn coerce_size(value: &Value) -> u64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(size) if size.is_finite() && size > 0.0 => size.floor() as u64,
        _ => 0,
    }
}
