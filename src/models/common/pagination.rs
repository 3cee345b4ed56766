use serde::{Deserialize, Serialize};

// 游标分页查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct CursorQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string_to_i64")]
    pub cursor: Option<i64>,
    #[serde(
        default = "default_size",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub size: i64,
}

impl CursorQuery {
    /// 将页大小限制在 1..=100
    pub fn clamped_size(&self) -> u64 {
        self.size.clamp(1, 100) as u64
    }
}

// 游标分页结果，next_cursor 为空表示已到末尾
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<i64>,
}

impl<T> CursorPage<T> {
    /// 根据本页内容构造下一页游标：本页不满一页时视为结束
    pub fn from_items(items: Vec<T>, size: u64, id_of: impl Fn(&T) -> i64) -> Self {
        let next_cursor = if (items.len() as u64) < size {
            None
        } else {
            items.last().map(id_of)
        };
        Self { items, next_cursor }
    }
}

// 自定义反序列化函数，支持字符串到i64的转换
fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};
    use std::fmt;

    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if value <= i64::MAX as u64 {
                Ok(value as i64)
            } else {
                Err(Error::invalid_value(Unexpected::Unsigned(value), &self))
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .parse()
                .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

fn deserialize_optional_string_to_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_string_to_i64(deserializer).map(Some)
}

fn default_size() -> i64 {
    20
}

impl Default for CursorQuery {
    fn default() -> Self {
        Self {
            cursor: None,
            size: 20,
        }
    }
}
