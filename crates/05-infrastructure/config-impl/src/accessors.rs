//! 类型化配置访问器
//!
//! 所有访问器都建立在 [`ConfigValueReader::get_value`] 之上，解析失败时静默返回默认值。
//! 时间与时长的默认值先按固定格式序列化再交给 `get_value`，
//! 找到与未找到两种情况走同一条解析路径。

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use config_abstractions::ConfigValueReader;

/// 本地时间的往返格式
pub const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// 类型化配置访问器 trait
pub trait TypedValueAccessor: ConfigValueReader {
    /// 读取 `i32`
    fn get_i32(&self, key: &str, default_value: i32) -> i32 {
        self.get_value(key, &default_value.to_string())
            .trim()
            .parse()
            .unwrap_or(default_value)
    }

    /// 读取 `i64`
    fn get_i64(&self, key: &str, default_value: i64) -> i64 {
        self.get_value(key, &default_value.to_string())
            .trim()
            .parse()
            .unwrap_or(default_value)
    }

    /// 读取 `f64`
    fn get_f64(&self, key: &str, default_value: f64) -> f64 {
        self.get_value(key, &default_value.to_string())
            .trim()
            .parse()
            .unwrap_or(default_value)
    }

    /// 读取布尔值，不区分大小写
    fn get_bool(&self, key: &str, default_value: bool) -> bool {
        parse_bool(&self.get_value(key, &default_value.to_string())).unwrap_or(default_value)
    }

    /// 读取时长，格式见 [`parse_duration`]
    fn get_duration(&self, key: &str, default_value: Duration) -> Duration {
        parse_duration(&self.get_value(key, &format_duration(default_value)))
            .unwrap_or(default_value)
    }

    /// 读取不带时区的时间
    fn get_naive_datetime(&self, key: &str, default_value: NaiveDateTime) -> NaiveDateTime {
        let formatted = default_value.format(NAIVE_DATETIME_FORMAT).to_string();
        parse_naive_datetime(&self.get_value(key, &formatted)).unwrap_or(default_value)
    }

    /// 读取带时区偏移的时间（RFC 3339）
    fn get_datetime(
        &self,
        key: &str,
        default_value: DateTime<FixedOffset>,
    ) -> DateTime<FixedOffset> {
        let formatted = default_value.to_rfc3339_opts(SecondsFormat::AutoSi, false);
        DateTime::parse_from_rfc3339(self.get_value(key, &formatted).trim())
            .unwrap_or(default_value)
    }
}

impl<R: ConfigValueReader + ?Sized> TypedValueAccessor for R {}

/// 解析布尔值
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// 解析不带时区的时间
///
/// 接受往返格式，也接受只有日期的写法（视为零点）。
pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, NAIVE_DATETIME_FORMAT)
        .ok()
        .or_else(|| value.parse::<NaiveDateTime>().ok())
        .or_else(|| {
            value
                .parse::<NaiveDate>()
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// 格式化时长
///
/// 天数为零时省略天数段，纳秒为零时省略小数段。
pub fn format_duration(duration: Duration) -> String {
    let (sign, nanos) = match duration.num_nanoseconds() {
        Some(nanos) => (if nanos < 0 { "-" } else { "" }, i128::from(nanos).abs()),
        // 超出纳秒表示范围时退化到秒精度
        None => {
            let seconds = i128::from(duration.num_seconds());
            (
                if seconds < 0 { "-" } else { "" },
                seconds.abs() * i128::from(NANOS_PER_SECOND),
            )
        }
    };

    let total_seconds = nanos / i128::from(NANOS_PER_SECOND);
    let fraction = nanos % i128::from(NANOS_PER_SECOND);
    let days = total_seconds / i128::from(SECONDS_PER_DAY);
    let hours = total_seconds % i128::from(SECONDS_PER_DAY) / i128::from(SECONDS_PER_HOUR);
    let minutes = total_seconds % i128::from(SECONDS_PER_HOUR) / i128::from(SECONDS_PER_MINUTE);
    let seconds = total_seconds % i128::from(SECONDS_PER_MINUTE);

    let mut formatted = String::from(sign);
    if days > 0 {
        formatted.push_str(&format!("{days}."));
    }
    formatted.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if fraction > 0 {
        formatted.push_str(&format!(".{fraction:09}"));
    }
    formatted
}

/// 解析时长
///
/// 接受 `d`（只有天数）、`[d.]hh:mm` 和 `[d.]hh:mm:ss[.fffffffff]` 三种写法。
/// 时、分、秒分别限定在 0-23、0-59、0-59，小数部分最多 9 位。
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, body) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let (days, hours, minutes, seconds, fraction) = match parts.as_slice() {
        [days] => (parse_digits(days)?, 0, 0, 0, 0),
        [day_hour, minutes] => {
            let (days, hours) = parse_day_hour(day_hour)?;
            (days, hours, parse_digits(minutes)?, 0, 0)
        }
        [day_hour, minutes, second_fraction] => {
            let (days, hours) = parse_day_hour(day_hour)?;
            let (seconds, fraction) = match second_fraction.split_once('.') {
                Some((seconds, fraction)) => (parse_digits(seconds)?, parse_fraction(fraction)?),
                None => (parse_digits(second_fraction)?, 0),
            };
            (days, hours, parse_digits(minutes)?, seconds, fraction)
        }
        _ => return None,
    };

    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    let total_seconds = days
        .checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours * SECONDS_PER_HOUR + minutes * SECONDS_PER_MINUTE + seconds)?;
    let nanos = total_seconds
        .checked_mul(NANOS_PER_SECOND)?
        .checked_add(fraction)?;

    Some(Duration::nanoseconds(if negative { -nanos } else { nanos }))
}

fn parse_day_hour(value: &str) -> Option<(i64, i64)> {
    match value.split_once('.') {
        Some((days, hours)) => Some((parse_digits(days)?, parse_digits(hours)?)),
        None => Some((0, parse_digits(value)?)),
    }
}

fn parse_digits(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// 小数秒右侧补零到纳秒
fn parse_fraction(value: &str) -> Option<i64> {
    if value.len() > 9 {
        return None;
    }
    let digits = parse_digits(value)?;
    let padding = u32::try_from(9 - value.len()).ok()?;
    digits.checked_mul(10_i64.pow(padding))
}
