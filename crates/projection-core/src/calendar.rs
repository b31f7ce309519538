//! 日曆工具：月末週一、Excel 日期序號

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// 可接受的日期文字格式
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%Y%m%d"];

/// 可接受的日期時間文字格式
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// 取得月份最後一天
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?;
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// 取得月份的最後一個週一
///
/// 從月底往回找；月底本身是週一時即為答案
pub fn last_monday_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let last_day = last_day_of_month(year, month)?;
    let offset = last_day.weekday().num_days_from_monday();
    last_day.checked_sub_signed(Duration::days(offset as i64))
}

/// 月份標籤（YYYY-MM）
pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn excel_epoch() -> NaiveDate {
    // 1899-12-30 為序號 0（沿用 Excel 1900 日期系統）
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// 當日零時
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Excel 日期序號轉日期時間（小數部分為時間，取到秒）
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_466.0 {
        return None;
    }
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    start_of_day(excel_epoch())
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Excel 日期序號轉日期（忽略時間部分）
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if serial > 2_958_465.0 {
        return None;
    }
    excel_serial_to_datetime(serial.floor()).map(|dt| dt.date())
}

/// 日期轉 Excel 日期序號
pub fn date_to_excel_serial(date: NaiveDate) -> f64 {
    (date - excel_epoch()).num_days() as f64
}

/// 日期時間轉 Excel 日期序號
pub fn datetime_to_excel_serial(datetime: NaiveDateTime) -> f64 {
    (datetime - start_of_day(excel_epoch())).num_seconds() as f64 / 86_400.0
}

/// 解析日期或日期時間文字；只有日期時為當日零時
pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(start_of_day)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        })
}

/// 解析日期文字（捨去時間）
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    parse_datetime_text(text).map(|dt| dt.date())
}
