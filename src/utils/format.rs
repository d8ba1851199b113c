use crate::shared::schema::TimePeriod;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[cfg(all(feature = "web"))]
pub fn pad2(n: i32) -> String {
    if n < 10 {
        format!("0{}", n)
    } else {
        n.to_string()
    }
}

#[cfg(all(feature = "web"))]
pub fn format_local(rfc3339: &str) -> String {
    use js_sys::Date;
    let d = Date::new(&wasm_bindgen::JsValue::from_str(rfc3339));
    if d.get_time().is_nan() {
        return rfc3339.to_string();
    }
    let day = d.get_date() as i32;
    let month = (d.get_month() as i32) + 1;
    let year = d.get_full_year() as i32;
    let hour = d.get_hours() as i32;
    let minute = d.get_minutes() as i32;
    format!(
        "{}.{}.{} {}:{}",
        pad2(day),
        pad2(month),
        year,
        pad2(hour),
        pad2(minute)
    )
}

#[cfg(not(all(feature = "web")))]
pub fn format_local(rfc3339: &str) -> String {
    use chrono::{DateTime, Local, NaiveDateTime};
    if let Ok(dt) = DateTime::parse_from_rfc3339(rfc3339) {
        return dt.with_timezone(&Local).format("%d.%m.%Y %H:%M").to_string();
    }
    // python's isoformat() has no offset
    match NaiveDateTime::parse_from_str(rfc3339, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.format("%d.%m.%Y %H:%M").to_string(),
        Err(_) => rfc3339.to_string(),
    }
}

/// Like [`format_local`], with a dash for missing timestamps.
pub fn format_local_opt(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => format_local(v),
        _ => "—".to_string(),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if n < 1_000 {
            groups.push(n.to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1_000));
        n /= 1_000;
    }
    groups.reverse();
    groups.join(",")
}

pub fn format_usd(value: f64) -> String {
    let value = finite_or_zero(value);
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

pub fn format_percent(value: f64, digits: usize) -> String {
    format!("{:.*}%", digits, finite_or_zero(value))
}

/// Whole counts print without decimals; fractional ones with two.
pub fn format_request_count(value: f64) -> String {
    let value = finite_or_zero(value);
    let sign = if value < 0.0 { "-" } else { "" };
    if (value % 1.0).abs() > f64::EPSILON {
        let hundredths = (value.abs() * 100.0).round() as u64;
        format!(
            "{sign}{}.{:02}",
            group_thousands(hundredths / 100),
            hundredths % 100
        )
    } else {
        format!("{sign}{}", group_thousands(value.abs() as u64))
    }
}

pub fn format_month_year(period: Option<&TimePeriod>) -> String {
    let Some(p) = period else {
        return "Current period".to_string();
    };
    let month = p.month as i64;
    let year = p.year as i64;
    if !(1..=12).contains(&month) || year <= 0 {
        return "Current period".to_string();
    }
    format!("{} {}", MONTHS[(month - 1) as usize], year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_groups_and_rounds() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(7.326), "$7.33");
        assert_eq!(format_usd(1234567.5), "$1,234,567.50");
        assert_eq!(format_usd(-12.5), "-$12.50");
        assert_eq!(format_usd(f64::NAN), "$0.00");
    }

    #[test]
    fn percent_digits() {
        assert_eq!(format_percent(36.6, 1), "36.6%");
        assert_eq!(format_percent(5.0, 0), "5%");
        assert_eq!(format_percent(f64::INFINITY, 1), "0.0%");
    }

    #[test]
    fn request_counts() {
        assert_eq!(format_request_count(300.0), "300");
        assert_eq!(format_request_count(12000.0), "12,000");
        assert_eq!(format_request_count(12.5), "12.50");
        assert_eq!(format_request_count(1234.25), "1,234.25");
    }

    #[test]
    fn month_year() {
        let p = TimePeriod {
            month: 2.0,
            year: 2026.0,
        };
        assert_eq!(format_month_year(Some(&p)), "February 2026");
        assert_eq!(format_month_year(None), "Current period");
        let bad = TimePeriod {
            month: 13.0,
            year: 2026.0,
        };
        assert_eq!(format_month_year(Some(&bad)), "Current period");
    }

    #[test]
    fn local_time_fallbacks() {
        assert_eq!(format_local_opt(None), "—");
        assert_eq!(format_local_opt(Some("")), "—");
        assert_eq!(format_local("not a date"), "not a date");
        assert_eq!(format_local("2026-02-12T19:03:00.123456"), "12.02.2026 19:03");
    }
}
