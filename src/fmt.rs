fn with_commas(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    format!("{grouped}.{dec_part}")
}

/// Format a float as cedis with thousands separators: GH₵1,234.56
pub fn money(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    format!("{sign}GH\u{20b5}{}", with_commas(val))
}

/// ASCII-only variant for the builtin PDF fonts: GHS 1,234.56
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
pub fn money_ascii(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    format!("{sign}GHS {}", with_commas(val))
}

/// Signed variance: +GH₵5.00 / -GH₵5.00 / GH₵0.00
pub fn signed_money(val: f64) -> String {
    if val > 0.0 {
        format!("+{}", money(val))
    } else {
        money(val)
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
