//! Formatting utilities used for CLI and export outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Fine amounts are whole currency units; group thousands with dots (50.000).
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::new();

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    if amount < 0 {
        format!("-{out}")
    } else {
        out
    }
}

pub fn format_meters(m: Option<f64>) -> String {
    match m {
        Some(v) => format!("{:.1} m", v),
        None => "--".to_string(),
    }
}
