const COLON_SIGN: char = '₡';
const GROUP_SEPARATOR: char = '\u{a0}';

/// Formats an amount of Costa Rican colones as `₡1 234 567,89`, grouping
/// thousands with a no-break space like the `es-CR` locale does.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{COLON_SIGN}{amount}");
    }

    let cents = (amount.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc();
    let fraction = (cents - whole * 100.0) as u64;
    let digits = format!("{whole:.0}");

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}{COLON_SIGN}{grouped},{fraction:02}")
}
