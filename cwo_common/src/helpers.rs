use crate::Rupees;

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Storefront clients send prices as decimal strings ("499", "499.00").
/// Parses one into paise. A missing fractional part means whole rupees.
pub fn parse_rupee_price(price: &str) -> Option<Rupees> {
    let mut parts = price.trim().split('.');
    let whole = parts.next()?.parse::<i64>().ok()?;
    let paise = match parts.next() {
        None | Some("") => 0,
        Some(frac) if frac.len() <= 2 => {
            let n = frac.parse::<i64>().ok()?;
            if frac.len() == 1 {
                n * 10
            } else {
                n
            }
        },
        Some(_) => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Rupees::from(whole * 100 + paise))
}
