use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

const PASSWORD_SYMBOLS: &str = "@$!%*?&";
const MIN_PASSWORD_LEN: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Sign-up rule: at least eight characters drawn from letters, digits and `@$!%*?&`, with at
/// least one of each of upper, lower, digit and symbol.
pub fn is_strong_password(password: &str) -> bool {
    let allowed = password
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(ch));

    allowed
        && password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|ch| ch.is_ascii_uppercase())
        && password.chars().any(|ch| ch.is_ascii_lowercase())
        && password.chars().any(|ch| ch.is_ascii_digit())
        && password.chars().any(|ch| PASSWORD_SYMBOLS.contains(ch))
}

/// Sign-in rule: at least eight characters including an uppercase letter and a digit.
pub fn is_acceptable_sign_in_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|ch| ch.is_ascii_uppercase())
        && password.chars().any(|ch| ch.is_ascii_digit())
}
