//! String helpers: search normalisation, e-mail checks, lenient integer
//! parsing and opaque random strings.

use std::sync::OnceLock;

use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Returns `true` when `text` looks like a deliverable e-mail address.
pub fn is_email(text: &str) -> bool {
    email_regex().is_match(text)
}

/// Fold a lowercase Vietnamese letter onto its ASCII base.
fn fold_vietnamese(c: char) -> char {
    match c {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ'
        | 'ặ' | 'ẳ' | 'ẵ' => 'a',
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' => 'e',
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' => 'i',
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ'
        | 'ợ' | 'ở' | 'ỡ' => 'o',
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' => 'u',
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Normalise free text for search and comparison.
///
/// Lowercases, folds Vietnamese diacritics to ASCII, turns punctuation and
/// symbols into spaces, collapses whitespace runs and trims.
///
/// # Examples
/// ```
/// use service_utils::domain::standarlize;
///
/// assert_eq!(standarlize("Đà Nẵng!"), "da nang");
/// ```
pub fn standarlize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .map(fold_vietnamese)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lenient integer parse that treats zero as absent.
///
/// Reads an optional sign and the leading run of ASCII digits after any
/// leading whitespace, ignoring trailing characters. Returns `None` when no
/// digits are found, on overflow, **and when the value is zero**: callers
/// cannot tell "0" from "unparseable".
///
/// # Examples
/// ```
/// use service_utils::domain::parse_int_null;
///
/// assert_eq!(parse_int_null("42px"), Some(42));
/// assert_eq!(parse_int_null("0"), None);
/// assert_eq!(parse_int_null("abc"), None);
/// ```
pub fn parse_int_null(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits_len = trimmed
        .get(sign_len..)?
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    let value: i64 = trimmed.get(..sign_len + digits_len)?.parse().ok()?;

    (value != 0).then_some(value)
}

/// Half-open integer range `[start, end)` advancing by `step`.
///
/// Returns an empty vector for a zero step or a step pointing away from
/// `end`.
pub fn range(start: i64, end: i64, step: i64) -> Vec<i64> {
    let mut values = Vec::new();
    if step == 0 {
        return values;
    }

    let mut current = start;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        values.push(current);
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    values
}

/// Random alphanumeric string of `len` characters.
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
