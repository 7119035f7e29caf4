//! Ticker symbol extraction from free text.

/// Company names commonly used in place of their ticker.
const COMPANY_TICKERS: &[(&str, &str)] = &[
    ("APPLE", "AAPL"),
    ("TESLA", "TSLA"),
    ("GOOGLE", "GOOGL"),
    ("ALPHABET", "GOOGL"),
    ("MICROSOFT", "MSFT"),
    ("AMAZON", "AMZN"),
    ("NVIDIA", "NVDA"),
    ("META", "META"),
    ("FACEBOOK", "META"),
    ("NETFLIX", "NFLX"),
];

/// Tickers recognised in any casing.
const KNOWN_TICKERS: &[&str] = &[
    "AAPL", "TSLA", "GOOGL", "GOOG", "MSFT", "AMZN", "NVDA", "META", "NFLX", "AMD", "INTC",
    "IBM", "ORCL", "CRM", "UBER", "DIS", "JPM", "BAC", "KO", "PEP", "WMT", "SPY", "QQQ",
];

/// Upper-case words that look like tickers but almost never are.
const STOPWORDS: &[&str] = &[
    "A", "I", "AI", "AN", "AND", "ARE", "AT", "BUY", "BY", "CAN", "CEO", "DO", "EPS", "ETF",
    "FOR", "HOW", "IN", "IPO", "IS", "IT", "ME", "MY", "NEWS", "NOW", "OF", "ON", "OR", "PE",
    "SELL", "STOCK", "THE", "TO", "US", "USA", "USD", "WHAT", "WHY",
];

/// Best-effort ticker for `query`.
///
/// Checks, in order: company names, `$CASHTAGS` and well-known tickers in any
/// casing, then words written in capitals (1-5 letters, optional `.X` class
/// suffix) that are not common abbreviations.
pub fn extract_symbol(query: &str) -> Option<String> {
    let words: Vec<&str> = words(query).collect();

    for word in &words {
        let upper = word.trim_start_matches('$').to_ascii_uppercase();
        if let Some((_, ticker)) = COMPANY_TICKERS.iter().find(|(name, _)| *name == upper) {
            return Some((*ticker).to_string());
        }
    }

    for word in &words {
        if let Some(tag) = word.strip_prefix('$')
            && is_ticker_shape(&tag.to_ascii_uppercase())
        {
            return Some(tag.to_ascii_uppercase());
        }
        let upper = word.to_ascii_uppercase();
        if KNOWN_TICKERS.contains(&upper.as_str()) {
            return Some(upper);
        }
    }

    words
        .iter()
        .find(|word| is_ticker_shape(word) && !STOPWORDS.contains(word))
        .map(|word| word.to_string())
}

/// Whether `query` names a well-known ticker or listed company.
pub fn mentions_known_ticker(query: &str) -> bool {
    words(query).any(|word| {
        let upper = word.trim_start_matches('$').to_ascii_uppercase();
        KNOWN_TICKERS.contains(&upper.as_str())
            || COMPANY_TICKERS.iter().any(|(name, _)| *name == upper)
    })
}

fn words(query: &str) -> impl Iterator<Item = &str> {
    query
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '$'))
        .map(|word| word.trim_end_matches('.'))
        .filter(|word| !word.is_empty())
}

/// `AAPL`, `F`, `BRK.B`: capitals only, 1-5 letters before an optional class suffix.
fn is_ticker_shape(word: &str) -> bool {
    let (base, class) = match word.split_once('.') {
        Some((base, class)) => (base, Some(class)),
        None => (word, None),
    };
    let base_ok = (1..=5).contains(&base.len()) && base.chars().all(|c| c.is_ascii_uppercase());
    let class_ok = class.is_none_or(|class| class.len() == 1 && class.chars().all(|c| c.is_ascii_uppercase()));
    base_ok && class_ok
}
