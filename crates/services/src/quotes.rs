use chrono::{Datelike, NaiveDate};

/// Pool of motivational quotes for the daily challenge view.
pub const QUOTES: &[&str] = &[
    "Discipline is choosing between what you want now and what you want most.",
    "You don't have to be extreme, just consistent.",
    "The days are long but the decades are short.",
    "Small daily improvements are the key to staggering long-term results.",
    "What you do every day matters more than what you do once in a while.",
    "Focus is a muscle. Train it.",
    "Done is better than perfect.",
    "Hard choices, easy life. Easy choices, hard life.",
    "A year from now you may wish you had started today.",
    "Motivation gets you going; habit keeps you going.",
    "Deep work is the superpower of the 21st century.",
    "The best time to plant a tree was 20 years ago. The second best time is now.",
];

/// Deterministic quote for a calendar date.
///
/// Selection is seeded by the date's numeric form (yyyymmdd) so repeated
/// calls on the same day always pick the same quote.
#[must_use]
pub fn quote_for_date(date: NaiveDate) -> &'static str {
    let key = i64::from(date.year()) * 10_000
        + i64::from(date.month()) * 100
        + i64::from(date.day());
    let len = i64::try_from(QUOTES.len()).expect("quote pool fits in i64");
    let idx = usize::try_from(key.rem_euclid(len)).expect("index in range");
    QUOTES[idx]
}
