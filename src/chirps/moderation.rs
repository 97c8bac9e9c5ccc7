//! Content policy applied to every new chirp: a hard length cap and whole-word redaction.

use crate::error::{AppError, AppResult};

/// Longest accepted body, counted in characters.
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Words replaced on sight, compared case-insensitively.
pub const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

pub const REDACTED: &str = "****";

pub fn check_length(body: &str) -> AppResult<()> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(AppError::user("chirp_too_long", "Chirp is too long"));
    }
    Ok(())
}

/// Split on single spaces, swap every denylisted word for `****`, rejoin with single spaces.
///
/// Only bare words match: `"Sharbert!"` carries punctuation and is left alone, and a
/// denylisted word inside a longer word is never touched.
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lowered = word.to_lowercase();
            if PROFANE_WORDS.contains(&lowered.as_str()) { REDACTED } else { word }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
