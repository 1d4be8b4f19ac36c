use thiserror::Error;

/// FilterToken
///
/// The closed set of values the `filter` query parameter can take once validated.
/// `None` stands for the absence of the parameter, not for an unrecognized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterToken {
    None,
    Local,
    AllLocal,
}

/// FILTER_VOCABULARY
///
/// Wire spelling of every token that may appear in a request. Matching is exact
/// and case-sensitive.
pub const FILTER_VOCABULARY: [(&str, FilterToken); 2] = [
    ("local", FilterToken::Local),
    ("all-local", FilterToken::AllLocal),
];

impl FilterToken {
    /// Wire spelling of the token, `None` for the absent parameter.
    pub fn as_str(&self) -> Option<&'static str> {
        FILTER_VOCABULARY
            .iter()
            .find(|(_, token)| token == self)
            .map(|(key, _)| *key)
    }
}

/// InvalidFilter
///
/// The raw value did not match any key of the vocabulary. Terminal for the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown video filter `{raw}`")]
pub struct InvalidFilter {
    pub raw: String,
}

/// validate
///
/// Parses the raw `filter` query value. An absent parameter is `FilterToken::None`;
/// anything else must be a vocabulary key verbatim. The empty string is rejected
/// like any other unknown value.
pub fn validate(raw: Option<&str>) -> Result<FilterToken, InvalidFilter> {
    let Some(raw) = raw else {
        return Ok(FilterToken::None);
    };

    FILTER_VOCABULARY
        .iter()
        .find(|(key, _)| *key == raw)
        .map(|(_, token)| *token)
        .ok_or_else(|| InvalidFilter {
            raw: raw.to_string(),
        })
}
