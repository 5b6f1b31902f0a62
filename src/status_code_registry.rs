use std::collections::HashMap;

use lazy_static::lazy_static;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

// https://www.iana.org/assignments/http-status-codes/http-status-codes.xhtml

/// The statuses this service answers with.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, EnumIter)]
#[repr(u16)]
pub enum ReasonPhrase {
    #[strum(to_string = "OK")]
    OK = 200,
    #[strum(to_string = "Created")]
    Created = 201,
    #[strum(to_string = "Accepted")]
    Accepted = 202,
    #[strum(to_string = "Bad Request")]
    BadRequest = 400,
    #[strum(to_string = "Not Found")]
    NotFound = 404,
    #[strum(to_string = "Internal Server Error")]
    InternalServerError = 500,
}

impl ReasonPhrase {
    pub fn status_code(self) -> u16 {
        self as u16
    }
}

lazy_static! {
    static ref REASON_PHRASES: HashMap<u16, ReasonPhrase> = ReasonPhrase::iter()
        .map(|reason_phrase| (reason_phrase.status_code(), reason_phrase))
        .collect();
}

pub fn get_reason_phrase(status_code: u16) -> Option<ReasonPhrase> {
    REASON_PHRASES.get(&status_code).copied()
}

#[cfg(test)]
mod tests {
    use super::{get_reason_phrase, ReasonPhrase};

    #[test]
    fn test_get_reason_phrase() {
        let tests = [
            (200, ReasonPhrase::OK),
            (201, ReasonPhrase::Created),
            (202, ReasonPhrase::Accepted),
            (400, ReasonPhrase::BadRequest),
            (404, ReasonPhrase::NotFound),
            (500, ReasonPhrase::InternalServerError),
        ];

        for (status_code, want) in tests {
            assert_eq!(get_reason_phrase(status_code), Some(want));
        }
    }

    #[test]
    fn test_get_reason_phrase_none() {
        assert!(get_reason_phrase(600).is_none());
        assert!(get_reason_phrase(418).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(ReasonPhrase::NotFound.to_string(), "Not Found");
        assert_eq!(ReasonPhrase::InternalServerError.to_string(), "Internal Server Error");
    }
}
