use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;

use crate::error::AppError;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{3,30}$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-zÀ-ÿ' -]{2,40}$").unwrap();
}

/// First year a film is known to exist.
pub const MIN_YEAR: i32 = 1878;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name.trim())
}

pub fn is_valid_year(year: i32) -> bool {
    (MIN_YEAR..=OffsetDateTime::now_utc().year()).contains(&year)
}

/// Review ratings are bounded inclusively; 1.0 and 10.0 are accepted.
pub fn is_valid_rating(rating: f64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

pub fn check_username(username: &str) -> Result<(), AppError> {
    if is_valid_username(username) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "username must be 3-30 characters: letters, digits or _".into(),
        ))
    }
}

pub fn check_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::Validation("invalid e-mail address".into()))
    }
}

pub fn check_name(name: &str, which: &str) -> Result<(), AppError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{which} may only contain letters, spaces, - and '"
        )))
    }
}

pub fn check_year(year: i32) -> Result<(), AppError> {
    if is_valid_year(year) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "year must be between {MIN_YEAR} and the current year"
        )))
    }
}

pub fn check_rating(rating: f64) -> Result<(), AppError> {
    if is_valid_rating(rating) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}

pub fn check_not_blank(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_format() {
        assert!(is_valid_username("alice_42"));
        assert!(is_valid_username("abc"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("dot.ted"));
        assert!(!is_valid_username(&"x".repeat(31)));
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b-c@sub.domain.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@mail.com"));
    }

    #[test]
    fn name_format() {
        assert!(is_valid_name("Ada"));
        assert!(is_valid_name("O'Brien"));
        assert!(is_valid_name("Jean-Luc"));
        assert!(is_valid_name("  Ada  "));
        assert!(!is_valid_name("X"));
        assert!(!is_valid_name("R2D2"));
    }

    #[test]
    fn year_bounds() {
        assert!(is_valid_year(MIN_YEAR));
        assert!(is_valid_year(2010));
        assert!(!is_valid_year(1877));
        assert!(!is_valid_year(OffsetDateTime::now_utc().year() + 1));
    }

    #[test]
    fn rating_boundaries_accepted_outside_rejected() {
        assert!(is_valid_rating(1.0));
        assert!(is_valid_rating(10.0));
        assert!(is_valid_rating(7.5));
        assert!(!is_valid_rating(0.0));
        assert!(!is_valid_rating(0.9));
        assert!(!is_valid_rating(10.1));
        assert!(!is_valid_rating(11.0));
    }

    #[test]
    fn check_rating_reports_validation_error() {
        let err = check_rating(11.0).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(check_rating(10.0).is_ok());
    }

    #[test]
    fn blank_check() {
        assert!(check_not_blank("title", "title").is_ok());
        assert!(check_not_blank("   ", "title").is_err());
    }
}
