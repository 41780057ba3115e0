use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;

const BINARY_SUFFIXES: &[&str] = &["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const DECIMAL_SUFFIXES: &[&str] = &["n", "u", "m", "k", "M", "G", "T", "P", "E"];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuantityFormatError {
    #[error("quantity string is empty")]
    Empty,

    #[error("`{0}` is not a decimal number")]
    InvalidNumber(String),

    #[error("`{0}` is not a valid quantity suffix")]
    InvalidSuffix(String),
}

/// Validates `value` against the Kubernetes quantity grammar and wraps it.
///
/// The grammar is `<signed number><suffix>` where the number is a decimal
/// with an optional fractional part, and the suffix is empty, a binary-SI
/// suffix (`Ki`..`Ei`), a decimal-SI suffix (`n`..`E`), or a decimal exponent
/// (`e9`, `E-2`). Invalid strings never become a [`Quantity`].
pub fn parse_quantity(value: &str) -> Result<Quantity, QuantityFormatError> {
    if value.is_empty() {
        return Err(QuantityFormatError::Empty);
    }

    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let number_len = unsigned
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .count();
    let (number, suffix) = unsigned.split_at(number_len);

    let well_formed = number.chars().any(|c| c.is_ascii_digit())
        && number.chars().filter(|c| *c == '.').count() <= 1;
    if !well_formed {
        return Err(QuantityFormatError::InvalidNumber(value.to_owned()));
    }

    if !suffix.is_empty() && !is_valid_suffix(suffix) {
        return Err(QuantityFormatError::InvalidSuffix(suffix.to_owned()));
    }

    Ok(Quantity(value.to_owned()))
}

fn is_valid_suffix(suffix: &str) -> bool {
    if BINARY_SUFFIXES.contains(&suffix) || DECIMAL_SUFFIXES.contains(&suffix) {
        return true;
    }

    // Decimal exponent: `e`/`E` followed by an optionally signed integer.
    let Some(exponent) = suffix.strip_prefix(['e', 'E']) else {
        return false;
    };
    let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);

    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1")]
    #[case("250m")]
    #[case("0.5")]
    #[case("256Mi")]
    #[case("2Gi")]
    #[case("100k")]
    #[case("1e3")]
    #[case("1E-2")]
    #[case("+2")]
    #[case("-2")]
    #[case(".5")]
    #[case("128974848")]
    fn accepts_valid_quantities(#[case] value: &str) {
        assert_eq!(parse_quantity(value), Ok(Quantity(value.to_owned())));
    }

    #[rstest]
    #[case("2xyz", QuantityFormatError::InvalidSuffix("xyz".to_owned()))]
    #[case("not-a-number", QuantityFormatError::InvalidNumber("not-a-number".to_owned()))]
    #[case("1.2.3", QuantityFormatError::InvalidNumber("1.2.3".to_owned()))]
    #[case("Mi", QuantityFormatError::InvalidNumber("Mi".to_owned()))]
    #[case("100ki", QuantityFormatError::InvalidSuffix("ki".to_owned()))]
    #[case("1ee2", QuantityFormatError::InvalidSuffix("ee2".to_owned()))]
    #[case("1e", QuantityFormatError::InvalidSuffix("e".to_owned()))]
    #[case("-", QuantityFormatError::InvalidNumber("-".to_owned()))]
    fn rejects_malformed_quantities(#[case] value: &str, #[case] expected: QuantityFormatError) {
        assert_eq!(parse_quantity(value), Err(expected));
    }

    #[rstest]
    fn rejects_empty_string() {
        assert_eq!(parse_quantity(""), Err(QuantityFormatError::Empty));
    }
}
