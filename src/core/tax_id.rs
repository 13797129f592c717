//! CPF and CNPJ (Brazilian taxpayer IDs) check digit validation.
//!
//! Both documents carry two trailing modulo-11 check digits. Input may be
//! masked (`123.456.789-09`, `11.222.333/0001-81`); every non-digit is
//! discarded before validation.

use rand::Rng;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const CPF_FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Branch suffix of a company's head office.
const CNPJ_HEAD_OFFICE: [u8; 4] = [0, 0, 0, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    Cpf,
    Cnpj,
}

impl TaxIdKind {
    pub fn digits(self) -> usize {
        match self {
            TaxIdKind::Cpf => 11,
            TaxIdKind::Cnpj => 14,
        }
    }
}

impl fmt::Display for TaxIdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxIdKind::Cpf => write!(f, "CPF"),
            TaxIdKind::Cnpj => write!(f, "CNPJ"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    #[error("{kind} must have {expected} digits, found {found}")]
    WrongLength {
        kind: TaxIdKind,
        expected: usize,
        found: usize,
    },

    #[error("{kind} cannot consist of a single repeated digit")]
    RepeatedDigits { kind: TaxIdKind },

    #[error("{kind} check digit at position {position} should be {expected}, found {found}")]
    CheckDigitMismatch {
        kind: TaxIdKind,
        position: usize,
        expected: u8,
        found: u8,
    },
}

pub fn strip_non_digits(input: &str) -> String {
    static NON_DIGIT: OnceLock<Regex> = OnceLock::new();
    let re = NON_DIGIT.get_or_init(|| Regex::new(r"[^0-9]").expect("static regex"));
    re.replace_all(input, "").into_owned()
}

/// Modulo-11 check digit: `0` when the remainder is below 2, else `11 - remainder`.
pub fn check_digit(digits: &[u8], weights: &[u32]) -> u8 {
    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(&d, &w)| u32::from(d) * w)
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

pub fn validate_cpf(input: &str) -> Result<(), TaxIdError> {
    validate(
        TaxIdKind::Cpf,
        input,
        &CPF_FIRST_WEIGHTS,
        &CPF_SECOND_WEIGHTS,
    )
}

pub fn is_valid_cpf(input: &str) -> bool {
    validate_cpf(input).is_ok()
}

pub fn validate_cnpj(input: &str) -> Result<(), TaxIdError> {
    validate(
        TaxIdKind::Cnpj,
        input,
        &CNPJ_FIRST_WEIGHTS,
        &CNPJ_SECOND_WEIGHTS,
    )
}

pub fn is_valid_cnpj(input: &str) -> bool {
    validate_cnpj(input).is_ok()
}

fn validate(
    kind: TaxIdKind,
    input: &str,
    first_weights: &[u32],
    second_weights: &[u32],
) -> Result<(), TaxIdError> {
    let digits = to_digits(&strip_non_digits(input));

    if digits.len() != kind.digits() {
        return Err(TaxIdError::WrongLength {
            kind,
            expected: kind.digits(),
            found: digits.len(),
        });
    }

    if digits.iter().all(|&d| d == digits[0]) {
        return Err(TaxIdError::RepeatedDigits { kind });
    }

    for weights in [first_weights, second_weights] {
        let position = weights.len();
        let expected = check_digit(&digits[..position], weights);
        if digits[position] != expected {
            return Err(TaxIdError::CheckDigitMismatch {
                kind,
                position: position + 1,
                expected,
                found: digits[position],
            });
        }
    }

    tracing::debug!("{} {} is valid", kind, mask(kind, &digits));
    Ok(())
}

fn to_digits(numeric: &str) -> Vec<u8> {
    numeric.bytes().map(|b| b - b'0').collect()
}

fn mask(kind: TaxIdKind, digits: &[u8]) -> String {
    let d: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
    match kind {
        TaxIdKind::Cpf => format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]),
        TaxIdKind::Cnpj => format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        ),
    }
}

/// Applies the `000.000.000-00` mask; `None` unless the input holds exactly 11 digits.
pub fn format_cpf(input: &str) -> Option<String> {
    let digits = to_digits(&strip_non_digits(input));
    (digits.len() == TaxIdKind::Cpf.digits()).then(|| mask(TaxIdKind::Cpf, &digits))
}

/// Applies the `00.000.000/0000-00` mask; `None` unless the input holds exactly 14 digits.
pub fn format_cnpj(input: &str) -> Option<String> {
    let digits = to_digits(&strip_non_digits(input));
    (digits.len() == TaxIdKind::Cnpj.digits()).then(|| mask(TaxIdKind::Cnpj, &digits))
}

pub fn generate_cpf<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits: Vec<u8> = loop {
        let base: Vec<u8> = (0..9).map(|_| rng.gen_range(0..=9)).collect();
        if base.iter().any(|&d| d != base[0]) {
            break base;
        }
    };
    append_check_digits(&mut digits, &CPF_FIRST_WEIGHTS, &CPF_SECOND_WEIGHTS);
    mask(TaxIdKind::Cpf, &digits)
}

/// Random head-office CNPJ: the root never starts with zero and the branch is `0001`.
pub fn generate_cnpj<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits = Vec::with_capacity(TaxIdKind::Cnpj.digits());
    digits.push(rng.gen_range(1..=9));
    digits.extend((0..7).map(|_| rng.gen_range(0..=9u8)));
    digits.extend_from_slice(&CNPJ_HEAD_OFFICE);
    append_check_digits(&mut digits, &CNPJ_FIRST_WEIGHTS, &CNPJ_SECOND_WEIGHTS);
    mask(TaxIdKind::Cnpj, &digits)
}

fn append_check_digits(digits: &mut Vec<u8>, first_weights: &[u32], second_weights: &[u32]) {
    let first = check_digit(digits, first_weights);
    digits.push(first);
    let second = check_digit(digits, second_weights);
    digits.push(second);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_valid_cpf_with_and_without_mask() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf(" 529 982 247 25 "));
        assert!(is_valid_cpf("111.444.777-35"));
    }

    #[test]
    fn test_cpf_repeated_digits_rejected() {
        for d in 0..=9 {
            let cpf = d.to_string().repeat(11);
            assert_eq!(
                validate_cpf(&cpf),
                Err(TaxIdError::RepeatedDigits {
                    kind: TaxIdKind::Cpf
                })
            );
        }
    }

    #[test]
    fn test_cpf_wrong_length() {
        assert_eq!(
            validate_cpf("529.982.247-2"),
            Err(TaxIdError::WrongLength {
                kind: TaxIdKind::Cpf,
                expected: 11,
                found: 10
            })
        );
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn test_cpf_check_digit_mismatch() {
        assert_eq!(
            validate_cpf("529.982.247-35"),
            Err(TaxIdError::CheckDigitMismatch {
                kind: TaxIdKind::Cpf,
                position: 10,
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            validate_cpf("529.982.247-26"),
            Err(TaxIdError::CheckDigitMismatch {
                kind: TaxIdKind::Cpf,
                position: 11,
                expected: 5,
                found: 6
            })
        );
    }

    #[test]
    fn test_valid_cnpj() {
        assert!(is_valid_cnpj("11.222.333/0001-81"));
        assert!(is_valid_cnpj("11222333000181"));
        assert!(is_valid_cnpj("45.723.174/0001-10"));
    }

    #[test]
    fn test_invalid_cnpj() {
        assert!(!is_valid_cnpj("11.222.333/0001-82"));
        assert!(!is_valid_cnpj("11.222.333/0001"));
        for d in 0..=9 {
            assert!(!is_valid_cnpj(&d.to_string().repeat(14)));
        }
    }

    #[test]
    fn test_check_digit_low_remainder_is_zero() {
        // 1*10 = 10, 10 % 11 = 10 -> 1; 11 % 11 = 0 -> 0
        assert_eq!(check_digit(&[1], &[10]), 1);
        assert_eq!(check_digit(&[1], &[11]), 0);
        assert_eq!(check_digit(&[1], &[12]), 0);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_cpf("52998224725").as_deref(), Some("529.982.247-25"));
        assert_eq!(
            format_cnpj("11222333000181").as_deref(),
            Some("11.222.333/0001-81")
        );
        assert_eq!(format_cpf("1234"), None);
        assert_eq!(format_cnpj("52998224725"), None);
    }

    #[test]
    fn test_generated_documents_validate() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let cpf = generate_cpf(&mut rng);
            assert!(is_valid_cpf(&cpf), "{cpf}");
            assert!(is_valid_cpf(&strip_non_digits(&cpf)));

            let cnpj = generate_cnpj(&mut rng);
            assert!(is_valid_cnpj(&cnpj), "{cnpj}");
            assert!(!cnpj.starts_with('0'));
            assert_eq!(&cnpj[11..15], "0001");
        }
    }
}
