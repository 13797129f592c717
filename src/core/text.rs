use regex::{Captures, Regex};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// `exemplo_de_texto` -> `ExemploDeTexto`. Each word keeps only its first
/// character uppercased; the rest is lowercased.
pub fn snake_to_pascal(input: &str) -> String {
    input.split('_').map(capitalize).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Version 4 UUID with the RFC 4122 variant; hyphens are optional and case is ignored.
pub fn is_uuid(input: &str) -> bool {
    static UUID_V4: OnceLock<Regex> = OnceLock::new();
    let re = UUID_V4.get_or_init(|| {
        Regex::new(
            r"(?i)^[0-9a-f]{8}-?[0-9a-f]{4}-?4[0-9a-f]{3}-?[89ab][0-9a-f]{3}-?[0-9a-f]{12}$",
        )
        .expect("static regex")
    });
    re.is_match(input)
}

/// Decodes HTML character references in one pass: named (`&lt;`, `&atilde;`),
/// decimal (`&#60;`) and hexadecimal (`&#x3C;`), the numeric ones with or
/// without the trailing `;`, plus backslash decimal codes (`\060`).
///
/// Unknown names are left as they are. Numeric references to NUL, surrogates
/// or values past U+10FFFF become U+FFFD.
pub fn decode_html_entities(input: &str) -> String {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    let re = ENTITY.get_or_init(|| {
        Regex::new(
            r"&#[xX]([0-9a-fA-F]+);?|&#([0-9]+);?|&([A-Za-z][A-Za-z0-9]{1,31});|\\([0-9]{1,4})",
        )
        .expect("static regex")
    });

    re.replace_all(input, |caps: &Captures| {
        if let Some(hex) = caps.get(1) {
            return numeric_reference(u32::from_str_radix(hex.as_str(), 16).ok()).to_string();
        }
        if let Some(decimal) = caps.get(2) {
            return numeric_reference(decimal.as_str().parse().ok()).to_string();
        }
        if let Some(name) = caps.get(3) {
            return match named_entity(name.as_str()) {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            };
        }
        // at most four digits, always a valid scalar value
        caps[4]
            .parse()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

fn numeric_reference(code: Option<u32>) -> char {
    code.filter(|&c| c != 0)
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "deg" => '°',
        "ordf" => 'ª',
        "ordm" => 'º',
        "euro" => '€',
        "laquo" => '«',
        "raquo" => '»',
        "middot" => '·',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "aacute" => 'á',
        "agrave" => 'à',
        "atilde" => 'ã',
        "acirc" => 'â',
        "auml" => 'ä',
        "eacute" => 'é',
        "egrave" => 'è',
        "ecirc" => 'ê',
        "euml" => 'ë',
        "iacute" => 'í',
        "igrave" => 'ì',
        "icirc" => 'î',
        "iuml" => 'ï',
        "oacute" => 'ó',
        "ograve" => 'ò',
        "otilde" => 'õ',
        "ocirc" => 'ô',
        "ouml" => 'ö',
        "uacute" => 'ú',
        "ugrave" => 'ù',
        "ucirc" => 'û',
        "uuml" => 'ü',
        "ccedil" => 'ç',
        "ntilde" => 'ñ',
        "Aacute" => 'Á',
        "Agrave" => 'À',
        "Atilde" => 'Ã',
        "Acirc" => 'Â',
        "Auml" => 'Ä',
        "Eacute" => 'É',
        "Egrave" => 'È',
        "Ecirc" => 'Ê',
        "Euml" => 'Ë',
        "Iacute" => 'Í',
        "Igrave" => 'Ì',
        "Icirc" => 'Î',
        "Iuml" => 'Ï',
        "Oacute" => 'Ó',
        "Ograve" => 'Ò',
        "Otilde" => 'Õ',
        "Ocirc" => 'Ô',
        "Ouml" => 'Ö',
        "Uacute" => 'Ú',
        "Ugrave" => 'Ù',
        "Ucirc" => 'Û',
        "Uuml" => 'Ü',
        "Ccedil" => 'Ç',
        "Ntilde" => 'Ñ',
        _ => return None,
    };
    Some(c)
}

/// Composes the text to NFC, then folds every accented vowel onto its acute
/// form (`ã`, `â`, `à`, `ä` -> `á`). `ç` and `ñ` are only composed.
pub fn normalize_accents(input: &str) -> String {
    input.nfc().map(fold_to_acute).collect()
}

fn fold_to_acute(c: char) -> char {
    match c {
        'á' | 'à' | 'ã' | 'â' | 'ä' => 'á',
        'é' | 'è' | 'ê' | 'ë' => 'é',
        'í' | 'ì' | 'î' | 'ï' => 'í',
        'ó' | 'ò' | 'õ' | 'ô' | 'ö' => 'ó',
        'ú' | 'ù' | 'û' | 'ü' => 'ú',
        'Á' | 'À' | 'Ã' | 'Â' | 'Ä' => 'Á',
        'É' | 'È' | 'Ê' | 'Ë' => 'É',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'Í',
        'Ó' | 'Ò' | 'Õ' | 'Ô' | 'Ö' => 'Ó',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'Ú',
        other => other,
    }
}
