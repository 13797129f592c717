use crate::utils::error::{CaixaError, Result};
use qrcode::{Color, EcLevel, QrCode};

#[derive(Debug, Clone)]
pub struct QrOptions {
    pub error_correction: EcLevel,
    /// Quiet zone width in modules.
    pub border: u32,
    /// Swap dark and light, for terminals with a light background.
    pub invert: bool,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            error_correction: EcLevel::H,
            border: 4,
            invert: false,
        }
    }
}

pub fn parse_ec_level(value: &str) -> Result<EcLevel> {
    match value.to_ascii_uppercase().as_str() {
        "L" => Ok(EcLevel::L),
        "M" => Ok(EcLevel::M),
        "Q" => Ok(EcLevel::Q),
        "H" => Ok(EcLevel::H),
        _ => Err(CaixaError::InvalidConfigValueError {
            field: "error_correction".to_string(),
            value: value.to_string(),
            reason: "Expected one of L, M, Q, H".to_string(),
        }),
    }
}

/// Encodes `data` at the smallest version that fits and draws it with
/// half-block characters, two module rows per text line.
pub fn render_ascii(data: &str, options: &QrOptions) -> Result<String> {
    if data.is_empty() {
        return Err(CaixaError::InvalidConfigValueError {
            field: "data".to_string(),
            value: String::new(),
            reason: "Nothing to encode".to_string(),
        });
    }

    let code = QrCode::with_error_correction_level(data.as_bytes(), options.error_correction)?;
    tracing::debug!(
        "Encoded {} bytes as {:?} ({}x{} modules)",
        data.len(),
        code.version(),
        code.width(),
        code.width()
    );

    let grid = ModuleGrid::new(code.width(), code.to_colors(), options.border as usize);
    Ok(grid.render(options.invert))
}

struct ModuleGrid {
    width: usize,
    colors: Vec<Color>,
    border: usize,
}

impl ModuleGrid {
    fn new(width: usize, colors: Vec<Color>, border: usize) -> Self {
        Self {
            width,
            colors,
            border,
        }
    }

    fn size(&self) -> usize {
        self.width + 2 * self.border
    }

    /// Coordinates include the quiet zone, which is always light.
    fn is_dark(&self, x: usize, y: usize) -> bool {
        if x < self.border || y < self.border {
            return false;
        }
        let (x, y) = (x - self.border, y - self.border);
        if x >= self.width || y >= self.width {
            return false;
        }
        self.colors[y * self.width + x] == Color::Dark
    }

    fn render(&self, invert: bool) -> String {
        let size = self.size();
        let mut out = String::with_capacity((size + 1) * size.div_ceil(2) * 3);

        for y in (0..size).step_by(2) {
            for x in 0..size {
                let top = self.is_dark(x, y) != invert;
                let bottom = if y + 1 < size {
                    self.is_dark(x, y + 1) != invert
                } else {
                    invert
                };
                out.push(match (top, bottom) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_dimensions() {
        let rendered = render_ascii("https://example.com", &QrOptions::default()).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
        // odd module count plus two borders of four
        assert_eq!(lines.len(), width.div_ceil(2));
        assert!((21 + 8..=177 + 8).contains(&width));
    }

    #[test]
    fn test_border_is_blank() {
        let rendered = render_ascii("hello", &QrOptions::default()).unwrap();
        let first = rendered.lines().next().unwrap();
        assert!(first.chars().all(|c| c == ' '));
    }

    #[test]
    fn test_invert_fills_border() {
        let options = QrOptions {
            invert: true,
            ..QrOptions::default()
        };
        let rendered = render_ascii("hello", &options).unwrap();
        let first = rendered.lines().next().unwrap();
        assert!(first.chars().all(|c| c == '█'));
    }

    #[test]
    fn test_zero_border() {
        let options = QrOptions {
            border: 0,
            ..QrOptions::default()
        };
        let rendered = render_ascii("hello", &options).unwrap();
        // finder pattern occupies the top-left corner
        assert!(rendered.starts_with('█'));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(render_ascii("", &QrOptions::default()).is_err());
    }

    #[test]
    fn test_oversized_input_rejected() {
        let data = "x".repeat(4000);
        let err = render_ascii(&data, &QrOptions::default()).unwrap_err();
        assert!(matches!(err, CaixaError::QrError(_)));
    }

    #[test]
    fn test_parse_ec_level() {
        assert_eq!(parse_ec_level("h").unwrap(), EcLevel::H);
        assert_eq!(parse_ec_level("L").unwrap(), EcLevel::L);
        assert!(parse_ec_level("X").is_err());
    }
}
