use specsheet_style::FontWeight;

pub const REGULAR_FONT: &str = "Helvetica";
pub const BOLD_FONT: &str = "Helvetica-Bold";

/// Base-14 font name for a weight.
pub fn base_font_name(weight: FontWeight) -> &'static str {
    if weight.is_bold() { BOLD_FONT } else { REGULAR_FONT }
}

/// Convert layout Y coordinate to PDF Y coordinate (flip origin)
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// Encode text for a WinAnsi simple font. Latin-1 maps directly; anything
/// outside it becomes `?`.
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c as u32 <= 255 { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_name_by_weight() {
        assert_eq!(base_font_name(FontWeight::Regular), "Helvetica");
        assert_eq!(base_font_name(FontWeight::Bold), "Helvetica-Bold");
    }

    #[test]
    fn test_win_ansi_keeps_latin1() {
        assert_eq!(to_win_ansi("30°"), vec![b'3', b'0', 0xB0]);
        assert_eq!(to_win_ansi("≥5"), vec![b'?', b'5']);
    }

    #[test]
    fn test_flip_y() {
        assert_eq!(flip_y(10.0, 842.0), 832.0);
    }
}
