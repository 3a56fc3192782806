//! Point-size and character-width conversions
//!
//! Word measures in points while the Chinese formatting convention speaks in
//! named sizes (字号) and character counts (字). Field dumps sent to the
//! analyzer carry both so the model can reason in either unit.

/// Named Chinese font sizes and their point values, largest first
const FONT_SIZE_NAMES: [(f32, &str); 15] = [
    (42.0, "初号"),
    (36.0, "小初"),
    (26.0, "一号"),
    (24.0, "小一"),
    (22.0, "二号"),
    (18.0, "小二"),
    (16.0, "三号"),
    (15.0, "小三"),
    (14.0, "四号"),
    (12.0, "小四"),
    (10.5, "五号"),
    (9.0, "小五"),
    (7.5, "六号"),
    (5.5, "小六"),
    (5.0, "七号"),
];

/// Map a point size to the nearest named Chinese size (字号)
pub fn font_size_name(pt: f32) -> &'static str {
    let mut best = FONT_SIZE_NAMES[0];
    for candidate in FONT_SIZE_NAMES {
        if (candidate.0 - pt).abs() < (best.0 - pt).abs() {
            best = candidate;
        }
    }
    best.1
}

/// Width of one CJK character in points for a given font and size.
///
/// In Word a CJK glyph is nominally as wide as its point size; Latin fonts
/// run narrower, and the common CJK faces render slightly under nominal.
pub fn char_width(font: &str, size_pt: f32) -> f32 {
    let factor = match font {
        "宋体" | "SimSun" | "仿宋" | "FangSong" | "仿宋_GB2312" | "黑体" | "SimHei"
        | "楷体" | "KaiTi" | "Default" => 1.0,
        "微软雅黑" | "Microsoft YaHei" => 0.95,
        "Arial" | "Times New Roman" | "Calibri" => 0.6,
        _ => 1.0,
    };

    let base = size_pt * factor;
    match font {
        // Word renders the common CJK faces slightly under nominal width
        "宋体" | "SimSun" | "仿宋" | "FangSong" | "仿宋_GB2312" | "Default" => base * 0.92,
        _ => base,
    }
}

/// Convert a point measurement into character units (字) for the given font
/// and size, rounded to 0.1
pub fn pt_to_chars(pt: f32, font: &str, size_pt: f32) -> f32 {
    if pt <= 0.0 {
        return 0.0;
    }
    let chars = pt / char_width(font, size_pt);
    (chars * 10.0).round() / 10.0
}

/// Format a character count the way the dialog shows it (2字, 2.5字)
pub fn format_chars(chars: f32) -> String {
    if chars == chars.trunc() {
        format!("{}字", chars as i64)
    } else {
        format!("{chars}字")
    }
}
