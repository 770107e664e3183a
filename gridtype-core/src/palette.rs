//! Palette System - Fixed Glyph Registries
//!
//! Style packs and box sets are constant records selected by name.
//! An unknown style pack name resolves to `minimal_ascii`.

use serde::Serialize;

pub const FULL_BLOCK: char = '█';
pub const PARTIAL_BLOCKS: [char; 7] = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];
pub const SHADE_LIGHT: char = '░';
pub const SHADE_MEDIUM: char = '▒';
pub const SHADE_DARK: char = '▓';

pub const RULER_PIPE: char = '|';
pub const RULER_DASH: char = '-';
pub const RULER_PLUS: char = '+';

/// Fill glyph used by ASCII density fields.
pub const ASCII_DENSITY_FILL: char = '#';

/// Frame glyphs: horizontal, vertical and the four corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoxSet {
    pub h: char,
    pub v: char,
    pub tl: char,
    pub tr: char,
    pub bl: char,
    pub br: char,
}

pub const BOX_SINGLE: BoxSet = BoxSet { h: '─', v: '│', tl: '┌', tr: '┐', bl: '└', br: '┘' };
pub const BOX_DOUBLE: BoxSet = BoxSet { h: '═', v: '║', tl: '╔', tr: '╗', bl: '╚', br: '╝' };
pub const BOX_HEAVY: BoxSet = BoxSet { h: '━', v: '┃', tl: '┏', tr: '┓', bl: '┗', br: '┛' };
pub const BOX_ASCII: BoxSet = BoxSet { h: '-', v: '|', tl: '+', tr: '+', bl: '+', br: '+' };

/// Named box sets. The Unicode sets come first; `simple` is the ASCII set.
pub static BOX_SETS: [(&str, BoxSet); 4] = [
    ("single", BOX_SINGLE),
    ("double", BOX_DOUBLE),
    ("heavy", BOX_HEAVY),
    ("simple", BOX_ASCII),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StylePack {
    pub name: &'static str,
    pub frame: BoxSet,
    pub fill: char,
    pub empty: char,
    pub ruler: char,
}

pub const DEFAULT_STYLE_PACK: &str = "minimal_ascii";

/// The style pack registry. Entry 0 is the fallback.
pub static STYLE_PACKS: [StylePack; 4] = [
    StylePack { name: "minimal_ascii", frame: BOX_ASCII, fill: '=', empty: ' ', ruler: RULER_PIPE },
    StylePack { name: "bold_unicode", frame: BOX_HEAVY, fill: FULL_BLOCK, empty: SHADE_LIGHT, ruler: RULER_PIPE },
    StylePack { name: "double_frame", frame: BOX_DOUBLE, fill: SHADE_DARK, empty: SHADE_LIGHT, ruler: RULER_PLUS },
    StylePack { name: "hatch_fill", frame: BOX_SINGLE, fill: '║', empty: ' ', ruler: RULER_DASH },
];

/// Look up a style pack, falling back to `minimal_ascii` for unknown names.
pub fn style_pack(name: &str) -> &'static StylePack {
    STYLE_PACKS
        .iter()
        .find(|p| p.name == name)
        .unwrap_or(&STYLE_PACKS[0])
}

/// The pack a render actually uses: `ascii_only` forces the ASCII pack.
pub fn effective_style_pack(name: &str, ascii_only: bool) -> &'static StylePack {
    if ascii_only {
        style_pack(DEFAULT_STYLE_PACK)
    } else {
        style_pack(name)
    }
}

pub fn box_set(name: &str) -> Option<&'static BoxSet> {
    BOX_SETS.iter().find(|(n, _)| *n == name).map(|(_, set)| set)
}

/// The corner that must close a frame row opened by `open`.
///
/// Top-left pairs with top-right, bottom-left with bottom-right, within the
/// same box set. Returns `None` when `open` is not an opening corner.
pub fn closing_corner(open: char) -> Option<char> {
    BOX_SETS.iter().find_map(|(_, set)| {
        if set.tl == open {
            Some(set.tr)
        } else if set.bl == open {
            Some(set.br)
        } else {
            None
        }
    })
}

/// Every glyph any renderer may use to draw the filled part of a bar.
pub fn fill_glyphs() -> Vec<char> {
    let mut glyphs: Vec<char> = STYLE_PACKS.iter().map(|p| p.fill).collect();
    for extra in [FULL_BLOCK, ASCII_DENSITY_FILL] {
        if !glyphs.contains(&extra) {
            glyphs.push(extra);
        }
    }
    glyphs
}

/// Name of the Unicode box set `c` belongs to, if any.
pub fn unicode_box_style(c: char) -> Option<&'static str> {
    BOX_SETS[..3].iter().find_map(|(name, set)| {
        [set.h, set.v, set.tl, set.tr, set.bl, set.br]
            .contains(&c)
            .then_some(*name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_pack_falls_back() {
        assert_eq!(style_pack("no_such_pack").name, "minimal_ascii");
        assert_eq!(style_pack("double_frame").fill, '▓');
    }

    #[test]
    fn test_ascii_only_forces_minimal_pack() {
        let pack = effective_style_pack("bold_unicode", true);
        assert_eq!(pack.name, DEFAULT_STYLE_PACK);
        assert_eq!(pack.fill, '=');
    }

    #[test]
    fn test_closing_corners_pair_within_set() {
        assert_eq!(closing_corner('┏'), Some('┓'));
        assert_eq!(closing_corner('╚'), Some('╝'));
        assert_eq!(closing_corner('+'), Some('+'));
        assert_eq!(closing_corner('│'), None);
    }

    #[test]
    fn test_fill_glyphs_cover_every_pack() {
        let glyphs = fill_glyphs();
        for pack in &STYLE_PACKS {
            assert!(glyphs.contains(&pack.fill), "{} missing", pack.name);
        }
        assert!(glyphs.contains(&'#'));
    }

    #[test]
    fn test_unicode_box_style_lookup() {
        assert_eq!(unicode_box_style('━'), Some("heavy"));
        assert_eq!(unicode_box_style('╗'), Some("double"));
        assert_eq!(unicode_box_style('-'), None);
    }
}
