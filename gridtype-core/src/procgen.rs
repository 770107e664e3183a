//! Procedural Generators - Seeded, Pure, Reproducible
//!
//! Every generator is a function of its arguments only. The PRNG is a 32-bit
//! xorshift; a sequence is `s0 = seed, s(i) = step(s(i-1))`.
//!
//! `density_field` and `procedural_border` cost O(width * height) in time and
//! memory. Callers bound the dimensions.

use serde::{Deserialize, Serialize};

use crate::palette::{ASCII_DENSITY_FILL, BOX_ASCII, BOX_SINGLE, SHADE_DARK};
use crate::rounding::round_half_up;

pub const SPARK_UNICODE: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
pub const SPARK_ASCII: [char; 4] = ['.', '-', '=', '#'];

/// Per-position stride between sparkline variation seeds.
const SPARK_STRIDE: u32 = 1337;

/// One xorshift32 step.
pub fn step(state: u32) -> u32 {
    let mut x = state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

/// The PRNG walk starting after `seed`.
#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }
}

impl Iterator for Xorshift32 {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.state = step(self.state);
        Some(self.state)
    }
}

pub fn rand_sequence(seed: u32, count: usize) -> Vec<u32> {
    Xorshift32::new(seed).take(count).collect()
}

/// Map values onto a block-glyph ramp.
///
/// With a seed, roughly one position in ten is nudged one glyph up or down;
/// the decision for position `i` comes from `step(seed + i * 1337)` alone.
pub fn sparkline(values: &[f64], ascii_only: bool, seed: Option<u32>) -> String {
    let palette: &[char] = if ascii_only { &SPARK_ASCII } else { &SPARK_UNICODE };
    if values.is_empty() {
        return String::new();
    }

    let finite = values.iter().copied().filter(|v| v.is_finite());
    let lo = finite.clone().fold(f64::INFINITY, f64::min);
    let hi = finite.fold(f64::NEG_INFINITY, f64::max);
    if !(hi > lo) {
        return palette[0].to_string().repeat(values.len());
    }

    let top = palette.len() - 1;
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if !v.is_finite() {
                return palette[0];
            }
            let normalized = (v - lo) / (hi - lo);
            let mut idx = round_half_up(normalized * top as f64).clamp(0, top as i64) as usize;
            if let Some(seed) = seed {
                idx = nudge(idx, top, seed, i);
            }
            palette[idx]
        })
        .collect()
}

fn nudge(idx: usize, top: usize, seed: u32, position: usize) -> usize {
    let roll = step(seed.wrapping_add((position as u32).wrapping_mul(SPARK_STRIDE))) >> 24;
    if roll % 10 != 0 {
        return idx;
    }
    let up = (roll / 10) % 2 == 0;
    match (up, idx) {
        (true, i) if i < top => i + 1,
        (true, i) => i - 1,
        (false, 0) => 1,
        (false, i) => i - 1,
    }
}

/// Alternating diagonal separator. A seed flips about one cell in twenty.
pub fn braid(width: usize, ascii_only: bool, seed: Option<u32>) -> String {
    let (a, b) = if ascii_only { ('/', '\\') } else { ('╱', '╲') };
    let mut walk = seed.map(Xorshift32::new);
    (0..width)
        .map(|i| {
            let flipped = walk
                .as_mut()
                .and_then(|w| w.next())
                .is_some_and(|s| s % 20 == 0);
            if (i % 2 == 0) != flipped {
                a
            } else {
                b
            }
        })
        .collect()
}

/// A `width x height` field where each cell is filled when the next PRNG
/// state falls below `density * 2^32`. One walk covers the grid row-major.
pub fn density_field(width: usize, height: usize, density: f64, ascii_only: bool, seed: u32) -> Vec<String> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let fill = if ascii_only { ASCII_DENSITY_FILL } else { SHADE_DARK };
    // NaN casts to 0
    let threshold = (density.clamp(0.0, 1.0) * 4_294_967_296.0) as u64;
    let mut walk = Xorshift32::new(seed);

    (0..height)
        .map(|_| {
            (0..width)
                .map(|_| match walk.next() {
                    Some(s) if u64::from(s) < threshold => fill,
                    _ => ' ',
                })
                .collect::<String>()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Rough,
    Clean,
}

impl BorderStyle {
    /// `"rough"` selects the rough style; any other name is clean.
    pub fn from_name(name: &str) -> Self {
        if name == "rough" {
            Self::Rough
        } else {
            Self::Clean
        }
    }
}

/// A framed rectangle. In the rough style about one horizontal edge cell in
/// ten is replaced by a wave glyph.
pub fn procedural_border(
    width: usize,
    height: usize,
    style: BorderStyle,
    ascii_only: bool,
    seed: u32,
) -> Vec<String> {
    if width < 3 || height < 3 {
        return Vec::new();
    }
    let (frame, rough) = if ascii_only { (BOX_ASCII, '~') } else { (BOX_SINGLE, '≈') };
    let mut walk = Xorshift32::new(seed);

    let mut edge = |left: char, right: char| -> String {
        let mut row = String::with_capacity(width * 3);
        row.push(left);
        for _ in 1..width - 1 {
            let roll = walk.next().unwrap_or(0);
            row.push(if style == BorderStyle::Rough && roll % 10 == 0 {
                rough
            } else {
                frame.h
            });
        }
        row.push(right);
        row
    };

    let mut lines = Vec::with_capacity(height);
    lines.push(edge(frame.tl, frame.tr));
    let interior = format!("{}{}{}", frame.v, " ".repeat(width - 2), frame.v);
    lines.extend(std::iter::repeat(interior).take(height - 2));
    lines.push(edge(frame.bl, frame.br));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_reference_values() {
        assert_eq!(step(1), 270_369);
        assert_eq!(step(42), 11_355_432);
        assert_eq!(step(0), 0);
        assert_eq!(rand_sequence(1, 3), vec![270_369, 67_634_689, 2_647_435_461]);
    }

    #[test]
    fn test_sparkline_unseeded() {
        assert_eq!(sparkline(&[1.0, 3.0, 2.0, 5.0, 4.0], false, None), "▁▅▃█▆");
        assert_eq!(sparkline(&[1.0, 3.0, 2.0, 5.0, 4.0], true, None), ".=-#=");
    }

    #[test]
    fn test_sparkline_seeded_is_reproducible_and_seed_sensitive() {
        let values = [1.0, 3.0, 2.0, 5.0, 4.0];
        let a = sparkline(&values, false, Some(42));
        assert_eq!(a, sparkline(&values, false, Some(42)));
        assert_eq!(a, "▂▅▃█▆");
        assert_eq!(sparkline(&values, false, Some(99)), "▁▅▃█▆");
        assert_eq!(sparkline(&values, true, Some(42)), "-=-#=");
    }

    #[test]
    fn test_sparkline_flat_and_empty() {
        assert_eq!(sparkline(&[], false, Some(1)), "");
        assert_eq!(sparkline(&[2.0, 2.0, 2.0], true, Some(7)), "...");
    }

    #[test]
    fn test_braid() {
        assert_eq!(braid(4, true, None), "/\\/\\");
        assert_eq!(braid(0, false, Some(3)), "");
        assert_eq!(braid(16, false, Some(9)), braid(16, false, Some(9)));
        assert_eq!(braid(16, false, Some(9)).chars().count(), 16);
    }

    #[test]
    fn test_density_field_extremes() {
        let full = density_field(5, 2, 1.0, true, 7);
        assert_eq!(full, vec!["#####", "#####"]);
        let empty = density_field(5, 2, 0.0, true, 7);
        assert_eq!(empty, vec!["     ", "     "]);
        assert!(density_field(0, 3, 0.5, true, 7).is_empty());
    }

    #[test]
    fn test_density_field_is_one_walk() {
        let field = density_field(4, 3, 0.5, true, 11);
        let states = rand_sequence(11, 12);
        let flat: String = field.concat();
        for (cell, state) in flat.chars().zip(states) {
            assert_eq!(cell == '#', u64::from(state) < 1 << 31);
        }
    }

    #[test]
    fn test_procedural_border_frame() {
        let lines = procedural_border(6, 4, BorderStyle::Clean, false, 1);
        assert_eq!(lines, vec!["┌────┐", "│    │", "│    │", "└────┘"]);
        assert!(procedural_border(2, 5, BorderStyle::Rough, true, 1).is_empty());
    }

    #[test]
    fn test_procedural_border_rough_keeps_corners() {
        let lines = procedural_border(40, 3, BorderStyle::Rough, true, 5);
        assert!(lines.iter().all(|l| l.chars().count() == 40));
        assert!(lines[0].starts_with('+') && lines[0].ends_with('+'));
        assert_eq!(lines, procedural_border(40, 3, BorderStyle::Rough, true, 5));
    }
}
