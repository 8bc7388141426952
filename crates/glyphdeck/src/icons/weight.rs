//! Named font weights offered by variable icon fonts.

use std::fmt;
use std::str::FromStr;

/// A named font weight, ordered from thinnest to boldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    #[default]
    Regular,
    Medium,
    SemiBold,
    Bold,
}

impl FontWeight {
    /// Every weight, thinnest first.
    pub const ALL: [FontWeight; 7] = [
        FontWeight::Thin,
        FontWeight::ExtraLight,
        FontWeight::Light,
        FontWeight::Regular,
        FontWeight::Medium,
        FontWeight::SemiBold,
        FontWeight::Bold,
    ];

    /// The name used in state files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            FontWeight::Thin => "Thin",
            FontWeight::ExtraLight => "ExtraLight",
            FontWeight::Light => "Light",
            FontWeight::Regular => "Regular",
            FontWeight::Medium => "Medium",
            FontWeight::SemiBold => "SemiBold",
            FontWeight::Bold => "Bold",
        }
    }

    /// CSS numeric weight (100..=700).
    pub fn css_value(self) -> u16 {
        (self.index() as u16 + 1) * 100
    }

    /// Looks a weight up by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// 1-based position of `name` in [`ALL`](Self::ALL).
    ///
    /// Unknown names map to the position of the default weight.
    pub fn position_for_name(name: &str) -> usize {
        Self::from_name(name).unwrap_or_default().index() + 1
    }

    /// Name at the 1-based `position`, clamped into range.
    pub fn name_for_position(position: i64) -> &'static str {
        let max = Self::ALL.len() as i64;
        let index = position.clamp(1, max) - 1;
        Self::ALL[index as usize].name()
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown weight name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown font weight '{0}'")]
pub struct UnknownWeight(pub String);

impl FromStr for FontWeight {
    type Err = UnknownWeight;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownWeight(s.to_string()))
    }
}

/// Picks the weight to request from a font offering `available` weights.
///
/// Returns `preferred` if it is available (or if nothing is), otherwise the
/// nearest available weight; ties go to the bolder one.
pub fn resolve_weight(preferred: FontWeight, available: &[FontWeight]) -> FontWeight {
    if available.is_empty() || available.contains(&preferred) {
        return preferred;
    }

    let target = preferred.css_value() as i32;
    available
        .iter()
        .copied()
        .min_by_key(|w| {
            let distance = (w.css_value() as i32 - target).abs();
            // Among equal distances, the bolder weight sorts first
            (distance, std::cmp::Reverse(*w))
        })
        .unwrap_or(preferred)
}
