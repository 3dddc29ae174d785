//! Direction-aware utility class helpers.
//!
//! Arabic renders right-to-left; these helpers mirror horizontal layout
//! classes so the same markup works in both directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Ar)
    }

    /// Value for the document `dir` attribute.
    pub fn dir(self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "ar" | "arabic" => Ok(Self::Ar),
            other => Err(Error::ConfigValidation {
                message: format!("unsupported language: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    RowReverse,
    Col,
    ColReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Start,
    End,
    Center,
    Between,
    Around,
    Evenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Border radius side or corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    L,
    R,
    T,
    B,
    Tl,
    Tr,
    Bl,
    Br,
}

impl Corner {
    fn code(self) -> &'static str {
        match self {
            Self::L => "l",
            Self::R => "r",
            Self::T => "t",
            Self::B => "b",
            Self::Tl => "tl",
            Self::Tr => "tr",
            Self::Bl => "bl",
            Self::Br => "br",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Class helper bound to a layout direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rtl {
    is_rtl: bool,
}

impl Rtl {
    pub fn new(language: Language) -> Self {
        Self {
            is_rtl: language.is_rtl(),
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.is_rtl
    }

    /// Margin classes, swapped under RTL.
    pub fn margin(&self, left: &str, right: &str) -> String {
        self.pair(left, right)
    }

    pub fn padding(&self, left: &str, right: &str) -> String {
        self.pair(left, right)
    }

    fn pair(&self, left: &str, right: &str) -> String {
        if self.is_rtl {
            format!("{right} {left}")
        } else {
            format!("{left} {right}")
        }
    }

    pub fn text_align(&self, align: TextAlign) -> &'static str {
        match (align, self.is_rtl) {
            (TextAlign::Center, _) => "text-center",
            (TextAlign::Left, false) | (TextAlign::Right, true) => "text-left",
            (TextAlign::Right, false) | (TextAlign::Left, true) => "text-right",
        }
    }

    /// Only row directions flip; columns are direction-agnostic.
    pub fn flex_direction(&self, direction: FlexDirection) -> &'static str {
        match (direction, self.is_rtl) {
            (FlexDirection::Col, _) => "flex-col",
            (FlexDirection::ColReverse, _) => "flex-col-reverse",
            (FlexDirection::Row, false) | (FlexDirection::RowReverse, true) => "flex-row",
            (FlexDirection::RowReverse, false) | (FlexDirection::Row, true) => "flex-row-reverse",
        }
    }

    pub fn justify_content(&self, justify: Justify) -> &'static str {
        match (justify, self.is_rtl) {
            (Justify::Center, _) => "justify-center",
            (Justify::Between, _) => "justify-between",
            (Justify::Around, _) => "justify-around",
            (Justify::Evenly, _) => "justify-evenly",
            (Justify::Start, false) | (Justify::End, true) => "justify-start",
            (Justify::End, false) | (Justify::Start, true) => "justify-end",
        }
    }

    /// Inset class such as `left-0`, mirrored under RTL.
    pub fn position(&self, side: Side, value: &str) -> String {
        let side = if self.is_rtl { side.flipped() } else { side };
        format!("{}-{}", side.name(), value)
    }

    pub fn border_radius(&self, corner: Corner, size: &str) -> String {
        let corner = match (corner, self.is_rtl) {
            (Corner::L, true) => Corner::R,
            (Corner::R, true) => Corner::L,
            (other, _) => other,
        };
        format!("rounded-{}-{}", corner.code(), size)
    }

    // Horizontal spacing is mirrored by the stylesheet itself.
    pub fn space(&self, axis: Axis, size: &str) -> String {
        match axis {
            Axis::X => format!("space-x-{size}"),
            Axis::Y => format!("space-y-{size}"),
        }
    }

    pub fn gap(&self, size: &str) -> String {
        format!("gap-{size}")
    }
}

impl From<Language> for Rtl {
    fn from(language: Language) -> Self {
        Self::new(language)
    }
}
