//! [`StatusLed`] – the two side status LEDs.

use pupos_types::PupError;

/// Which of the two LED groups to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedSide {
    Left,
    Right,
}

/// Named LED colors, including `Black` for off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedColor {
    Green,
    Red,
    Amber,
    Yellow,
    Black,
}

impl LedColor {
    pub fn as_str(self) -> &'static str {
        match self {
            LedColor::Green => "GREEN",
            LedColor::Red => "RED",
            LedColor::Amber => "AMBER",
            LedColor::Yellow => "YELLOW",
            LedColor::Black => "BLACK",
        }
    }
}

/// Side status LED driver.
pub trait StatusLed: Send + Sync {
    /// Set one side to a named color.
    fn set_color(&self, side: LedSide, color: LedColor) -> Result<(), PupError>;

    /// Set both sides to the same color.
    fn set_both(&self, color: LedColor) -> Result<(), PupError> {
        self.set_color(LedSide::Left, color)?;
        self.set_color(LedSide::Right, color)
    }
}
