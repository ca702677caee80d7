use colored::Color;

pub const PRIMARY: Color = Color::BrightBlue;
pub const ACCENT: Color = Color::Cyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const UNIT_ACTIVE: Color = Color::Green;
pub const UNIT_INACTIVE: Color = Color::Red;
pub const DRY_RUN: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;
pub const STDERR: Color = Color::BrightRed;
pub const WATCHERS_DEGRADED: Color = Color::Yellow;
