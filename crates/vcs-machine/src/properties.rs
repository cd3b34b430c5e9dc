use crate::controller::ControllerKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    A,
    #[default]
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TvType {
    #[default]
    Color,
    BlackWhite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayFormat {
    #[default]
    Ntsc,
    Pal,
    Secam,
}

impl DisplayFormat {
    pub fn scanlines_per_frame(self) -> u32 {
        match self {
            DisplayFormat::Ntsc => 262,
            DisplayFormat::Pal | DisplayFormat::Secam => 312,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DisplayFormat::Ntsc => "NTSC",
            DisplayFormat::Pal => "PAL",
            DisplayFormat::Secam => "SECAM",
        }
    }
}

/// Per-cartridge console configuration, owned by the [`crate::Console`] and handed to the
/// components that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleProperties {
    pub cartridge_name: String,
    pub left_difficulty: Difficulty,
    pub right_difficulty: Difficulty,
    pub tv_type: TvType,
    pub display_format: DisplayFormat,
    pub left_controller: ControllerKind,
    pub right_controller: ControllerKind,
}

impl Default for ConsoleProperties {
    fn default() -> Self {
        Self {
            cartridge_name: "Untitled".to_string(),
            left_difficulty: Difficulty::B,
            right_difficulty: Difficulty::B,
            tv_type: TvType::Color,
            display_format: DisplayFormat::Ntsc,
            left_controller: ControllerKind::Joystick,
            right_controller: ControllerKind::Joystick,
        }
    }
}
