use vcs_snapshot::{Result, Serializable, StateStore};

use crate::event::{Event, EventState};
use crate::properties::{ConsoleProperties, Difficulty, TvType};

const RIGHT_DIFFICULTY: u8 = 0x80;
const LEFT_DIFFICULTY: u8 = 0x40;
const COLOR: u8 = 0x08;
const SELECT: u8 = 0x02;
const RESET: u8 = 0x01;

/// Front-panel switches as seen on RIOT port B. A set bit is A difficulty / color TV, and a
/// cleared select or reset bit means that button is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switches {
    bits: u8,
}

impl Switches {
    pub fn new(properties: &ConsoleProperties) -> Self {
        let mut bits = 0xff;
        if properties.right_difficulty == Difficulty::B {
            bits &= !RIGHT_DIFFICULTY;
        }
        if properties.left_difficulty == Difficulty::B {
            bits &= !LEFT_DIFFICULTY;
        }
        if properties.tv_type != TvType::Color {
            bits &= !COLOR;
        }
        Self { bits }
    }

    pub fn read(&self) -> u8 {
        self.bits
    }

    pub fn update(&mut self, events: &EventState) {
        if events.is_active(Event::ConsoleColor) {
            self.bits |= COLOR;
        } else if events.is_active(Event::ConsoleBlackWhite) {
            self.bits &= !COLOR;
        }

        if events.is_active(Event::ConsoleRightDiffA) {
            self.bits |= RIGHT_DIFFICULTY;
        } else if events.is_active(Event::ConsoleRightDiffB) {
            self.bits &= !RIGHT_DIFFICULTY;
        }

        if events.is_active(Event::ConsoleLeftDiffA) {
            self.bits |= LEFT_DIFFICULTY;
        } else if events.is_active(Event::ConsoleLeftDiffB) {
            self.bits &= !LEFT_DIFFICULTY;
        }

        if events.is_active(Event::ConsoleSelect) {
            self.bits &= !SELECT;
        } else {
            self.bits |= SELECT;
        }

        if events.is_active(Event::ConsoleReset) {
            self.bits &= !RESET;
        } else {
            self.bits |= RESET;
        }
    }
}

impl Serializable for Switches {
    fn name(&self) -> &'static str {
        "Switches"
    }

    fn save(&self, out: &mut StateStore) -> Result<()> {
        out.write_byte(self.bits)
    }

    fn load(&mut self, input: &mut StateStore) -> Result<()> {
        self.bits = input.read_byte()?;
        Ok(())
    }
}
