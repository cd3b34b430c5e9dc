use vcs_snapshot::{Result, Serializable, StateStore};

use crate::event::{Event, EventState};

/// Resistance reported on an unconnected analog pin.
pub const MAX_RESISTANCE: u32 = 0x7fff_ffff;
pub const MIN_RESISTANCE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jack {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerKind {
    #[default]
    Joystick,
    Paddles,
    BoosterGrip,
    Driving,
    Keyboard,
}

impl ControllerKind {
    pub fn name(self) -> &'static str {
        match self {
            ControllerKind::Joystick => "Joystick",
            ControllerKind::Paddles => "Paddles",
            ControllerKind::BoosterGrip => "BoosterGrip",
            ControllerKind::Driving => "Driving",
            ControllerKind::Keyboard => "Keyboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitalPin {
    One,
    Two,
    Three,
    Four,
    Six,
}

impl DigitalPin {
    const ALL: [DigitalPin; 5] = [
        DigitalPin::One,
        DigitalPin::Two,
        DigitalPin::Three,
        DigitalPin::Four,
        DigitalPin::Six,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogPin {
    Five,
    Nine,
}

/// A controller plugged into one of the two jacks.
///
/// Only the pin levels are machine state; the kind decides how events map onto the pins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controller {
    jack: Jack,
    kind: ControllerKind,
    digital: [bool; 5],
    analog: [u32; 2],
}

impl Controller {
    pub fn new(jack: Jack, kind: ControllerKind) -> Self {
        Self {
            jack,
            kind,
            digital: [true; 5],
            analog: [MAX_RESISTANCE; 2],
        }
    }

    pub fn jack(&self) -> Jack {
        self.jack
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn read_digital(&self, pin: DigitalPin) -> bool {
        self.digital[pin.index()]
    }

    pub fn set_digital(&mut self, pin: DigitalPin, level: bool) {
        self.digital[pin.index()] = level;
    }

    pub fn read_analog(&self, pin: AnalogPin) -> u32 {
        self.analog[pin as usize]
    }

    pub fn set_analog(&mut self, pin: AnalogPin, value: u32) {
        self.analog[pin as usize] = value;
    }

    /// Applies this frame's events. Joysticks pull a pin low while the direction or fire button
    /// is held; other kinds keep their pins as set through the pin accessors.
    pub fn update(&mut self, events: &EventState) {
        if self.kind != ControllerKind::Joystick {
            return;
        }
        let [up, down, left, right, fire] = match self.jack {
            Jack::Left => [
                Event::JoystickZeroUp,
                Event::JoystickZeroDown,
                Event::JoystickZeroLeft,
                Event::JoystickZeroRight,
                Event::JoystickZeroFire,
            ],
            Jack::Right => [
                Event::JoystickOneUp,
                Event::JoystickOneDown,
                Event::JoystickOneLeft,
                Event::JoystickOneRight,
                Event::JoystickOneFire,
            ],
        };
        self.set_digital(DigitalPin::One, !events.is_active(up));
        self.set_digital(DigitalPin::Two, !events.is_active(down));
        self.set_digital(DigitalPin::Three, !events.is_active(left));
        self.set_digital(DigitalPin::Four, !events.is_active(right));
        self.set_digital(DigitalPin::Six, !events.is_active(fire));
    }
}

impl Serializable for Controller {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn save(&self, out: &mut StateStore) -> Result<()> {
        for pin in DigitalPin::ALL {
            out.write_bool(self.read_digital(pin))?;
        }
        out.write_u32(self.read_analog(AnalogPin::Five))?;
        out.write_u32(self.read_analog(AnalogPin::Nine))
    }

    fn load(&mut self, input: &mut StateStore) -> Result<()> {
        for pin in DigitalPin::ALL {
            let level = input.read_bool()?;
            self.set_digital(pin, level);
        }
        let five = input.read_u32()?;
        let nine = input.read_u32()?;
        self.set_analog(AnalogPin::Five, five);
        self.set_analog(AnalogPin::Nine, nine);
        Ok(())
    }
}
