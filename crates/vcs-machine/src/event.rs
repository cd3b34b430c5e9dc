/// Input events the console and its controllers react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Event {
    ConsoleColor,
    ConsoleBlackWhite,
    ConsoleLeftDiffA,
    ConsoleLeftDiffB,
    ConsoleRightDiffA,
    ConsoleRightDiffB,
    ConsoleSelect,
    ConsoleReset,
    JoystickZeroUp,
    JoystickZeroDown,
    JoystickZeroLeft,
    JoystickZeroRight,
    JoystickZeroFire,
    JoystickOneUp,
    JoystickOneDown,
    JoystickOneLeft,
    JoystickOneRight,
    JoystickOneFire,
}

impl Event {
    pub const COUNT: usize = Event::JoystickOneFire as usize + 1;
}

/// Current value of every [`Event`]; nonzero means active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventState {
    values: [i32; Event::COUNT],
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            values: [0; Event::COUNT],
        }
    }
}

impl EventState {
    pub fn get(&self, event: Event) -> i32 {
        self.values[event as usize]
    }

    pub fn set(&mut self, event: Event, value: i32) {
        self.values[event as usize] = value;
    }

    pub fn is_active(&self, event: Event) -> bool {
        self.get(event) != 0
    }

    pub fn clear(&mut self) {
        self.values = [0; Event::COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_independent() {
        let mut events = EventState::default();
        events.set(Event::ConsoleSelect, 1);
        assert!(events.is_active(Event::ConsoleSelect));
        assert!(!events.is_active(Event::ConsoleReset));
        assert!(!events.is_active(Event::JoystickOneFire));
        events.clear();
        assert!(!events.is_active(Event::ConsoleSelect));
    }
}
