use vcs_snapshot::{save_all, Serializable, StateManager, StateRoot, StateStore};

use crate::cart::Cartridge;
use crate::controller::{Controller, Jack};
use crate::error::Result;
use crate::event::EventState;
use crate::properties::ConsoleProperties;
use crate::switches::Switches;
use crate::system::System;
use crate::tia::Tia;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsolePart {
    System,
    LeftController,
    RightController,
    Switches,
}

/// Snapshot body order below the console.
pub const CONSOLE_ORDER: [ConsolePart; 4] = [
    ConsolePart::System,
    ConsolePart::LeftController,
    ConsolePart::RightController,
    ConsolePart::Switches,
];

/// The whole machine: system bus, both controller jacks and the front panel.
///
/// A `Console` is the root handed to [`StateManager`]; its identity is the cartridge name, so a
/// snapshot only loads into a console running the same kind of cartridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Console {
    properties: ConsoleProperties,
    system: System,
    controllers: [Controller; 2],
    switches: Switches,
}

impl Console {
    pub fn new(rom: Vec<u8>, properties: ConsoleProperties) -> Result<Self> {
        let cart = Cartridge::from_rom(rom)?;
        let system = System::new(Tia::new(properties.display_format), cart);
        let controllers = [
            Controller::new(Jack::Left, properties.left_controller),
            Controller::new(Jack::Right, properties.right_controller),
        ];
        let switches = Switches::new(&properties);
        tracing::info!(
            "console created for {:?} ({}, {})",
            properties.cartridge_name,
            system.cartridge().kind().name(),
            properties.display_format.name()
        );
        Ok(Self {
            properties,
            system,
            controllers,
            switches,
        })
    }

    pub fn properties(&self) -> &ConsoleProperties {
        &self.properties
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    pub fn cartridge(&self) -> &Cartridge {
        self.system.cartridge()
    }

    pub fn controller(&self, jack: Jack) -> &Controller {
        &self.controllers[jack_index(jack)]
    }

    pub fn controller_mut(&mut self, jack: Jack) -> &mut Controller {
        &mut self.controllers[jack_index(jack)]
    }

    pub fn switches(&self) -> &Switches {
        &self.switches
    }

    /// Power-cycles every component.
    pub fn reset(&mut self) {
        self.system.reset();
        self.controllers = [
            Controller::new(Jack::Left, self.properties.left_controller),
            Controller::new(Jack::Right, self.properties.right_controller),
        ];
        self.switches = Switches::new(&self.properties);
        tracing::debug!("console reset");
    }

    /// Applies this frame's input events to the switches and both controllers.
    pub fn update(&mut self, events: &EventState) {
        self.switches.update(events);
        for controller in self.controllers.iter_mut() {
            controller.update(events);
        }
    }

    pub fn run_frames(&mut self, frames: u32) {
        for _ in 0..frames {
            self.system.run_frame();
        }
    }

    /// Runs `frames` frames and returns the scanline count of the last one, then rewinds the
    /// console to where it was.
    pub fn probe_frames(
        &mut self,
        manager: &StateManager,
        frames: u32,
    ) -> vcs_snapshot::Result<u32> {
        manager.probe(self, |console| {
            console.run_frames(frames);
            console.system.tia().scanlines_last_frame
        })
    }

    /// Classifies the cartridge's output as PAL after `frames` frames, without side effects.
    pub fn detect_pal(
        &mut self,
        manager: &StateManager,
        frames: u32,
    ) -> vcs_snapshot::Result<bool> {
        manager.probe(self, |console| {
            console.run_frames(frames);
            console.system.tia().is_pal()
        })
    }

    fn part(&self, part: ConsolePart) -> &dyn Serializable {
        match part {
            ConsolePart::System => &self.system,
            ConsolePart::LeftController => &self.controllers[0],
            ConsolePart::RightController => &self.controllers[1],
            ConsolePart::Switches => &self.switches,
        }
    }

    fn part_mut(&mut self, part: ConsolePart) -> &mut dyn Serializable {
        match part {
            ConsolePart::System => &mut self.system,
            ConsolePart::LeftController => &mut self.controllers[0],
            ConsolePart::RightController => &mut self.controllers[1],
            ConsolePart::Switches => &mut self.switches,
        }
    }
}

fn jack_index(jack: Jack) -> usize {
    match jack {
        Jack::Left => 0,
        Jack::Right => 1,
    }
}

impl Serializable for Console {
    fn name(&self) -> &'static str {
        "Console"
    }

    fn save(&self, out: &mut StateStore) -> vcs_snapshot::Result<()> {
        let parts: Vec<&dyn Serializable> =
            CONSOLE_ORDER.iter().map(|&part| self.part(part)).collect();
        save_all(out, &parts)
    }

    fn load(&mut self, input: &mut StateStore) -> vcs_snapshot::Result<()> {
        for part in CONSOLE_ORDER {
            let child = self.part_mut(part);
            let name = child.name();
            child.load(input).map_err(|e| e.in_component(name))?;
        }
        Ok(())
    }
}

impl StateRoot for Console {
    fn identity(&self) -> String {
        self.cartridge().kind().name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::properties::DisplayFormat;
    use vcs_snapshot::StateConfig;

    fn console(format: DisplayFormat) -> Console {
        let properties = ConsoleProperties {
            display_format: format,
            ..ConsoleProperties::default()
        };
        Console::new(vec![0xea; 4096], properties).unwrap()
    }

    #[test]
    fn identity_is_cartridge_name() {
        assert_eq!(console(DisplayFormat::Ntsc).identity(), "Cartridge4K");
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut console = console(DisplayFormat::Ntsc);
        let pristine = console.clone();

        let mut events = EventState::default();
        events.set(Event::ConsoleReset, 1);
        events.set(Event::JoystickZeroFire, 1);
        console.update(&events);
        console.run_frames(3);
        console.system_mut().riot_mut().ram[0] = 9;
        assert_ne!(console, pristine);

        console.reset();
        assert_eq!(console, pristine);
    }

    #[test]
    fn probe_frames_reports_without_side_effects() {
        let manager = StateManager::new(&StateConfig::default());

        let mut ntsc = console(DisplayFormat::Ntsc);
        ntsc.run_frames(1);
        let before = ntsc.clone();
        assert_eq!(ntsc.probe_frames(&manager, 5).unwrap(), 262);
        assert_eq!(ntsc, before);

        let mut pal = console(DisplayFormat::Pal);
        assert_eq!(pal.probe_frames(&manager, 5).unwrap(), 312);
        assert_eq!(pal.system().tia().frame_number, 0);
    }
}
