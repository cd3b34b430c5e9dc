use vcs_snapshot::{expect_tag, save_all, write_tag, Result, Serializable, StateStore};

use crate::cart::Cartridge;
use crate::cpu::M6502;
use crate::riot::M6532;
use crate::tia::Tia;

/// A chip attached to the system bus.
pub trait Device: Serializable {
    /// Returns the device to its power-on state.
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSlot {
    Cpu,
    Riot,
    Tia,
    Cartridge,
}

/// Attach order of the bus devices. Snapshots store device regions in exactly this order.
pub const DEVICE_ORDER: [DeviceSlot; 4] = [
    DeviceSlot::Cpu,
    DeviceSlot::Riot,
    DeviceSlot::Tia,
    DeviceSlot::Cartridge,
];

/// CPU cycles per scanline.
pub const CYCLES_PER_SCANLINE: u32 = 76;

/// The system bus and the devices attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct System {
    cycles: u32,
    data_bus_state: u8,
    cpu: M6502,
    riot: M6532,
    tia: Tia,
    cart: Cartridge,
}

impl System {
    pub fn new(tia: Tia, cart: Cartridge) -> Self {
        let mut system = Self {
            cycles: 0,
            data_bus_state: 0,
            cpu: M6502::default(),
            riot: M6532::default(),
            tia,
            cart,
        };
        system.reset();
        system
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn data_bus_state(&self) -> u8 {
        self.data_bus_state
    }

    pub fn set_data_bus_state(&mut self, value: u8) {
        self.data_bus_state = value;
    }

    pub fn cpu(&self) -> &M6502 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut M6502 {
        &mut self.cpu
    }

    pub fn riot(&self) -> &M6532 {
        &self.riot
    }

    pub fn riot_mut(&mut self) -> &mut M6532 {
        &mut self.riot
    }

    pub fn tia(&self) -> &Tia {
        &self.tia
    }

    pub fn tia_mut(&mut self) -> &mut Tia {
        &mut self.tia
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cart
    }

    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cart
    }

    pub fn part(&self, slot: DeviceSlot) -> &dyn Serializable {
        match slot {
            DeviceSlot::Cpu => &self.cpu,
            DeviceSlot::Riot => &self.riot,
            DeviceSlot::Tia => &self.tia,
            DeviceSlot::Cartridge => &self.cart,
        }
    }

    pub fn device_mut(&mut self, slot: DeviceSlot) -> &mut dyn Device {
        match slot {
            DeviceSlot::Cpu => &mut self.cpu,
            DeviceSlot::Riot => &mut self.riot,
            DeviceSlot::Tia => &mut self.tia,
            DeviceSlot::Cartridge => &mut self.cart,
        }
    }

    /// Resets every device, then loads the program counter from the cartridge reset vector.
    pub fn reset(&mut self) {
        self.cycles = 0;
        self.data_bus_state = 0;
        for slot in DEVICE_ORDER {
            self.device_mut(slot).reset();
        }
        self.cpu.pc = self.cart.reset_vector();
    }

    /// Advances one TIA frame and accounts its CPU cycles.
    pub fn run_frame(&mut self) {
        let cycles = self.tia.update();
        self.cycles = self.cycles.wrapping_add(cycles);
    }
}

impl Serializable for System {
    fn name(&self) -> &'static str {
        "System"
    }

    fn save(&self, out: &mut StateStore) -> Result<()> {
        write_tag(out, self.name())?;
        out.write_u32(self.cycles)?;
        out.write_byte(self.data_bus_state)?;

        let devices: Vec<&dyn Serializable> = DEVICE_ORDER
            .iter()
            .map(|&slot| self.part(slot))
            .collect();
        save_all(out, &devices)
    }

    fn load(&mut self, input: &mut StateStore) -> Result<()> {
        expect_tag(input, self.name())?;
        self.cycles = input.read_u32()?;
        self.data_bus_state = input.read_byte()?;

        for slot in DEVICE_ORDER {
            let device = self.device_mut(slot);
            let name = device.name();
            device.load(input).map_err(|e| e.in_component(name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::DisplayFormat;

    fn system() -> System {
        let mut rom = vec![0u8; 4096];
        rom[0xffc] = 0x00;
        rom[0xffd] = 0xf0;
        System::new(
            Tia::new(DisplayFormat::Ntsc),
            Cartridge::from_rom(rom).unwrap(),
        )
    }

    #[test]
    fn reset_loads_pc_from_cartridge() {
        let system = system();
        assert_eq!(system.cpu().pc, 0xf000);
        assert_eq!(system.cycles(), 0);
    }

    #[test]
    fn frames_accumulate_cycles() {
        let mut system = system();
        system.run_frame();
        system.run_frame();
        assert_eq!(system.cycles(), 2 * 262 * CYCLES_PER_SCANLINE);
        assert_eq!(system.tia().frame_number, 2);
    }

    #[test]
    fn devices_are_written_in_attach_order() {
        let system = system();
        let mut store = StateStore::open_memory();
        system.save(&mut store).unwrap();
        store.reset();

        assert_eq!(store.read_string().unwrap(), "System");
        store.read_u32().unwrap();
        store.read_byte().unwrap();
        assert_eq!(store.read_string().unwrap(), "M6502");
    }

    #[test]
    fn device_regions_must_match_their_tags() {
        let mut store = StateStore::open_memory();
        write_tag(&mut store, "System").unwrap();
        store.write_u32(0).unwrap();
        store.write_byte(0).unwrap();
        write_tag(&mut store, "TIA").unwrap();
        store.reset();

        let err = system().load(&mut store).unwrap_err();
        assert_eq!(err.component_path(), vec!["M6502"]);
    }
}
