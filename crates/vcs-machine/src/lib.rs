//! The VCS component tree whose state the snapshot layer captures.
//!
//! [`Console`] is the snapshot root. It owns the [`System`] bus (CPU, RIOT, TIA and cartridge),
//! the two controller jacks and the front-panel switches, and serializes them in a fixed order.

mod cart;
mod console;
mod controller;
mod cpu;
mod error;
mod event;
mod properties;
mod riot;
mod switches;
mod system;
mod tia;

pub use crate::cart::{CartKind, Cartridge, SUPERCHIP_RAM_SIZE};
pub use crate::console::{Console, ConsolePart, CONSOLE_ORDER};
pub use crate::controller::{
    AnalogPin, Controller, ControllerKind, DigitalPin, Jack, MAX_RESISTANCE, MIN_RESISTANCE,
};
pub use crate::cpu::M6502;
pub use crate::error::{MachineError, Result};
pub use crate::event::{Event, EventState};
pub use crate::properties::{ConsoleProperties, Difficulty, DisplayFormat, TvType};
pub use crate::riot::{M6532, RAM_SIZE};
pub use crate::switches::Switches;
pub use crate::system::{Device, DeviceSlot, System, CYCLES_PER_SCANLINE, DEVICE_ORDER};
pub use crate::tia::{Object, Tia, CLOCKS_PER_SCANLINE};
