use vcs_snapshot::{expect_tag, write_tag, Result, Serializable, StateStore};

use crate::system::Device;

pub const RAM_SIZE: usize = 128;

/// 6532 RIOT: 128 bytes of RAM, the interval timer and the two I/O ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M6532 {
    pub ram: [u8; RAM_SIZE],
    pub timer: u32,
    pub interval_shift: u32,
    pub cycles_when_timer_set: u32,
    pub interrupt_enabled: bool,
    pub interrupt_triggered: bool,
    pub ddra: u8,
    pub ddrb: u8,
    pub out_a: u8,
    pub out_b: u8,
}

impl Default for M6532 {
    fn default() -> Self {
        let mut riot = Self {
            ram: [0; RAM_SIZE],
            timer: 0,
            interval_shift: 0,
            cycles_when_timer_set: 0,
            interrupt_enabled: false,
            interrupt_triggered: false,
            ddra: 0,
            ddrb: 0,
            out_a: 0,
            out_b: 0,
        };
        riot.reset();
        riot
    }
}

impl M6532 {
    /// Arms the timer with `value` ticks of `1 << shift` cycles each.
    pub fn set_timer(&mut self, value: u8, shift: u32, now: u32) {
        self.interval_shift = shift;
        self.timer = u32::from(value) << shift;
        self.cycles_when_timer_set = now;
        self.interrupt_triggered = false;
    }
}

impl Device for M6532 {
    fn reset(&mut self) {
        self.ram = [0; RAM_SIZE];
        self.timer = 0xff << 10;
        self.interval_shift = 10;
        self.cycles_when_timer_set = 0;
        self.interrupt_enabled = false;
        self.interrupt_triggered = false;
        self.ddra = 0;
        self.ddrb = 0;
        self.out_a = 0;
        self.out_b = 0;
    }
}

impl Serializable for M6532 {
    fn name(&self) -> &'static str {
        "M6532"
    }

    fn save(&self, out: &mut StateStore) -> Result<()> {
        write_tag(out, self.name())?;
        out.write_bytes(&self.ram)?;
        out.write_u32(self.timer)?;
        out.write_u32(self.interval_shift)?;
        out.write_u32(self.cycles_when_timer_set)?;
        out.write_bool(self.interrupt_enabled)?;
        out.write_bool(self.interrupt_triggered)?;
        out.write_byte(self.ddra)?;
        out.write_byte(self.ddrb)?;
        out.write_byte(self.out_a)?;
        out.write_byte(self.out_b)
    }

    fn load(&mut self, input: &mut StateStore) -> Result<()> {
        expect_tag(input, self.name())?;
        input.read_bytes_into(&mut self.ram)?;
        self.timer = input.read_u32()?;
        self.interval_shift = input.read_u32()?;
        self.cycles_when_timer_set = input.read_u32()?;
        self.interrupt_enabled = input.read_bool()?;
        self.interrupt_triggered = input.read_bool()?;
        self.ddra = input.read_byte()?;
        self.ddrb = input.read_byte()?;
        self.out_a = input.read_byte()?;
        self.out_b = input.read_byte()?;
        Ok(())
    }
}
