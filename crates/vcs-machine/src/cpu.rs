use vcs_snapshot::{expect_tag, write_tag, Result, Serializable, StateStore};

use crate::system::Device;

const N: u8 = 0x80;
const V: u8 = 0x40;
const B: u8 = 0x10;
const D: u8 = 0x08;
const I: u8 = 0x04;
const Z: u8 = 0x02;
const C: u8 = 0x01;

/// 6507 register file. Flags are kept unpacked; `not_z` holds the inverse of Z.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M6502 {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub ir: u8,
    pub pc: u16,
    pub n: bool,
    pub v: bool,
    pub b: bool,
    pub d: bool,
    pub i: bool,
    pub not_z: bool,
    pub c: bool,
    pub execution_status: u8,
    pub last_peek_address: u16,
    pub last_poke_address: u16,
}

impl Default for M6502 {
    fn default() -> Self {
        let mut cpu = Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0,
            ir: 0,
            pc: 0,
            n: false,
            v: false,
            b: false,
            d: false,
            i: false,
            not_z: false,
            c: false,
            execution_status: 0,
            last_peek_address: 0,
            last_poke_address: 0,
        };
        cpu.reset();
        cpu
    }
}

impl M6502 {
    pub fn ps(&self) -> u8 {
        let mut ps = 0x20;
        for (set, bit) in [
            (self.n, N),
            (self.v, V),
            (self.b, B),
            (self.d, D),
            (self.i, I),
            (!self.not_z, Z),
            (self.c, C),
        ] {
            if set {
                ps |= bit;
            }
        }
        ps
    }

    pub fn set_ps(&mut self, ps: u8) {
        self.n = ps & N != 0;
        self.v = ps & V != 0;
        self.b = ps & B != 0;
        self.d = ps & D != 0;
        self.i = ps & I != 0;
        self.not_z = ps & Z == 0;
        self.c = ps & C != 0;
    }
}

impl Device for M6502 {
    /// Power-on registers. The program counter is filled in from the reset vector by the bus.
    fn reset(&mut self) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xff;
        self.ir = 0;
        self.pc = 0;
        self.set_ps(0x20 | B | I | Z);
        self.execution_status = 0;
        self.last_peek_address = 0;
        self.last_poke_address = 0;
    }
}

impl Serializable for M6502 {
    fn name(&self) -> &'static str {
        "M6502"
    }

    fn save(&self, out: &mut StateStore) -> Result<()> {
        write_tag(out, self.name())?;
        out.write_byte(self.a)?;
        out.write_byte(self.x)?;
        out.write_byte(self.y)?;
        out.write_byte(self.sp)?;
        out.write_byte(self.ir)?;
        out.write_u16(self.pc)?;
        out.write_bool(self.n)?;
        out.write_bool(self.v)?;
        out.write_bool(self.b)?;
        out.write_bool(self.d)?;
        out.write_bool(self.i)?;
        out.write_bool(self.not_z)?;
        out.write_bool(self.c)?;
        out.write_byte(self.execution_status)?;
        out.write_u16(self.last_peek_address)?;
        out.write_u16(self.last_poke_address)
    }

    fn load(&mut self, input: &mut StateStore) -> Result<()> {
        expect_tag(input, self.name())?;
        self.a = input.read_byte()?;
        self.x = input.read_byte()?;
        self.y = input.read_byte()?;
        self.sp = input.read_byte()?;
        self.ir = input.read_byte()?;
        self.pc = input.read_u16()?;
        self.n = input.read_bool()?;
        self.v = input.read_bool()?;
        self.b = input.read_bool()?;
        self.d = input.read_bool()?;
        self.i = input.read_bool()?;
        self.not_z = input.read_bool()?;
        self.c = input.read_bool()?;
        self.execution_status = input.read_byte()?;
        self.last_peek_address = input.read_u16()?;
        self.last_poke_address = input.read_u16()?;
        Ok(())
    }
}
