use vcs_snapshot::{expect_tag, write_tag, Result, Serializable, StateError, StateStore};

use crate::error::MachineError;
use crate::system::Device;

const BANK_SIZE: usize = 4096;
pub const SUPERCHIP_RAM_SIZE: usize = 128;

/// Bank-switching scheme of a cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartKind {
    K2,
    K4,
    F8,
    F8SC,
    F6,
    F4,
}

impl CartKind {
    /// Guesses the scheme from the ROM image alone.
    pub fn detect(rom: &[u8]) -> Option<Self> {
        match rom.len() {
            2048 => Some(CartKind::K2),
            4096 => Some(CartKind::K4),
            8192 if has_superchip_ram(rom) => Some(CartKind::F8SC),
            8192 => Some(CartKind::F8),
            16384 => Some(CartKind::F6),
            32768 => Some(CartKind::F4),
            _ => None,
        }
    }

    /// Cartridge name; this is the identity tag written into snapshots.
    pub fn name(self) -> &'static str {
        match self {
            CartKind::K2 => "Cartridge2K",
            CartKind::K4 => "Cartridge4K",
            CartKind::F8 => "CartridgeF8",
            CartKind::F8SC => "CartridgeF8SC",
            CartKind::F6 => "CartridgeF6",
            CartKind::F4 => "CartridgeF4",
        }
    }

    pub fn bank_count(self) -> u16 {
        match self {
            CartKind::K2 | CartKind::K4 => 1,
            CartKind::F8 | CartKind::F8SC => 2,
            CartKind::F6 => 4,
            CartKind::F4 => 8,
        }
    }

    fn start_bank(self) -> u16 {
        match self {
            CartKind::F8 | CartKind::F8SC => 1,
            _ => 0,
        }
    }

    fn ram_size(self) -> usize {
        match self {
            CartKind::F8SC => SUPERCHIP_RAM_SIZE,
            _ => 0,
        }
    }

    fn is_banked(self) -> bool {
        self.bank_count() > 1
    }
}

/// A SuperChip image has its RAM window (the first 256 bytes of each bank) filled with one value.
fn has_superchip_ram(rom: &[u8]) -> bool {
    rom.chunks(BANK_SIZE).all(|bank| {
        let window = &bank[..2 * SUPERCHIP_RAM_SIZE];
        window.iter().all(|&b| b == window[0])
    })
}

/// Cartridge ROM plus its switchable state (current bank and extra RAM).
///
/// ROM contents are never written into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    kind: CartKind,
    rom: Vec<u8>,
    bank: u16,
    ram: Vec<u8>,
}

impl Cartridge {
    pub fn from_rom(rom: Vec<u8>) -> std::result::Result<Self, MachineError> {
        let kind = CartKind::detect(&rom).ok_or(MachineError::UnsupportedRomSize(rom.len()))?;
        tracing::debug!("detected {} ({} bytes)", kind.name(), rom.len());
        Ok(Self::with_kind(kind, rom))
    }

    fn with_kind(kind: CartKind, rom: Vec<u8>) -> Self {
        let mut cart = Self {
            kind,
            rom,
            bank: 0,
            ram: vec![0; kind.ram_size()],
        };
        cart.reset();
        cart
    }

    pub fn kind(&self) -> CartKind {
        self.kind
    }

    pub fn bank(&self) -> u16 {
        self.bank
    }

    pub fn set_bank(&mut self, bank: u16) -> std::result::Result<(), MachineError> {
        let banks = self.kind.bank_count();
        if bank >= banks {
            return Err(MachineError::BankOutOfRange {
                cart: self.kind.name(),
                bank,
                banks,
            });
        }
        self.bank = bank;
        Ok(())
    }

    /// Reads the cartridge window; `addr` is masked to 4K. A 2K image is mirrored.
    pub fn peek(&self, addr: u16) -> u8 {
        let offset = usize::from(addr & 0x0fff);
        let in_ram_window = (SUPERCHIP_RAM_SIZE..2 * SUPERCHIP_RAM_SIZE).contains(&offset);
        if !self.ram.is_empty() && in_ram_window {
            return self.ram[offset - SUPERCHIP_RAM_SIZE];
        }
        match self.kind {
            CartKind::K2 => self.rom[offset & 0x07ff],
            _ => self.rom[usize::from(self.bank) * BANK_SIZE + offset],
        }
    }

    /// Writes cartridge RAM through its write port. Returns false if nothing is mapped there.
    pub fn poke(&mut self, addr: u16, value: u8) -> bool {
        let offset = usize::from(addr & 0x0fff);
        if offset < self.ram.len() {
            self.ram[offset] = value;
            true
        } else {
            false
        }
    }

    pub fn reset_vector(&self) -> u16 {
        u16::from_le_bytes([self.peek(0x0ffc), self.peek(0x0ffd)])
    }
}

impl Device for Cartridge {
    fn reset(&mut self) {
        self.bank = self.kind.start_bank();
        self.ram.fill(0);
    }
}

impl Serializable for Cartridge {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn save(&self, out: &mut StateStore) -> Result<()> {
        write_tag(out, self.name())?;
        if self.kind.is_banked() {
            out.write_u16(self.bank)?;
        }
        if !self.ram.is_empty() {
            out.write_bytes(&self.ram)?;
        }
        Ok(())
    }

    fn load(&mut self, input: &mut StateStore) -> Result<()> {
        expect_tag(input, self.name())?;
        if self.kind.is_banked() {
            let bank = input.read_u16()?;
            if bank >= self.kind.bank_count() {
                return Err(StateError::Corrupt("cartridge bank out of range"));
            }
            self.bank = bank;
        }
        if !self.ram.is_empty() {
            input.read_bytes_into(&mut self.ram)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banked_rom(banks: usize) -> Vec<u8> {
        let mut rom = vec![0u8; banks * BANK_SIZE];
        for (i, bank) in rom.chunks_mut(BANK_SIZE).enumerate() {
            bank.iter_mut().enumerate().for_each(|(j, b)| *b = (i * 31 + j) as u8);
        }
        rom
    }

    #[test]
    fn detects_kind_from_size() {
        assert_eq!(CartKind::detect(&[0; 2048]), Some(CartKind::K2));
        assert_eq!(CartKind::detect(&[0; 4096]), Some(CartKind::K4));
        assert_eq!(CartKind::detect(&banked_rom(2)), Some(CartKind::F8));
        assert_eq!(CartKind::detect(&banked_rom(4)), Some(CartKind::F6));
        assert_eq!(CartKind::detect(&banked_rom(8)), Some(CartKind::F4));
        assert_eq!(CartKind::detect(&[0; 3000]), None);
    }

    #[test]
    fn detects_superchip_from_ram_window() {
        let mut rom = banked_rom(2);
        for bank in rom.chunks_mut(BANK_SIZE) {
            bank[..256].fill(0xff);
        }
        assert_eq!(CartKind::detect(&rom), Some(CartKind::F8SC));
    }

    #[test]
    fn unsupported_size_is_an_error() {
        let err = Cartridge::from_rom(vec![0; 100]).unwrap_err();
        assert!(matches!(err, MachineError::UnsupportedRomSize(100)));
    }

    #[test]
    fn f8_starts_in_last_bank_and_peeks_through_it() {
        let mut cart = Cartridge::from_rom(banked_rom(2)).unwrap();
        assert_eq!(cart.bank(), 1);
        assert_eq!(cart.peek(0x1000), 31);
        cart.set_bank(0).unwrap();
        assert_eq!(cart.peek(0x1000), 0);
        assert!(cart.set_bank(2).is_err());
    }

    #[test]
    fn two_k_is_mirrored() {
        let mut rom = vec![0u8; 2048];
        rom[0x7fc] = 0x00;
        rom[0x7fd] = 0xf8;
        let cart = Cartridge::from_rom(rom).unwrap();
        assert_eq!(cart.reset_vector(), 0xf800);
    }

    #[test]
    fn superchip_ram_is_saved_and_bank_checked_on_load() {
        let mut rom = banked_rom(2);
        for bank in rom.chunks_mut(BANK_SIZE) {
            bank[..256].fill(0);
        }
        let mut cart = Cartridge::from_rom(rom.clone()).unwrap();
        assert!(cart.poke(0x1005, 0x42));
        assert_eq!(cart.peek(0x1085), 0x42);
        cart.set_bank(0).unwrap();

        let mut store = StateStore::open_memory();
        cart.save(&mut store).unwrap();
        store.reset();
        let mut restored = Cartridge::from_rom(rom.clone()).unwrap();
        restored.load(&mut store).unwrap();
        assert_eq!(restored, cart);

        let mut bad = StateStore::open_memory();
        write_tag(&mut bad, "CartridgeF8SC").unwrap();
        bad.write_u16(7).unwrap();
        bad.reset();
        let mut target = Cartridge::from_rom(rom).unwrap();
        assert!(matches!(target.load(&mut bad), Err(StateError::Corrupt(_))));
    }
}
