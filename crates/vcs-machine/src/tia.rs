use vcs_snapshot::{expect_tag, write_tag, Result, Serializable, StateStore};

use crate::properties::DisplayFormat;
use crate::system::Device;

/// Color clocks per scanline.
pub const CLOCKS_PER_SCANLINE: u32 = 228;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Object {
    P0,
    P1,
    M0,
    M1,
    Ball,
}

/// Frame bookkeeping and the object registers of the TIA.
///
/// The display format is configuration and is not part of the saved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tia {
    format: DisplayFormat,
    pub clock_when_frame_started: u32,
    pub clock_start_display: u32,
    pub clock_stop_display: u32,
    pub clock_at_last_update: u32,
    pub frame_number: u32,
    pub scanlines_last_frame: u32,
    pub vsync_enabled: bool,
    pub vblank_enabled: bool,
    /// COLUP0, COLUP1, COLUPF, COLUBK
    pub colors: [u8; 4],
    pub playfield: u32,
    pub ctrlpf: u8,
    pub positions: [u16; 5],
    pub enabled: [bool; 3],
    pub collision: u16,
    pub dump_enabled: bool,
    pub dump_disabled_cycle: u32,
}

impl Tia {
    pub fn new(format: DisplayFormat) -> Self {
        let mut tia = Self {
            format,
            clock_when_frame_started: 0,
            clock_start_display: 0,
            clock_stop_display: 0,
            clock_at_last_update: 0,
            frame_number: 0,
            scanlines_last_frame: 0,
            vsync_enabled: false,
            vblank_enabled: false,
            colors: [0; 4],
            playfield: 0,
            ctrlpf: 0,
            positions: [0; 5],
            enabled: [false; 3],
            collision: 0,
            dump_enabled: false,
            dump_disabled_cycle: 0,
        };
        tia.reset();
        tia
    }

    pub fn format(&self) -> DisplayFormat {
        self.format
    }

    pub fn position(&self, object: Object) -> u16 {
        self.positions[object as usize]
    }

    pub fn set_position(&mut self, object: Object, pos: u16) {
        self.positions[object as usize] = pos % CLOCKS_PER_SCANLINE as u16;
    }

    /// Closes the current frame after `scanlines` lines and starts the next one.
    /// Returns the CPU cycles the frame took.
    pub fn end_frame(&mut self, scanlines: u32) -> u32 {
        let clocks = scanlines * CLOCKS_PER_SCANLINE;
        self.clock_when_frame_started = self.clock_when_frame_started.wrapping_add(clocks);
        self.clock_start_display = self.clock_when_frame_started;
        self.clock_stop_display = self.clock_when_frame_started.wrapping_add(clocks);
        self.clock_at_last_update = self.clock_when_frame_started;
        self.frame_number = self.frame_number.wrapping_add(1);
        self.scanlines_last_frame = scanlines;
        self.vsync_enabled = false;
        clocks / 3
    }

    /// Runs one frame of the configured format.
    pub fn update(&mut self) -> u32 {
        self.end_frame(self.format.scanlines_per_frame())
    }

    pub fn is_pal(&self) -> bool {
        self.scanlines_last_frame > 285
    }
}

impl Device for Tia {
    fn reset(&mut self) {
        let lines = self.format.scanlines_per_frame();
        self.clock_when_frame_started = 0;
        self.clock_start_display = 0;
        self.clock_stop_display = lines * CLOCKS_PER_SCANLINE;
        self.clock_at_last_update = 0;
        self.frame_number = 0;
        self.scanlines_last_frame = 0;
        self.vsync_enabled = false;
        self.vblank_enabled = false;
        self.colors = [0; 4];
        self.playfield = 0;
        self.ctrlpf = 0;
        self.positions = [0; 5];
        self.enabled = [false; 3];
        self.collision = 0;
        self.dump_enabled = false;
        self.dump_disabled_cycle = 0;
    }
}

impl Serializable for Tia {
    fn name(&self) -> &'static str {
        "TIA"
    }

    fn save(&self, out: &mut StateStore) -> Result<()> {
        write_tag(out, self.name())?;
        out.write_u32_array(&[
            self.clock_when_frame_started,
            self.clock_start_display,
            self.clock_stop_display,
            self.clock_at_last_update,
        ])?;
        out.write_u32(self.frame_number)?;
        out.write_u32(self.scanlines_last_frame)?;
        out.write_bool(self.vsync_enabled)?;
        out.write_bool(self.vblank_enabled)?;
        out.write_bytes(&self.colors)?;
        out.write_u32(self.playfield)?;
        out.write_byte(self.ctrlpf)?;
        out.write_u16_array(&self.positions)?;
        for enabled in self.enabled {
            out.write_bool(enabled)?;
        }
        out.write_u16(self.collision)?;
        out.write_bool(self.dump_enabled)?;
        out.write_u32(self.dump_disabled_cycle)
    }

    fn load(&mut self, input: &mut StateStore) -> Result<()> {
        expect_tag(input, self.name())?;
        let mut clocks = [0u32; 4];
        input.read_u32_array_into(&mut clocks)?;
        [
            self.clock_when_frame_started,
            self.clock_start_display,
            self.clock_stop_display,
            self.clock_at_last_update,
        ] = clocks;
        self.frame_number = input.read_u32()?;
        self.scanlines_last_frame = input.read_u32()?;
        self.vsync_enabled = input.read_bool()?;
        self.vblank_enabled = input.read_bool()?;
        input.read_bytes_into(&mut self.colors)?;
        self.playfield = input.read_u32()?;
        self.ctrlpf = input.read_byte()?;
        input.read_u16_array_into(&mut self.positions)?;
        for enabled in self.enabled.iter_mut() {
            *enabled = input.read_bool()?;
        }
        self.collision = input.read_u16()?;
        self.dump_enabled = input.read_bool()?;
        self.dump_disabled_cycle = input.read_u32()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_advance_clocks_and_count() {
        let mut tia = Tia::new(DisplayFormat::Ntsc);
        let cycles = tia.update();
        assert_eq!(cycles, 262 * 76);
        assert_eq!(tia.frame_number, 1);
        assert_eq!(tia.clock_when_frame_started, 262 * CLOCKS_PER_SCANLINE);
        assert!(!tia.is_pal());

        let mut tia = Tia::new(DisplayFormat::Pal);
        tia.update();
        assert!(tia.is_pal());
    }

    #[test]
    fn positions_wrap_to_scanline() {
        let mut tia = Tia::new(DisplayFormat::Ntsc);
        tia.set_position(Object::Ball, 230);
        assert_eq!(tia.position(Object::Ball), 2);
    }

    #[test]
    fn state_roundtrip_keeps_format() {
        let mut tia = Tia::new(DisplayFormat::Pal);
        tia.update();
        tia.colors = [1, 2, 3, 4];
        tia.set_position(Object::M1, 100);
        tia.enabled[2] = true;
        tia.collision = 0x7fff;

        let mut store = StateStore::open_memory();
        tia.save(&mut store).unwrap();
        store.reset();

        let mut restored = Tia::new(DisplayFormat::Pal);
        restored.load(&mut store).unwrap();
        assert_eq!(restored, tia);
    }
}
