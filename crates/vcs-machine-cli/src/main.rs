#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use vcs_machine::{Console, ConsoleProperties, DisplayFormat};
use vcs_snapshot::{StateConfig, StateManager, StateStore, DEFAULT_SLOT_COUNT};

#[derive(Debug, Parser)]
#[command(
    name = "vcs-machine",
    about = "Save, restore and inspect VCS machine snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Boot a ROM, optionally run it for a while, and save its state into a slot.
    Save {
        #[command(flatten)]
        machine: MachineArgs,

        /// Frames to run before saving.
        #[arg(long, default_value_t = 0)]
        frames: u32,
    },
    /// Boot a ROM and restore the state stored in a slot.
    Load {
        #[command(flatten)]
        machine: MachineArgs,

        /// Frames to run after restoring.
        #[arg(long, default_value_t = 0)]
        frames: u32,
    },
    /// Print the header of a snapshot file.
    Inspect {
        /// Snapshot file to read.
        snapshot: PathBuf,
    },
}

#[derive(Debug, Args)]
struct MachineArgs {
    /// Cartridge ROM image (2K, 4K, F8, F8SC, F6 or F4).
    #[arg(long)]
    rom: PathBuf,

    /// State slot, wrapped into the slot range.
    #[arg(long, default_value_t = 0)]
    slot: u8,

    /// Directory holding `<rom>.st<slot>` files.
    #[arg(long, env = "VCS_STATE_DIR", default_value = ".")]
    state_dir: PathBuf,

    /// Number of rotating slots.
    #[arg(long, default_value_t = DEFAULT_SLOT_COUNT)]
    slot_count: u8,

    /// TV standard the console runs.
    #[arg(long, value_enum, default_value_t = Format::Ntsc)]
    format: Format,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Ntsc,
    Pal,
    Secam,
}

impl From<Format> for DisplayFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Ntsc => DisplayFormat::Ntsc,
            Format::Pal => DisplayFormat::Pal,
            Format::Secam => DisplayFormat::Secam,
        }
    }
}

/// A console built from the command line, plus the slot file it maps to.
struct Session {
    console: Console,
    manager: StateManager,
    slot_path: PathBuf,
}

impl Session {
    fn open(args: &MachineArgs) -> Result<Self> {
        let rom = fs::read(&args.rom)
            .with_context(|| format!("failed to read ROM: {}", args.rom.display()))?;
        let rom_name = rom_name(&args.rom)?;

        let properties = ConsoleProperties {
            cartridge_name: rom_name.clone(),
            display_format: args.format.into(),
            ..ConsoleProperties::default()
        };
        let console = Console::new(rom, properties)
            .with_context(|| format!("failed to build console for {}", args.rom.display()))?;

        let config = StateConfig {
            state_dir: args.state_dir.clone(),
            slot_count: args.slot_count,
        };
        let mut manager = StateManager::new(&config);
        manager.set_slot(args.slot);
        let slot_path = config.slot_path(&rom_name, manager.current_slot());

        Ok(Self {
            console,
            manager,
            slot_path,
        })
    }
}

fn rom_name(rom: &Path) -> Result<String> {
    rom.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("ROM path has no usable file name: {}", rom.display()))
}

fn save(args: &MachineArgs, frames: u32) -> Result<()> {
    let mut session = Session::open(args)?;
    session.console.run_frames(frames);
    session
        .manager
        .save_state_to_file(&session.console, &session.slot_path)
        .with_context(|| format!("failed to save {}", session.slot_path.display()))?;
    println!(
        "saved slot {} to {}",
        session.manager.current_slot(),
        session.slot_path.display()
    );
    Ok(())
}

fn load(args: &MachineArgs, frames: u32) -> Result<()> {
    let mut session = Session::open(args)?;
    if !session.slot_path.exists() {
        bail!("no state in slot {}", session.manager.current_slot());
    }
    session
        .manager
        .load_state_from_file(&mut session.console, &session.slot_path)
        .with_context(|| format!("failed to load {}", session.slot_path.display()))?;
    session.console.run_frames(frames);

    let system = session.console.system();
    println!(
        "loaded slot {} ({} frames, {} cycles)",
        session.manager.current_slot(),
        system.tia().frame_number,
        system.cycles()
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let mut store = StateStore::open_file(path, true);
    if !store.is_valid() {
        bail!("failed to open snapshot: {}", path.display());
    }
    if store.is_empty()? {
        bail!("snapshot file is empty: {}", path.display());
    }
    let info = StateManager::default()
        .peek_header(&mut store)
        .with_context(|| format!("not a snapshot: {}", path.display()))?;
    let len = store.len()?;

    println!("kind:     {}", info.kind);
    println!("identity: {}", info.identity);
    println!("body:     {} bytes", len.saturating_sub(info.body_offset));
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Save { machine, frames } => save(machine, *frames),
        Command::Load { machine, frames } => load(machine, *frames),
        Command::Inspect { snapshot } => inspect(snapshot),
    };
    if let Err(err) = &result {
        tracing::error!("{err:#}");
    }
    result
}
