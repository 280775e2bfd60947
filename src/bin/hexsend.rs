//! Host side companion to the boot loader.
//!
//! `pack` turns a flat binary into records the loader accepts, `check` lints
//! an existing image, `simulate` runs an image through the real loader in
//! memory, and `send` streams it to a serial device node.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hexboot::hosted::Bench;
use hexboot::lint::{self, Report};
use hexboot::{encode_image, Config, Jump, Loader};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "hexsend",
    version,
    about = "Prepare, check and upload Intel HEX images for the serial boot loader"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a flat binary as loader-ready Intel HEX.
    Pack {
        /// Raw binary image.
        input: PathBuf,

        /// Where to write the records. Standard output if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Load address of the first byte.
        #[arg(long, default_value = "0x8000", value_parser = parse_address)]
        base: u32,
    },

    /// Parse an image strictly and report what the loader would mishandle.
    Check {
        file: PathBuf,
    },

    /// Run an image through the loader against simulated memory.
    Simulate {
        file: PathBuf,

        /// Append the `g` command as if typed after the upload.
        #[arg(long)]
        go: bool,
    },

    /// Write an image to an already configured serial device.
    Send {
        file: PathBuf,

        /// Device node, e.g. /dev/ttyUSB0.
        device: PathBuf,

        /// Send `g` after the image.
        #[arg(long)]
        go: bool,

        /// Bytes written between flushes.
        #[arg(long, default_value_t = 1024)]
        chunk: usize,

        /// Send even if the image has findings.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pack {
            input,
            output,
            base,
        } => cmd_pack(&input, output.as_deref(), base),
        Commands::Check { file } => cmd_check(&file).map(|_| ()),
        Commands::Simulate { file, go } => {
            cmd_simulate(&file, go, &mut io::stdout().lock()).map(|_| ())
        }
        Commands::Send {
            file,
            device,
            go,
            chunk,
            force,
        } => cmd_send(&file, &device, go, chunk, force),
    }
}

fn parse_address(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };

    parsed.map_err(|e| format!("invalid address {:?}: {}", s, e))
}

fn read_image(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn cmd_pack(input: &Path, output: Option<&Path>, base: u32) -> Result<()> {
    let binary = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let text = encode_image(base, &binary)?;

    info!("{} bytes at {:#x}", binary.len(), base);

    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", text),
    }

    Ok(())
}

fn cmd_check(file: &Path) -> Result<Report> {
    let text = read_image(file)?;
    let report = lint::check(&text).with_context(|| format!("{} is not loadable", file.display()))?;

    for finding in &report.findings {
        warn!("{}", finding);
    }
    info!(
        "{}: {} records, {} words",
        file.display(),
        report.records,
        report.words
    );

    Ok(report)
}

fn cmd_simulate(file: &Path, go: bool, out: &mut impl Write) -> Result<Option<Jump>> {
    let mut input = read_image(file)?.into_bytes();
    if go {
        input.push(b'g');
    }

    let mut bench = Bench::default();
    let mut loader = Loader::new(Config::default());
    let jump = loader.pump(input, &mut bench);

    for (address, value) in bench.memory.writes() {
        writeln!(out, "{:#010x}: {:#010x}", address, value)?;
    }

    let console = bench.serial.output();
    if !console.is_empty() {
        writeln!(out, "console: {:?}", console)?;
    }

    match jump {
        Some(jump) => writeln!(out, "jump to {:#x}", jump.entry)?,
        None => writeln!(out, "no jump, waiting for more input")?,
    }

    Ok(jump)
}

fn cmd_send(file: &Path, device: &Path, go: bool, chunk: usize, force: bool) -> Result<()> {
    if chunk == 0 {
        bail!("chunk size must be at least 1");
    }

    let report = cmd_check(file)?;
    if !report.is_clean() && !force {
        bail!(
            "{} has {} findings, pass --force to send anyway",
            file.display(),
            report.findings.len()
        );
    }

    let text = read_image(file)?;
    let mut port = OpenOptions::new()
        .write(true)
        .open(device)
        .with_context(|| format!("could not open port {}", device.display()))?;

    info!("sending {} to {}", file.display(), device.display());

    for block in text.as_bytes().chunks(chunk) {
        port.write_all(block)
            .and_then(|_| port.flush())
            .with_context(|| format!("write to {} failed", device.display()))?;
    }

    if go {
        port.write_all(b"g")
            .and_then(|_| port.flush())
            .context("failed to send the go command")?;
    }

    info!("{} sent", file.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const IMAGE: &str = ":0400000000001234AB\r\n:00000001FF\r\n";
    const UNALIGNED: &str = ":0400020000001234B4\r\n:00000001FF\r\n";

    fn image(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn addresses() {
        assert_eq!(parse_address("0x8000"), Ok(0x8000));
        assert_eq!(parse_address("0X10"), Ok(0x10));
        assert_eq!(parse_address("32768"), Ok(0x8000));
        assert!(parse_address("0xZZ").is_err());
    }

    #[test]
    fn check_reports_findings() {
        let dir = TempDir::new().unwrap();

        let report = cmd_check(&image(&dir, "clean.hex", IMAGE)).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.words, 1);

        let report = cmd_check(&image(&dir, "unaligned.hex", UNALIGNED)).unwrap();
        assert_eq!(report.findings.len(), 1);

        let error = cmd_check(&image(&dir, "broken.hex", ":0400000000001234AC\r\n")).unwrap_err();
        assert!(format!("{:#}", error).contains("is not loadable"));
    }

    #[test]
    fn pack_then_check() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("kernel.bin");
        let output = dir.path().join("kernel.hex");
        fs::write(&binary, [0xAAu8; 40]).unwrap();

        cmd_pack(&binary, Some(&output), 0x8000).unwrap();

        let report = cmd_check(&output).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.words, 10);
    }

    #[test]
    fn simulate_prints_writes_and_jump() {
        let dir = TempDir::new().unwrap();
        let file = image(&dir, "kernel.hex", IMAGE);
        let mut out = Vec::new();

        let jump = cmd_simulate(&file, true, &mut out).unwrap();
        assert_eq!(jump, Some(Jump { entry: 0x8000 }));

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("0x00000000: 0x34120000"));
        assert!(out.contains("jump to 0x8000"));

        let mut out = Vec::new();
        assert_eq!(cmd_simulate(&file, false, &mut out).unwrap(), None);
        assert!(String::from_utf8(out).unwrap().contains("no jump"));
    }

    #[test]
    fn send_writes_image_then_go() {
        let dir = TempDir::new().unwrap();
        let file = image(&dir, "kernel.hex", IMAGE);
        let device = image(&dir, "tty", "");

        cmd_send(&file, &device, true, 7, false).unwrap();

        let sent = fs::read_to_string(&device).unwrap();
        assert_eq!(sent, format!("{}g", IMAGE));
    }

    #[test]
    fn send_refuses_findings_unless_forced() {
        let dir = TempDir::new().unwrap();
        let file = image(&dir, "unaligned.hex", UNALIGNED);
        let device = image(&dir, "tty", "");

        let error = cmd_send(&file, &device, false, 1024, false).unwrap_err();
        assert!(error.to_string().contains("--force"));
        assert_eq!(fs::read_to_string(&device).unwrap(), "");

        cmd_send(&file, &device, false, 1024, true).unwrap();
        assert_eq!(fs::read_to_string(&device).unwrap(), UNALIGNED);
    }

    #[test]
    fn send_needs_an_existing_device_and_a_chunk() {
        let dir = TempDir::new().unwrap();
        let file = image(&dir, "kernel.hex", IMAGE);

        assert!(cmd_send(&file, &dir.path().join("missing"), false, 1024, false).is_err());
        assert!(cmd_send(&file, &image(&dir, "tty", ""), false, 0, false).is_err());
    }
}
