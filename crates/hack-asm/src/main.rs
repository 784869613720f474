use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;

use hack_vmt::assembler::assemble;
use hack_vmt::decoder::Decoder;
use hack_vmt::disasm::fmt_decoded;
use hack_vmt::isa::hack::HackDecoder;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hack assembler and disassembler", long_about=None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble .asm into .hack (one 16-digit binary word per line)
    Asm {
        #[arg(value_name = "ASMFILE")]
        input: PathBuf,
        /// Output file (default: input with .hack extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export the symbol table to JSON (Vec<{ name, addr }>)
        #[arg(long, value_name = "FILE")]
        symbols_out: Option<PathBuf>,
    },
    /// List a .hack file as assembly
    Disasm {
        #[arg(value_name = "HACKFILE")]
        input: PathBuf,
        /// Show the binary word beside each instruction
        #[arg(long)]
        show_bits: bool,
    },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SymbolKV {
    name: String,
    addr: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Asm { input, output, symbols_out } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let program = assemble(&text)?;
            let mut buf = String::with_capacity(program.words.len() * 17);
            for w in &program.words {
                let _ = writeln!(buf, "{w:016b}");
            }
            let out = output.unwrap_or_else(|| input.with_extension("hack"));
            std::fs::write(&out, buf)?;
            if let Some(path) = symbols_out {
                let mut arr: Vec<SymbolKV> = program
                    .symbols
                    .iter()
                    .map(|(name, addr)| SymbolKV { name: name.clone(), addr: *addr })
                    .collect();
                arr.sort_by(|a, b| a.addr.cmp(&b.addr).then_with(|| a.name.cmp(&b.name)));
                std::fs::write(path, serde_json::to_string_pretty(&arr)?)?;
            }
        }
        Command::Disasm { input, show_bits } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let dec = HackDecoder::new();
            let mut buf = String::new();
            for (pc, line) in text.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
                let word = u16::from_str_radix(line, 2)
                    .with_context(|| format!("line {}: not a 16-bit binary word", pc + 1))?;
                let listing = match dec.decode(word) {
                    Some(d) => fmt_decoded(&d),
                    None => format!(".word {word:#06x}"),
                };
                if show_bits {
                    let _ = writeln!(buf, "{pc:5}: {word:016b}  {listing}");
                } else {
                    let _ = writeln!(buf, "{pc:5}: {listing}");
                }
            }
            print!("{buf}");
        }
    }
    Ok(())
}
