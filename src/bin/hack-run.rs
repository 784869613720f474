use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hack_vmt::assembler::assemble;
use hack_vmt::decoder::Decoder;
use hack_vmt::disasm::fmt_decoded;
use hack_vmt::exec::AluExecutor;
use hack_vmt::isa::hack::HackDecoder;
use hack_vmt::memory::{ARG, LCL, SP, THAT, THIS};
use hack_vmt::{Cpu, Flow, Ram};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble a Hack .asm file and run it on the hack-vmt emulator"
)]
struct Opts {
    /// Preset SP before running (for programs without a bootstrap)
    #[arg(long)]
    sp: Option<u16>,
    /// Where the VM stack starts, for the stack dump
    #[arg(long, default_value_t = 256u16)]
    stack_base: u16,
    #[arg(long, default_value_t = 10_000_000u64)]
    max_steps: u64,
    /// Log every executed instruction at trace level
    #[arg(long)]
    trace: bool,
    /// Print the final state as JSON
    #[arg(long)]
    json: bool,
    #[arg(value_name = "ASMFILE")]
    input: String,
}

#[derive(Serialize)]
struct Report {
    halted: bool,
    steps: u64,
    pc: u16,
    a: u16,
    d: i16,
    sp: u16,
    lcl: u16,
    arg: u16,
    this: u16,
    that: u16,
    stack: Vec<i16>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = std::fs::read_to_string(&opts.input)?;
    let program = assemble(&text)?;
    debug!(words = program.words.len(), "assembled");

    let mut ram = Ram::default();
    if let Some(sp) = opts.sp {
        ram.mem[SP as usize] = sp;
    }
    let mut cpu = Cpu::new();
    let dec = HackDecoder::new();
    let exec = AluExecutor;

    let mut halted = false;
    while cpu.steps < opts.max_steps {
        if opts.trace {
            if let Some(d) = program.words.get(cpu.pc as usize).and_then(|w| dec.decode(*w)) {
                tracing::trace!(pc = cpu.pc, "{}", fmt_decoded(&d));
            }
        }
        match cpu.step(&program.words, &mut ram, &dec, &exec) {
            Ok(Flow::Halted) => {
                halted = true;
                break;
            }
            Ok(Flow::Continue) => {}
            Err(trap) => {
                eprintln!("TRAP: {trap}");
                break;
            }
        }
    }

    let report = Report {
        halted,
        steps: cpu.steps,
        pc: cpu.pc,
        a: cpu.a,
        d: cpu.d as i16,
        sp: ram.mem[SP as usize],
        lcl: ram.mem[LCL as usize],
        arg: ram.mem[ARG as usize],
        this: ram.mem[THIS as usize],
        that: ram.mem[THAT as usize],
        stack: ram.stack(opts.stack_base),
    };
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} after {} steps: pc={} SP={} LCL={} ARG={} THIS={} THAT={}",
            if report.halted { "halted" } else { "stopped" },
            report.steps,
            report.pc,
            report.sp,
            report.lcl,
            report.arg,
            report.this,
            report.that
        );
        println!("stack: {:?}", report.stack);
    }
    Ok(())
}
