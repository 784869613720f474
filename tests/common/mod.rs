#![allow(dead_code)]

use hack_vmt::assembler::{assemble, Assembled};
use hack_vmt::exec::AluExecutor;
use hack_vmt::isa::hack::HackDecoder;
use hack_vmt::memory::SP;
use hack_vmt::{translate, Bootstrap, Cpu, Ram, SourceModule, TranslatorConfig};

pub const STEP_LIMIT: u64 = 5_000_000;
pub const STACK_BASE: u16 = 256;

pub fn no_bootstrap() -> TranslatorConfig {
    TranslatorConfig { bootstrap: Bootstrap::Never, ..TranslatorConfig::default() }
}

pub fn build(modules: &[SourceModule], config: &TranslatorConfig) -> Assembled {
    let lines = translate(modules, config).expect("translate");
    assemble(&lines.join("\n")).expect("assemble")
}

/// Translate, assemble and run to the halt loop on `ram`.
pub fn run_on(modules: &[SourceModule], config: &TranslatorConfig, ram: &mut Ram) -> Assembled {
    let program = build(modules, config);
    let mut cpu = Cpu::new();
    cpu.run(&program.words, ram, &HackDecoder::new(), &AluExecutor, STEP_LIMIT)
        .expect("program should halt");
    program
}

/// Run a single `Main` module without bootstrap, stack at 256.
pub fn run_bare(source: &str) -> Ram {
    run_bare_with(source, &[])
}

/// Like [`run_bare`], presetting `(address, value)` cells first.
pub fn run_bare_with(source: &str, preset: &[(u16, u16)]) -> Ram {
    let mut ram = Ram::default();
    ram.mem[SP as usize] = STACK_BASE;
    for (addr, val) in preset {
        ram.mem[*addr as usize] = *val;
    }
    run_on(&[SourceModule::new("Main", source)], &no_bootstrap(), &mut ram);
    ram
}

/// Run a multi-module program through the bootstrap.
pub fn run_program(modules: &[(&str, &str)]) -> Ram {
    let modules: Vec<SourceModule> = modules.iter().map(|(n, t)| SourceModule::new(*n, t)).collect();
    let mut ram = Ram::default();
    run_on(&modules, &TranslatorConfig::default(), &mut ram);
    ram
}
