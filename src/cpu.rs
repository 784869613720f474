use anyhow::Error;
use serde::{Deserialize, Serialize};

use crate::decoder::{Decoded, Decoder};
use crate::exec::Executor;
use crate::instructions::Jump;
use crate::memory::Bus;

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The program reached a `(L) @L 0;JMP` self-loop.
    Halted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: u16,
    pub a: u16,
    pub d: u16,
    pub steps: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("Invalid instruction {word:#06x} at {pc}")]
    InvalidInstruction { pc: u16, word: u16 },
    #[error("PC {pc} is outside the {len}-word program")]
    PcOutOfRange { pc: u16, len: usize },
    #[error("Bus error at {addr}: {source}")]
    Bus { addr: u16, #[source] source: Error },
    #[error("Step limit of {limit} reached at PC {pc}")]
    StepLimit { pc: u16, limit: u64 },
}

impl Cpu {
    pub fn new() -> Self {
        Self { pc: 0, a: 0, d: 0, steps: 0 }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        rom: &[u16],
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<Flow, Trap> {
        let pc = self.pc;
        let word = *rom
            .get(pc as usize)
            .ok_or(Trap::PcOutOfRange { pc, len: rom.len() })?;
        let d = dec.decode(word).ok_or(Trap::InvalidInstruction { pc, word })?;
        exec.exec(self, bus, d)?;
        self.steps += 1;

        let self_loop = matches!(d, Decoded::Compute { jump, .. } if jump == Jump::all())
            && self.pc == pc.wrapping_sub(1)
            && rom.get(self.pc as usize) == Some(&self.pc);
        Ok(if self_loop { Flow::Halted } else { Flow::Continue })
    }

    /// Step until the program halts or `limit` instructions have executed.
    pub fn run<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        rom: &[u16],
        bus: &mut B,
        dec: &D,
        exec: &X,
        limit: u64,
    ) -> Result<u64, Trap> {
        let start = self.steps;
        while self.steps - start < limit {
            if self.step(rom, bus, dec, exec)? == Flow::Halted {
                return Ok(self.steps - start);
            }
        }
        Err(Trap::StepLimit { pc: self.pc, limit })
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
