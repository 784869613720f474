use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Hack data memory is word addressed: 32K words of 16 bits.
pub const RAM_WORDS: usize = 0x8000;

pub const SP: u16 = 0;
pub const LCL: u16 = 1;
pub const ARG: u16 = 2;
pub const THIS: u16 = 3;
pub const THAT: u16 = 4;
pub const TEMP_BASE: u16 = 5;
pub const TEMP_WORDS: u16 = 8;
pub const STATIC_BASE: u16 = 16;
pub const SCREEN: u16 = 0x4000;
pub const KBD: u16 = 0x6000;

pub trait Bus {
    fn read(&mut self, addr: u16) -> Result<u16>;
    fn write(&mut self, addr: u16, val: u16) -> Result<()>;
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Ram {
    pub mem: Vec<u16>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self { mem: vec![0; size] }
    }

    /// Signed view of a cell, for inspecting VM values.
    pub fn signed(&self, addr: u16) -> i16 {
        self.mem[addr as usize] as i16
    }

    /// Stack contents from `base` up to (excluding) `SP`.
    pub fn stack(&self, base: u16) -> Vec<i16> {
        let sp = self.mem[SP as usize];
        (base..sp.max(base)).map(|a| self.signed(a)).collect()
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new(RAM_WORDS)
    }
}

impl Bus for Ram {
    fn read(&mut self, addr: u16) -> Result<u16> {
        match self.mem.get(addr as usize) {
            Some(v) => Ok(*v),
            None => bail!("read past end of {}-word memory", self.mem.len()),
        }
    }
    fn write(&mut self, addr: u16, val: u16) -> Result<()> {
        match self.mem.get_mut(addr as usize) {
            Some(slot) => {
                *slot = val;
                Ok(())
            }
            None => bail!("write past end of {}-word memory", self.mem.len()),
        }
    }
}
