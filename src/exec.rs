use crate::cpu::{Cpu, Trap};
use crate::decoder::Decoded;
use crate::instructions::{Comp, Dest};
use crate::memory::Bus;

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<(), Trap>;
}

/// The Hack ALU. All arithmetic wraps at 16 bits.
pub struct AluExecutor;

pub fn alu(comp: Comp, a: u16, d: u16, m: u16) -> u16 {
    match comp {
        Comp::Zero => 0,
        Comp::One => 1,
        Comp::NegOne => 0xFFFF,
        Comp::D => d,
        Comp::A => a,
        Comp::M => m,
        Comp::NotD => !d,
        Comp::NotA => !a,
        Comp::NotM => !m,
        Comp::NegD => d.wrapping_neg(),
        Comp::NegA => a.wrapping_neg(),
        Comp::NegM => m.wrapping_neg(),
        Comp::DPlusOne => d.wrapping_add(1),
        Comp::APlusOne => a.wrapping_add(1),
        Comp::MPlusOne => m.wrapping_add(1),
        Comp::DMinusOne => d.wrapping_sub(1),
        Comp::AMinusOne => a.wrapping_sub(1),
        Comp::MMinusOne => m.wrapping_sub(1),
        Comp::DPlusA => d.wrapping_add(a),
        Comp::DPlusM => d.wrapping_add(m),
        Comp::DMinusA => d.wrapping_sub(a),
        Comp::DMinusM => d.wrapping_sub(m),
        Comp::AMinusD => a.wrapping_sub(d),
        Comp::MMinusD => m.wrapping_sub(d),
        Comp::DAndA => d & a,
        Comp::DAndM => d & m,
        Comp::DOrA => d | a,
        Comp::DOrM => d | m,
    }
}

impl Executor for AluExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<(), Trap> {
        match d {
            Decoded::Load(v) => {
                cpu.a = v;
                cpu.pc = cpu.pc.wrapping_add(1);
            }
            Decoded::Compute { dest, comp, jump } => {
                // M and the jump target both use A as it was before this instruction.
                let addr = cpu.a;
                let m = if comp.reads_memory() {
                    bus.read(addr).map_err(|source| Trap::Bus { addr, source })?
                } else {
                    0
                };
                let out = alu(comp, cpu.a, cpu.d, m);
                if dest.contains(Dest::M) {
                    bus.write(addr, out)
                        .map_err(|source| Trap::Bus { addr, source })?;
                }
                if dest.contains(Dest::A) {
                    cpu.a = out;
                }
                if dest.contains(Dest::D) {
                    cpu.d = out;
                }
                cpu.pc = if jump.taken(out) { addr } else { cpu.pc.wrapping_add(1) };
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alu_wraps_at_sixteen_bits() {
        assert_eq!(alu(Comp::DPlusA, 0x7FFF, 1, 0), 0x8000);
        assert_eq!(alu(Comp::MMinusD, 0, 1, 0), 0xFFFF);
        assert_eq!(alu(Comp::NegM, 0, 0, 5) as i16, -5);
        assert_eq!(alu(Comp::NotD, 0, 0, 0), 0xFFFF);
    }
}
