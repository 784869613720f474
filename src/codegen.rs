//! Lowering of VM commands to Hack instructions.
//!
//! The VM stack lives in RAM starting at `SP`'s initial value and grows
//! upward; `SP` always points one past the top value. Generated code uses
//! three scratch cells: R13 holds a computed pop destination, R14 the frame
//! base during `return`, and R15 the return address during `return`.
//!
//! Comparisons branch to absolute addresses computed from the address of
//! the first instruction of the sequence. That only works because the
//! sequence has a fixed length, pinned by [`COMPARE_TRUE_OFFSET`] and
//! [`COMPARE_LEN`]; the unit tests hold the emitted code to both.

use crate::command::{ArithOp, Command, Segment};
use crate::error::{ParseError, TranslateError, TranslateResult};
use crate::instructions::{Comp, Dest, Instr, Jump};
use crate::memory::TEMP_BASE;
use crate::namer::{return_symbol, TranslationContext, BOOTSTRAP_CALLER};
use crate::program::{ProgramImage, HALT_LABEL};

/// Offset from the start of an `eq`/`gt`/`lt` sequence to its "true" arm.
pub const COMPARE_TRUE_OFFSET: usize = 12;
/// Total instruction words of an `eq`/`gt`/`lt` sequence.
pub const COMPARE_LEN: usize = 15;

/// Words between a frame's saved return address and its callee's LCL.
const FRAME_WORDS: u16 = 5;

const POP_SCRATCH: &str = "R13";
const FRAME_SCRATCH: &str = "R14";
const RETURN_SCRATCH: &str = "R15";

/// Emit the instructions for one command into `out`.
///
/// `ctx` supplies the module and function names used for statics, labels
/// and return points. Entering a new function is the caller's business:
/// by the time a `Function` command arrives here, `ctx.current_function`
/// already names it.
pub fn generate(out: &mut ProgramImage, ctx: &TranslationContext, cmd: &Command) -> TranslateResult<()> {
    match cmd {
        Command::Arithmetic(op) => arithmetic(out, *op)?,
        Command::Push(seg, index) | Command::Pop(seg, index) if *index > seg.max_index() => {
            return Err(TranslateError::Parse {
                pos: ctx.pos(),
                text: cmd.to_string(),
                source: ParseError::IndexOutOfRange {
                    field: seg.name().to_string(),
                    index: *index,
                    max: seg.max_index(),
                },
            })
        }
        Command::Push(seg, index) => push(out, ctx, *seg, *index),
        Command::Pop(Segment::Constant, _) => {
            return Err(TranslateError::Parse {
                pos: ctx.pos(),
                text: cmd.to_string(),
                source: ParseError::PopConstant,
            })
        }
        Command::Pop(seg, index) => pop(out, ctx, *seg, *index),
        Command::Label(label) => out.label(ctx.label_symbol(label)),
        Command::Goto(label) => {
            out.emit(Instr::at(ctx.label_symbol(label)));
            out.emit(Instr::jump(Comp::Zero, Jump::all()));
        }
        Command::IfGoto(label) => {
            pop_d(out);
            out.emit(Instr::at(ctx.label_symbol(label)));
            out.emit(Instr::jump(Comp::D, Jump::LT | Jump::GT));
        }
        Command::Function { name, locals } => {
            out.label(name.as_str());
            for _ in 0..*locals {
                push_constant(out, 0);
            }
        }
        Command::Call { name, args } => call(out, ctx.caller(), name, *args),
        Command::Return => ret(out),
        Command::Comment => {}
    }
    Ok(())
}

/// `SP = stack_base; call entry 0`, then jump to the halt loop so a
/// returning entry function stops with its result on the stack.
pub fn bootstrap(out: &mut ProgramImage, stack_base: u16, entry: &str) {
    out.emit(Instr::at_value(stack_base));
    out.emit(Instr::set(Dest::D, Comp::A));
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::M, Comp::D));
    call(out, BOOTSTRAP_CALLER, entry, 0);
    out.emit(Instr::at(HALT_LABEL));
    out.emit(Instr::jump(Comp::Zero, Jump::all()));
}

/// `*SP++ = D`
fn push_d(out: &mut ProgramImage) {
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::M, Comp::MPlusOne));
    out.emit(Instr::set(Dest::A, Comp::MMinusOne));
    out.emit(Instr::set(Dest::M, Comp::D));
}

/// `D = *--SP`, leaving A at the popped cell.
fn pop_d(out: &mut ProgramImage) {
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::A | Dest::M, Comp::MMinusOne));
    out.emit(Instr::set(Dest::D, Comp::M));
}

fn push_constant(out: &mut ProgramImage, value: u16) {
    out.emit(Instr::at_value(value));
    out.emit(Instr::set(Dest::D, Comp::A));
    push_d(out);
}

/// Symbol or address of a fixed-location cell.
fn direct_cell(ctx: &TranslationContext, seg: Segment, index: u16) -> Option<Instr> {
    match seg {
        Segment::Temp => Some(Instr::at_value(TEMP_BASE + index)),
        Segment::Pointer => Some(Instr::at(if index == 0 { "THIS" } else { "THAT" })),
        Segment::Static => Some(Instr::at(ctx.static_symbol(index))),
        _ => None,
    }
}

fn push(out: &mut ProgramImage, ctx: &TranslationContext, seg: Segment, index: u16) {
    if seg == Segment::Constant {
        push_constant(out, index);
        return;
    }
    if let Some(base) = seg.base_pointer() {
        out.emit(Instr::at_value(index));
        out.emit(Instr::set(Dest::D, Comp::A));
        out.emit(Instr::at(base));
        out.emit(Instr::set(Dest::A, Comp::DPlusM));
        out.emit(Instr::set(Dest::D, Comp::M));
    } else if let Some(cell) = direct_cell(ctx, seg, index) {
        out.emit(cell);
        out.emit(Instr::set(Dest::D, Comp::M));
    }
    push_d(out);
}

fn pop(out: &mut ProgramImage, ctx: &TranslationContext, seg: Segment, index: u16) {
    if let Some(base) = seg.base_pointer() {
        out.emit(Instr::at_value(index));
        out.emit(Instr::set(Dest::D, Comp::A));
        out.emit(Instr::at(base));
        out.emit(Instr::set(Dest::D, Comp::DPlusM));
        out.emit(Instr::at(POP_SCRATCH));
        out.emit(Instr::set(Dest::M, Comp::D));
        pop_d(out);
        out.emit(Instr::at(POP_SCRATCH));
        out.emit(Instr::set(Dest::A, Comp::M));
        out.emit(Instr::set(Dest::M, Comp::D));
    } else if let Some(cell) = direct_cell(ctx, seg, index) {
        pop_d(out);
        out.emit(cell);
        out.emit(Instr::set(Dest::M, Comp::D));
    }
}

fn arithmetic(out: &mut ProgramImage, op: ArithOp) -> TranslateResult<()> {
    match op {
        ArithOp::Add => binary(out, Comp::DPlusM),
        ArithOp::Sub => binary(out, Comp::MMinusD),
        ArithOp::And => binary(out, Comp::DAndM),
        ArithOp::Or => binary(out, Comp::DOrM),
        ArithOp::Neg => unary(out, Comp::NegM),
        ArithOp::Not => unary(out, Comp::NotM),
        ArithOp::Eq => compare(out, Jump::EQ)?,
        ArithOp::Gt => compare(out, Jump::GT)?,
        ArithOp::Lt => compare(out, Jump::LT)?,
    }
    Ok(())
}

/// Pop y into D, then overwrite x with `comp(x, y)`.
fn binary(out: &mut ProgramImage, comp: Comp) {
    pop_d(out);
    out.emit(Instr::set(Dest::A, Comp::AMinusOne));
    out.emit(Instr::set(Dest::M, comp));
}

fn unary(out: &mut ProgramImage, comp: Comp) {
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::A, Comp::MMinusOne));
    out.emit(Instr::set(Dest::M, comp));
}

/// `x - y` tested against zero; true is -1, false 0. The subtraction
/// wraps at 16 bits, so operands further apart than 32767 compare wrong.
fn compare(out: &mut ProgramImage, jump: Jump) -> TranslateResult<()> {
    let start = out.next_address();
    let when_true = out.address(start, COMPARE_TRUE_OFFSET)?;
    let end = out.address(start, COMPARE_LEN)?;

    pop_d(out);
    out.emit(Instr::set(Dest::A, Comp::AMinusOne));
    out.emit(Instr::set(Dest::D, Comp::MMinusD));
    out.emit(Instr::at_value(when_true));
    out.emit(Instr::jump(Comp::D, jump));
    // false
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::A, Comp::MMinusOne));
    out.emit(Instr::set(Dest::M, Comp::Zero));
    out.emit(Instr::at_value(end));
    out.emit(Instr::jump(Comp::Zero, Jump::all()));
    // true
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::A, Comp::MMinusOne));
    out.emit(Instr::set(Dest::M, Comp::NegOne));
    Ok(())
}

/// Push the return point and the caller's four segment pointers, aim ARG
/// at the first argument and LCL at the new stack top, then jump.
fn call(out: &mut ProgramImage, caller: &str, callee: &str, args: u16) {
    let ret = return_symbol(caller, out.next_call_id());

    out.emit(Instr::at(ret.as_str()));
    out.emit(Instr::set(Dest::D, Comp::A));
    push_d(out);
    for saved in ["LCL", "ARG", "THIS", "THAT"] {
        out.emit(Instr::at(saved));
        out.emit(Instr::set(Dest::D, Comp::M));
        push_d(out);
    }

    // ARG = SP - 5 - args
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::D, Comp::M));
    out.emit(Instr::at_value(FRAME_WORDS + args));
    out.emit(Instr::set(Dest::D, Comp::DMinusA));
    out.emit(Instr::at("ARG"));
    out.emit(Instr::set(Dest::M, Comp::D));
    // LCL = SP
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::D, Comp::M));
    out.emit(Instr::at("LCL"));
    out.emit(Instr::set(Dest::M, Comp::D));

    out.emit(Instr::at(callee));
    out.emit(Instr::jump(Comp::Zero, Jump::all()));
    out.label(ret);
}

/// Unwind the frame based at LCL. The return address is read before the
/// return value is stored, since with no arguments `*ARG` is that slot.
fn ret(out: &mut ProgramImage) {
    // R14 = frame
    out.emit(Instr::at("LCL"));
    out.emit(Instr::set(Dest::D, Comp::M));
    out.emit(Instr::at(FRAME_SCRATCH));
    out.emit(Instr::set(Dest::M, Comp::D));
    // R15 = *(frame - 5)
    out.emit(Instr::at_value(FRAME_WORDS));
    out.emit(Instr::set(Dest::A, Comp::DMinusA));
    out.emit(Instr::set(Dest::D, Comp::M));
    out.emit(Instr::at(RETURN_SCRATCH));
    out.emit(Instr::set(Dest::M, Comp::D));
    // *ARG = pop()
    pop_d(out);
    out.emit(Instr::at("ARG"));
    out.emit(Instr::set(Dest::A, Comp::M));
    out.emit(Instr::set(Dest::M, Comp::D));
    // SP = ARG + 1
    out.emit(Instr::at("ARG"));
    out.emit(Instr::set(Dest::D, Comp::MPlusOne));
    out.emit(Instr::at("SP"));
    out.emit(Instr::set(Dest::M, Comp::D));
    // THAT, THIS, ARG, LCL = *(--frame)
    for restored in ["THAT", "THIS", "ARG", "LCL"] {
        out.emit(Instr::at(FRAME_SCRATCH));
        out.emit(Instr::set(Dest::A | Dest::M, Comp::MMinusOne));
        out.emit(Instr::set(Dest::D, Comp::M));
        out.emit(Instr::at(restored));
        out.emit(Instr::set(Dest::M, Comp::D));
    }
    out.emit(Instr::at(RETURN_SCRATCH));
    out.emit(Instr::set(Dest::A, Comp::M));
    out.emit(Instr::jump(Comp::Zero, Jump::all()));
}
