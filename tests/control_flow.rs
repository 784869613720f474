mod common;

use common::{build, no_bootstrap, run_bare_with, STACK_BASE};
use hack_vmt::exec::AluExecutor;
use hack_vmt::isa::hack::HackDecoder;
use hack_vmt::memory::{ARG, LCL, SP};
use hack_vmt::{Cpu, Ram, SourceModule};
use pretty_assertions::assert_eq;

#[test]
fn basic_loop_sums_down_to_zero() {
    let src = "\
push constant 0
pop local 0
label LOOP_START
push argument 0
push local 0
add
pop local 0
push argument 0
push constant 1
sub
pop argument 0
push argument 0
if-goto LOOP_START
push local 0
";
    let ram = run_bare_with(src, &[(LCL, 300), (ARG, 400), (400, 3)]);
    assert_eq!(ram.mem[SP as usize], 257);
    assert_eq!(ram.mem[256], 6);
}

#[test]
fn fibonacci_series() {
    let src = "\
push argument 1
pop pointer 1
push constant 0
pop that 0
push constant 1
pop that 1
push argument 0
push constant 2
sub
pop argument 0
label MAIN_LOOP_START
push argument 0
if-goto COMPUTE_ELEMENT
goto END_PROGRAM
label COMPUTE_ELEMENT
push that 0
push that 1
add
pop that 2
push pointer 1
push constant 1
add
pop pointer 1
push argument 0
push constant 1
sub
pop argument 0
goto MAIN_LOOP_START
label END_PROGRAM
";
    let ram = run_bare_with(src, &[(LCL, 300), (ARG, 400), (400, 6), (401, 3000)]);
    assert_eq!(ram.mem[3000..3006], [0u16, 1, 1, 2, 3, 5]);
}

#[test]
fn if_goto_takes_any_nonzero_value() {
    let src = "\
push constant 1
neg
if-goto YES
push constant 10
goto DONE
label YES
push constant 20
label DONE
";
    let ram = run_bare_with(src, &[]);
    assert_eq!(ram.stack(STACK_BASE), vec![20]);
}

#[test]
fn if_goto_pops_its_condition_when_falling_through() {
    let ram = run_bare_with("push constant 4\npush constant 0\nif-goto SKIP\nlabel SKIP\n", &[]);
    assert_eq!(ram.stack(STACK_BASE), vec![4]);
}

#[test]
fn vm_level_spin_loop_counts_as_halt() {
    let program = build(
        &[SourceModule::new("Main", "push constant 3\npop temp 0\nlabel END\ngoto END\n")],
        &no_bootstrap(),
    );
    let mut ram = Ram::default();
    ram.mem[SP as usize] = STACK_BASE;
    let mut cpu = Cpu::new();
    let steps = cpu.run(&program.words, &mut ram, &HackDecoder::new(), &AluExecutor, 1_000).unwrap();
    assert!(steps < 1_000);
    assert_eq!(ram.mem[5], 3);
}
