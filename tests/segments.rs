mod common;

use common::{run_bare_with, run_on, no_bootstrap, STACK_BASE};
use hack_vmt::memory::{ARG, LCL, SP, THAT, THIS};
use hack_vmt::{Ram, SourceModule};
use pretty_assertions::assert_eq;

#[test]
fn basic_segments() {
    let src = "\
push constant 10
pop local 0
push constant 21
push constant 22
pop argument 2
pop argument 1
push constant 36
pop this 6
push constant 42
push constant 45
pop that 5
pop that 2
push constant 510
pop temp 6
push local 0
push that 5
add
push argument 1
sub
push this 6
push this 6
add
sub
push temp 6
add
";
    let ram = run_bare_with(src, &[(LCL, 300), (ARG, 400), (THIS, 3000), (THAT, 3010)]);
    assert_eq!(ram.mem[SP as usize], 257);
    assert_eq!(ram.mem[256], 472);
    assert_eq!(ram.mem[300], 10);
    assert_eq!(ram.mem[401], 21);
    assert_eq!(ram.mem[402], 22);
    assert_eq!(ram.mem[3006], 36);
    assert_eq!(ram.mem[3012], 42);
    assert_eq!(ram.mem[3015], 45);
    assert_eq!(ram.mem[11], 510);
}

#[test]
fn pointer_segment_moves_this_and_that() {
    let src = "\
push constant 3030
pop pointer 0
push constant 3040
pop pointer 1
push constant 32
pop this 2
push constant 46
pop that 6
push pointer 0
push pointer 1
add
push this 2
sub
push that 6
add
";
    let ram = run_bare_with(src, &[]);
    assert_eq!(ram.mem[256], 6084);
    assert_eq!(ram.mem[THIS as usize], 3030);
    assert_eq!(ram.mem[THAT as usize], 3040);
    assert_eq!(ram.mem[3032], 32);
    assert_eq!(ram.mem[3046], 46);
}

#[test]
fn statics() {
    let src = "\
push constant 111
push constant 333
push constant 888
pop static 8
pop static 3
pop static 1
push static 3
push static 1
sub
push static 8
add
";
    let ram = run_bare_with(src, &[]);
    assert_eq!(ram.stack(STACK_BASE), vec![1110]);
}

#[test]
fn statics_are_private_to_their_module() {
    let a = SourceModule::new("A", "push constant 5\npop static 0\n");
    let b = SourceModule::new("B", "push constant 9\npop static 0\n");
    let mut ram = Ram::default();
    ram.mem[SP as usize] = STACK_BASE;
    let program = run_on(&[a, b], &no_bootstrap(), &mut ram);

    let (sa, sb) = (program.symbol("A.0").unwrap(), program.symbol("B.0").unwrap());
    assert_ne!(sa, sb);
    assert!(sa >= 16 && sb >= 16);
    assert_eq!(ram.mem[sa as usize], 5);
    assert_eq!(ram.mem[sb as usize], 9);
}

#[test]
fn temp_covers_r5_to_r12() {
    let ram = run_bare_with("push constant 1\npop temp 0\npush constant 8\npop temp 7\n", &[]);
    assert_eq!(ram.mem[5], 1);
    assert_eq!(ram.mem[12], 8);
}

#[test]
fn push_pop_round_trip_through_every_writable_segment() {
    let preset = [(LCL, 300), (ARG, 400), (THIS, 3000), (THAT, 3010)];
    for (seg, index) in [
        ("local", 3),
        ("argument", 1),
        ("this", 4),
        ("that", 0),
        ("temp", 2),
        ("pointer", 1),
        ("static", 5),
    ] {
        let src = format!("push constant 1234\npop {seg} {index}\npush {seg} {index}\n");
        let ram = run_bare_with(&src, &preset);
        assert_eq!(ram.stack(STACK_BASE), vec![1234], "{seg} {index}");
    }
}
