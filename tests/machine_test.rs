mod common;
use common::*;
use vm16::mach::{Error, Event, Machine, State};

#[test]
fn hello_image_prints_and_halts() {
    let mut machine = Machine::new(vec![19, 72, 19, 73, 0]);
    let (text, event) = exec(&mut machine);
    assert_eq!(text, "HI");
    assert!(matches!(event, Event::Stopped));
    assert_eq!(machine.state(), State::Halted);
}

#[test]
fn a_small_counting_loop_terminates() {
    // set r0 5; loop at 3: add r0 r0 32767 (minus one mod 32768);
    // jt r0 3; out '.'; halt
    let mut machine = Machine::new(vec![
        1, 32768, 5, 9, 32768, 32768, 32767, 7, 32768, 3, 19, 46, 0,
    ]);
    let (text, event) = exec(&mut machine);
    assert_eq!(text, ".");
    assert!(matches!(event, Event::Stopped));
    assert_eq!(machine.register(0), 0);
}

#[test]
fn interactive_program_echoes_a_line() {
    // loop at 0: in r0; eq r1 r0 '\n'; jt r1 13; out r0; jmp 0; halt at 13
    let mut machine = Machine::new(vec![
        20, 32768, 4, 32769, 32768, 10, 7, 32769, 13, 19, 32768, 6, 0, 0,
    ]);
    let (text, event) = exec(&mut machine);
    assert_eq!(text, "");
    assert!(matches!(event, Event::Input));
    machine.enter("hey");
    let (text, event) = exec(&mut machine);
    assert_eq!(text, "hey");
    assert!(matches!(event, Event::Stopped));
}

#[test]
fn a_fault_is_reported_once_and_is_terminal() {
    // mod r0 1 0
    let mut machine = Machine::new(vec![11, 32768, 1, 0]);
    let (_, event) = exec(&mut machine);
    assert!(matches!(event, Event::Error(Error::DivisionByZero)));
    assert_eq!(machine.state(), State::Faulted);
    let (_, event) = exec(&mut machine);
    assert!(matches!(event, Event::Stopped));
}
