use crate::mach::{Event, Machine};


/// Pump the machine until it suspends, collecting printed text along
/// the way. Returns the text and the suspending event.
fn run(machine: &mut Machine) -> (String, Event) {
    run_cycles(machine, 5000)
}

fn run_cycles(machine: &mut Machine, cycles: usize) -> (String, Event) {
    let mut text = String::new();
    let mut prev_running = false;
    loop {
        let event = machine.execute(cycles);
        match event {
            Event::Print(bytes) => {
                text.push_str(&String::from_utf8_lossy(&bytes));
                prev_running = false;
            }
            Event::Running => {
                if prev_running {
                    return (text, Event::Running);
                }
                prev_running = true;
            }
            _ => return (text, event),
        }
    }
}
