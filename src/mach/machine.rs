use super::debug::{Command, SIGIL};
use super::{word, Address, Error, Memory, Opcode, Snapshot, Stack, Word};
use std::collections::{HashSet, VecDeque};

type Result<T> = std::result::Result<T, Error>;

/// Execution state of a machine. `Halted` is the normal terminal state,
/// reached by `halt`, by `ret` on an empty stack, or by the debugger's
/// `quit`. `Faulted` is terminal and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted,
}

/// What a machine needs from its console, yielded by [`Machine::execute`].
/// The front-end owns all terminal and file I/O; the machine never blocks.
#[derive(Debug)]
pub enum Event {
    /// The cycle budget ran out; call `execute` again.
    Running,
    /// Normal termination.
    Stopped,
    /// Program output and debugger replies, written to stdout raw.
    /// `out` emits bytes, not text, so the stream is not always UTF-8.
    Print(Vec<u8>),
    /// The program wants one line of input; feed it with `enter`.
    Input,
    /// Suspended at a breakpoint or step; feed one debugger command
    /// with `enter`.
    Debug,
    /// The debugger asked for a state dump to this path.
    Save(String),
    /// The machine faulted; terminal.
    Error(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    None,
    Input,
    Debug,
}

/// ## The machine
///
/// Owns the whole machine state tuple: memory, the 8 registers, the
/// stack, and the program counter. `cpc` is the captured counter, the
/// address of the instruction currently being executed; breakpoints,
/// the debugger display, and snapshots all use it so a resumed machine
/// re-executes the suspended instruction exactly.
pub struct Machine {
    memory: Memory,
    regs: [Word; word::REGISTERS],
    stack: Stack,
    pc: Address,
    cpc: Address,
    state: State,
    debug: bool,
    stepping: bool,
    resumed: bool,
    breakpoints: HashSet<Address>,
    input: VecDeque<u8>,
    input_closed: bool,
    output: Vec<u8>,
    wait: Wait,
    pending: Option<Event>,
    dump_request: Option<String>,
}

impl Machine {
    pub fn new(image: Vec<Word>) -> Machine {
        Machine {
            memory: Memory::new(image),
            regs: [0; word::REGISTERS],
            stack: Stack::new(),
            pc: 0,
            cpc: 0,
            state: State::Running,
            debug: false,
            stepping: false,
            resumed: false,
            breakpoints: HashSet::new(),
            input: VecDeque::new(),
            input_closed: false,
            output: Vec::new(),
            wait: Wait::None,
            pending: None,
            dump_request: None,
        }
    }

    /// Reconstruct a machine from a snapshot. Execution resumes at the
    /// instruction whose address the snapshot captured.
    pub fn resume(snapshot: Snapshot) -> Machine {
        let mut machine = Machine::new(snapshot.memory);
        machine.regs = snapshot.registers;
        machine.stack = Stack::from_bottom_up(snapshot.stack);
        machine.pc = snapshot.pc as Address;
        machine.cpc = machine.pc;
        machine
    }

    /// Turn on the debugger. Stepping starts enabled so the first
    /// instruction suspends immediately.
    pub fn enable_debug(&mut self) {
        self.debug = true;
        self.stepping = true;
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn register(&self, index: usize) -> Word {
        self.regs[index]
    }

    pub fn set_register(&mut self, index: usize, value: Word) {
        self.regs[index] = value;
    }

    /// Address of the instruction being (or about to be) executed.
    pub fn counter(&self) -> Address {
        self.cpc
    }

    /// Immutable copy of the full machine state at this instant.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pc: self.cpc as Word,
            registers: self.regs,
            stack: self.stack.iter().copied().collect(),
            memory: self.memory.words().to_vec(),
        }
    }

    /// Run up to `cycles` instructions and report what happened or what
    /// is needed next.
    pub fn execute(&mut self, cycles: usize) -> Event {
        if let Some(event) = self.pending.take() {
            return event;
        }
        for _ in 0..cycles {
            match self.state {
                State::Running => {}
                State::Halted | State::Faulted => return self.suspend(Event::Stopped),
            }
            if let Some(path) = self.dump_request.take() {
                return self.suspend(Event::Save(path));
            }
            match self.wait {
                Wait::None => {}
                Wait::Input => return self.suspend(Event::Input),
                Wait::Debug => return self.suspend(Event::Debug),
            }
            self.cpc = self.pc;
            if self.debug
                && !self.resumed
                && (self.stepping || self.breakpoints.contains(&self.pc))
            {
                if !self.stepping {
                    self.echo(format!("Breakpoint at {:#x}", self.pc));
                }
                self.stepping = true;
                self.wait = Wait::Debug;
                return self.suspend(Event::Debug);
            }
            self.resumed = false;
            if let Err(error) = self.step() {
                self.state = State::Faulted;
                return self.suspend(Event::Error(error));
            }
        }
        self.suspend(Event::Running)
    }

    /// Feed one console line to whichever side asked for it: a program
    /// input line for [`Event::Input`], a debugger command for
    /// [`Event::Debug`]. In debug mode an input line starting with the
    /// `~` sigil is routed to the debugger instead, and the machine
    /// asks for input again.
    pub fn enter(&mut self, line: &str) {
        match self.wait {
            Wait::Debug => {
                // The suspend prompt re-arms stepping before each
                // command; only `c` clears it.
                self.stepping = true;
                match line.parse::<Command>() {
                    Ok(command) => {
                        if self.command(command) {
                            self.wait = Wait::None;
                            self.resumed = true;
                        }
                    }
                    Err(_) => self.echo("Unknown command."),
                }
            }
            Wait::Input => {
                if self.debug && line.starts_with(SIGIL) {
                    match line[SIGIL.len_utf8()..].parse::<Command>() {
                        Ok(command) => {
                            self.command(command);
                        }
                        Err(_) => self.echo("Unknown command."),
                    }
                } else {
                    self.input.extend(line.bytes());
                    self.input.push_back(b'\n');
                    self.wait = Wait::None;
                    // The rewound `in` already passed its breakpoint
                    // and step check; don't run it again.
                    self.resumed = true;
                }
            }
            Wait::None => {}
        }
    }

    /// Mark the input source closed. A subsequent `in` with nothing
    /// buffered faults with `InputExhausted`.
    pub fn close_input(&mut self) {
        self.input_closed = true;
        if self.wait == Wait::Input {
            self.wait = Wait::None;
            self.resumed = true;
        }
    }

    /// Deliver `event`, flushing buffered output first if there is any.
    fn suspend(&mut self, event: Event) -> Event {
        if self.output.is_empty() {
            event
        } else {
            self.pending = Some(event);
            Event::Print(std::mem::take(&mut self.output))
        }
    }

    fn echo<S: AsRef<str>>(&mut self, message: S) {
        self.output.extend_from_slice(b"DEBUG: ");
        self.output.extend_from_slice(message.as_ref().as_bytes());
        self.output.push(b'\n');
    }

    /// Apply one debugger command. Returns true if execution should
    /// resume.
    fn command(&mut self, command: Command) -> bool {
        match command {
            Command::Continue => {
                self.stepping = false;
                return true;
            }
            Command::Next => return true,
            Command::Step(on) => {
                self.stepping = on;
                self.echo(if on { "stepping on" } else { "stepping off" });
            }
            Command::Quit => {
                self.echo("Quitting.");
                self.state = State::Halted;
            }
            Command::Dump(path) => {
                self.echo(format!("Dumping state to {}", path));
                self.dump_request = Some(path);
            }
            Command::ShowRegister { index, hex } => match self.regs.get(index) {
                Some(value) if hex => self.echo(format!("Register r{} = {:#x}", index, value)),
                Some(value) => self.echo(format!("Register r{} = {}", index, value)),
                None => self.echo("No such register."),
            },
            Command::ShowRegisters => {
                let regs = self
                    .regs
                    .iter()
                    .enumerate()
                    .map(|(index, value)| format!("r{} = {:#x}", index, value))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.echo(format!("Registers: {}", regs));
            }
            Command::ShowPc => self.echo(format!("Program Counter = {:#x}", self.cpc)),
            Command::SetRegister { index, value } => {
                if index < word::REGISTERS {
                    self.echo(format!("Setting register {} = {:#x}", index, value));
                    self.regs[index] = value;
                } else {
                    self.echo("No such register.");
                }
            }
            Command::SetPc(addr) => {
                self.echo("Setting program counter.");
                self.pc = addr;
                self.cpc = addr;
            }
            Command::Break(addr) => {
                self.echo(format!("Setting breakpoint at {:#x}", addr));
                self.breakpoints.insert(addr);
            }
        }
        false
    }

    fn fetch(&mut self) -> Word {
        let word = self.memory.load(self.pc);
        self.pc += 1;
        word
    }

    fn fetch_2(&mut self) -> (Word, Word) {
        (self.fetch(), self.fetch())
    }

    fn fetch_3(&mut self) -> (Word, Word, Word) {
        (self.fetch(), self.fetch(), self.fetch())
    }

    /// Resolve a raw word: a number is itself, a register reference is
    /// the register's contents.
    fn val(&self, word: Word) -> Result<Word> {
        if word::is_number(word) {
            Ok(word)
        } else if word::is_register(word) {
            Ok(self.regs[word::to_register(word)])
        } else {
            Err(Error::InvalidOperand(word))
        }
    }

    /// Store through a destination operand, which must be a register
    /// reference; destinations are never literal numbers.
    fn set_reg(&mut self, word: Word, value: Word) -> Result<()> {
        if word::is_register(word) {
            self.regs[word::to_register(word)] = value;
            Ok(())
        } else {
            Err(Error::InvalidOperand(word))
        }
    }

    /// Fetch three operands, resolve the sources, store the result of
    /// `f` through the destination.
    fn binary<F: FnOnce(Word, Word) -> Result<Word>>(&mut self, f: F) -> Result<()> {
        let (a, b, c) = self.fetch_3();
        let b = self.val(b)?;
        let c = self.val(c)?;
        let value = f(b, c)?;
        self.set_reg(a, value)
    }

    /// One fetch-decode-execute cycle.
    fn step(&mut self) -> Result<()> {
        let opcode = Opcode::try_from(self.memory.load(self.pc))?;
        self.pc += 1;
        match opcode {
            Opcode::Halt => self.state = State::Halted,
            Opcode::Set => {
                let (a, b) = self.fetch_2();
                let value = self.val(b)?;
                self.set_reg(a, value)?;
            }
            Opcode::Push => {
                let a = self.fetch();
                let value = self.val(a)?;
                self.stack.push(value);
            }
            Opcode::Pop => {
                let a = self.fetch();
                let value = self.stack.pop()?;
                self.set_reg(a, value)?;
            }
            Opcode::Eq => self.binary(|b, c| Ok((b == c) as Word))?,
            Opcode::Gt => self.binary(|b, c| Ok((b > c) as Word))?,
            Opcode::Jmp => {
                let a = self.fetch();
                self.pc = self.val(a)? as Address;
            }
            Opcode::Jt => {
                let (a, b) = self.fetch_2();
                if self.val(a)? != 0 {
                    self.pc = self.val(b)? as Address;
                }
            }
            Opcode::Jf => {
                let (a, b) = self.fetch_2();
                if self.val(a)? == 0 {
                    self.pc = self.val(b)? as Address;
                }
            }
            Opcode::Add => {
                self.binary(|b, c| Ok(((b as u32 + c as u32) % word::MODULUS as u32) as Word))?
            }
            Opcode::Mult => {
                self.binary(|b, c| Ok((b as u32 * c as u32 % word::MODULUS as u32) as Word))?
            }
            Opcode::Mod => self.binary(|b, c| {
                if c == 0 {
                    Err(Error::DivisionByZero)
                } else {
                    Ok(b % c)
                }
            })?,
            Opcode::And => self.binary(|b, c| Ok(b & c))?,
            Opcode::Or => self.binary(|b, c| Ok(b | c))?,
            Opcode::Not => {
                let (a, b) = self.fetch_2();
                let value = word::low15(!self.val(b)?);
                self.set_reg(a, value)?;
            }
            Opcode::Rmem => {
                let (a, b) = self.fetch_2();
                let value = self.memory.load(self.val(b)? as Address);
                self.set_reg(a, value)?;
            }
            Opcode::Wmem => {
                let (a, b) = self.fetch_2();
                let addr = self.val(a)? as Address;
                let value = self.val(b)?;
                self.memory.store(addr, value);
            }
            Opcode::Call => {
                let a = self.fetch();
                let target = self.val(a)? as Address;
                self.stack.push(self.pc as Word);
                self.pc = target;
            }
            Opcode::Ret => {
                if self.stack.is_empty() {
                    // Returning with no caller is the program's natural
                    // exit, not an underflow.
                    self.state = State::Halted;
                } else {
                    self.pc = self.stack.pop()? as Address;
                }
            }
            Opcode::Out => {
                let a = self.fetch();
                let value = self.val(a)?;
                self.output.push((value & 0xff) as u8);
            }
            Opcode::In => {
                let a = self.fetch();
                match self.input.pop_front() {
                    Some(byte) => self.set_reg(a, byte as Word)?,
                    None if self.input_closed => return Err(Error::InputExhausted),
                    None => {
                        // Rewind so the `in` re-executes once a line
                        // arrives; the instruction stays atomic.
                        self.pc = self.cpc;
                        self.wait = Wait::Input;
                    }
                }
            }
            Opcode::Noop => {}
        }
        Ok(())
    }
}
