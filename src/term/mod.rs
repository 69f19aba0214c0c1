/*!
## Console front-end

Owns the terminal, signal handling, and file I/O for one machine. The
machine itself never blocks; this module pumps [`Machine::execute`] and
services each [`Event`]: printing output, reading program input and
debugger commands, writing snapshot dumps, and turning a Ctrl-C into a
best-effort snapshot-and-exit.
*/

use crate::mach::{image, Error, Event, Machine, Snapshot};
use ansi_term::Style;
use linefeed::{DefaultTerminal, Interface, ReadResult, Signal};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Instructions per console-service burst.
const BURST: usize = 5000;

pub struct Options {
    pub image: String,
    pub debug: bool,
    pub resume: bool,
    pub dump_on_interrupt: bool,
}

impl Options {
    /// Parse the command line: `[-s -d -g] IMAGEFILE`.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Options, String> {
        let program = args.first().map(|s| s.as_ref()).unwrap_or("vm16");
        let usage = format!("Usage: {} [-s -d -g] IMAGEFILE", program);
        let mut options = Options {
            image: String::new(),
            debug: false,
            resume: false,
            dump_on_interrupt: true,
        };
        for arg in args.iter().skip(1).map(|s| s.as_ref()) {
            match arg {
                "-g" => options.debug = true,
                "-s" => options.resume = true,
                "-d" => options.dump_on_interrupt = false,
                _ if arg.starts_with('-') => {
                    return Err(format!("Unknown option '{}'.\n{}", arg, usage))
                }
                _ if options.image.is_empty() => options.image = arg.to_string(),
                _ => return Err(usage),
            }
        }
        if options.image.is_empty() {
            return Err(usage);
        }
        Ok(options)
    }
}

/// Run a whole session. Returns the process exit code: 0 on a normal
/// halt, non-zero on a load failure or machine fault.
pub fn main(options: Options) -> i32 {
    let machine = match load(&options) {
        Ok(machine) => machine,
        Err(error) => {
            eprintln!("{}", Style::new().bold().paint(error.to_string()));
            return 1;
        }
    };
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .is_err()
    {
        eprintln!("Error setting Ctrl-C handler");
    }
    match main_loop(machine, &options, interrupted) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error);
            1
        }
    }
}

/// Dual-mode load: a bare image is the whole stream; a resumed session
/// has the snapshot header in front of the same stream.
fn load(options: &Options) -> Result<Machine, Error> {
    let mut reader = BufReader::new(File::open(&options.image)?);
    let mut machine = if options.resume {
        Machine::resume(Snapshot::read_from(&mut reader)?)
    } else {
        Machine::new(image::read_words(&mut reader)?)
    };
    if options.debug {
        machine.enable_debug();
    }
    Ok(machine)
}

fn main_loop(
    mut machine: Machine,
    options: &Options,
    interrupted: Arc<AtomicBool>,
) -> std::io::Result<i32> {
    let console = Interface::new("vm16")?;
    console.set_report_signal(Signal::Interrupt, true);
    loop {
        if interrupted.load(Ordering::SeqCst) {
            interrupted.store(false, Ordering::SeqCst);
            return interrupt(&machine, options, &console);
        }
        match machine.execute(BURST) {
            Event::Running => {}
            Event::Print(bytes) => {
                // Raw bytes, not text; programs may emit the full 0-255
                // range and it must reach stdout unre-encoded.
                let mut stdout = std::io::stdout();
                stdout.write_all(&bytes)?;
                stdout.flush()?;
            }
            event @ (Event::Input | Event::Debug) => {
                let debugging = matches!(event, Event::Debug);
                console.set_prompt(if debugging { "DEBUG: " } else { "" })?;
                match console.read_line()? {
                    ReadResult::Input(line) => {
                        machine.enter(&line);
                        if !line.is_empty() {
                            console.add_history_unique(line);
                        }
                    }
                    ReadResult::Eof => {
                        if debugging {
                            return Ok(0);
                        }
                        machine.close_input();
                    }
                    ReadResult::Signal(_) => {
                        return interrupt(&machine, options, &console);
                    }
                }
            }
            Event::Save(path) => {
                if let Err(error) = dump(&machine, &path) {
                    console.write_fmt(format_args!(
                        "{}\n",
                        Style::new().bold().paint(error.to_string())
                    ))?;
                }
            }
            Event::Stopped => {
                console.write_fmt(format_args!("\n"))?;
                return Ok(0);
            }
            Event::Error(error) => {
                console.write_fmt(format_args!(
                    "{}\n",
                    Style::new().bold().paint(error.to_string())
                ))?;
                return Ok(1);
            }
        }
    }
}

/// Best-effort snapshot-and-exit on Ctrl-C.
fn interrupt(
    machine: &Machine,
    options: &Options,
    console: &Interface<DefaultTerminal>,
) -> std::io::Result<i32> {
    if !options.dump_on_interrupt {
        console.write_fmt(format_args!("\nInterrupted.\n"))?;
        return Ok(0);
    }
    let path = format!("{}.dump", options.image);
    match dump(machine, &path) {
        Ok(()) => {
            console.write_fmt(format_args!("\nInterrupted; state saved to {}\n", path))?;
            Ok(0)
        }
        Err(error) => {
            console.write_fmt(format_args!(
                "{}\n",
                Style::new().bold().paint(error.to_string())
            ))?;
            Ok(1)
        }
    }
}

fn dump(machine: &Machine, path: &str) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    machine.snapshot().write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}
