use std::process::exit;
use vm16::term;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    match term::Options::parse(&args) {
        Ok(options) => exit(term::main(options)),
        Err(message) => {
            eprintln!("{}", message);
            exit(1);
        }
    }
}
