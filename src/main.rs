use std::process;

use schedule_ir::cli::{init_logger, parse_args, run_command, ParseArgsResult};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = match parse_args(&args) {
        Ok(ParseArgsResult::Help(text)) => {
            print!("{}", text);
            process::exit(0);
        }
        Ok(ParseArgsResult::Args(cli)) => cli,
        Err(msg) => {
            eprint!("{}", msg);
            process::exit(2);
        }
    };

    init_logger(cli.verbose);

    let output = match run_command(&cli.command) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error[{}]: {}", e.diagnostic_code(), e);
            process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, output) {
                eprintln!("error: could not write '{}': {}", path.display(), e);
                process::exit(1);
            }
        }
        None => print!("{}", output),
    }
}
