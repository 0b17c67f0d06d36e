use std::process::ExitCode;

fn main() -> ExitCode {
    dirtrends::main(dirtrends::Mode::Email)
}
