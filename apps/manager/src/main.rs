use std::process::ExitCode;
use tessera_logger::{ConsoleStream, LevelFilter, Logger};

fn main() -> anyhow::Result<ExitCode> {
    let _log = Logger::builder()
        .name(tessera_manager::PROGRAM)
        .console_stream(ConsoleStream::Stderr)
        .level(LevelFilter::WARN)
        .init()?;

    let root_dir = std::env::current_dir()?;
    tessera_manager::run(std::env::args_os(), &root_dir)
}
