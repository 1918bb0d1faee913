use norebo::boot;
use norebo::cpu::Cpu;
use norebo::error::{EmuError, Stop};
use norebo::machine::Machine;
use norebo::memory::{MEM_BYTES, MEM_SIZE_ADDR, STACK_ORG, STACK_ORG_ADDR};
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    match run(argv) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("norebo: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(argv: Vec<String>) -> Result<ExitCode, EmuError> {
    let mut machine = Machine::new(argv);
    boot::load_inner_core(machine.ram_mut())?;
    machine.ram_mut().write_word(MEM_SIZE_ADDR, MEM_BYTES)?;
    machine.ram_mut().write_word(STACK_ORG_ADDR, STACK_ORG)?;

    let mut cpu = Cpu::new();
    cpu.regs.set(12, 0x20);
    cpu.regs.set(14, STACK_ORG);
    log::info!("booted: entering run loop at PC=0");

    let stop = cpu.run(&mut machine)?;
    std::io::stdout().flush().ok();
    Ok(match stop {
        Stop::Halt { code } => ExitCode::from((code & 0xFF) as u8),
        Stop::Trap { code, message } => {
            eprintln!("norebo: trap: {message}");
            ExitCode::from(((100 + code) & 0xFF) as u8)
        }
    })
}
