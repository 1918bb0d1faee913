//! Shared helpers for the process-level and in-process end-to-end tests:
//! a tiny assembler for the handful of instructions the scenarios need,
//! and an `InnerCore` stream writer matching the boot loader's format.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Directory-changing tests (anything that drives `files.*` or spawns
/// the real binary against a real `InnerCore`) serialize on this so two
/// tests never fight over the process's current directory at once.
pub static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Absolute path to the compiled `norebo` binary, set by Cargo for
/// integration tests.
pub fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_norebo"))
}

/// Encodes a register-family instruction. Bit layout mirrors
/// `inst_format::RegFields`/`FamilyBits`: `q=1` packs a 16-bit
/// immediate in the low half-word instead of a register `c`.
pub fn reg(a: u32, b: u32, op: u32, u: bool, q: bool, v: bool, c_or_im: u32) -> u32 {
    let mut ir = 0u32;
    ir |= a << 24;
    ir |= b << 20;
    ir |= op << 16;
    if q {
        ir |= 0x4000_0000;
        ir |= c_or_im & 0xFFFF;
    } else {
        ir |= c_or_im & 0xF;
    }
    if u {
        ir |= 0x2000_0000;
    }
    if v {
        ir |= 0x1000_0000;
    }
    ir
}

/// `MOV Ra, #imm` (zero-extended 16-bit immediate).
pub fn mov_imm(a: u32, imm: u16) -> u32 {
    reg(a, 0, 0, false, true, false, imm as u32)
}

/// Encodes a memory-family instruction: `p=1,q=0`, base register `b`,
/// a 20-bit signed offset, `u` selects store vs. load, `v` byte vs. word.
fn mem(a: u32, b: u32, u: bool, v: bool, off: i32) -> u32 {
    let mut ir = 0x8000_0000u32;
    ir |= a << 24;
    ir |= b << 20;
    ir |= (off as u32) & 0x000F_FFFF;
    if u {
        ir |= 0x2000_0000;
    }
    if v {
        ir |= 0x1000_0000;
    }
    ir
}

pub fn load_word(a: u32, b: u32, off: i32) -> u32 {
    mem(a, b, false, false, off)
}

pub fn store_word(a: u32, b: u32, off: i32) -> u32 {
    mem(a, b, true, false, off)
}

pub fn load_byte(a: u32, b: u32, off: i32) -> u32 {
    mem(a, b, false, true, off)
}

pub fn store_byte(a: u32, b: u32, off: i32) -> u32 {
    mem(a, b, true, true, off)
}

/// MMIO slot byte addresses (`-4 * slot`), matching `mmio::slot`.
pub const SYS_TRIGGER: i32 = -4;
pub const SYS_ARG0: i32 = -8;
pub const SYS_ARG1: i32 = -12;
pub const SYS_ARG2: i32 = -16;
pub const CONSOLE: i32 = -56;

pub const HALT: u32 = 1;
pub const ARGC: u32 = 2;
pub const ARGV: u32 = 3;
pub const TRAP: u32 = 4;
pub const FILES_NEW: u32 = 11;
pub const FILES_REGISTER: u32 = 13;
pub const FILES_WRITE: u32 = 18;

/// `R0` never changes (no instruction here writes it), so it serves as
/// the zero base register for every memory access below.
pub const ZERO: u32 = 0;

/// A guest program that halts immediately with the given exit code.
pub fn halt_program(code: u16) -> Vec<u32> {
    vec![
        mov_imm(1, code),
        store_word(1, ZERO, SYS_ARG0),
        mov_imm(2, HALT as u16),
        store_word(2, ZERO, SYS_TRIGGER),
    ]
}

/// Reads one byte from the console MMIO slot and writes it straight
/// back, then halts with code 0.
pub fn echo_program() -> Vec<u32> {
    vec![
        load_byte(1, ZERO, CONSOLE),
        store_byte(1, ZERO, CONSOLE),
        mov_imm(2, 0),
        store_word(2, ZERO, SYS_ARG0),
        mov_imm(3, HALT as u16),
        store_word(3, ZERO, SYS_TRIGGER),
    ]
}

/// Calls `argc`, then `argv(1, buf_addr, 16)`, then halts with the
/// argc count as its exit code. `buf_addr` must fit a 16-bit immediate.
pub fn argv_program(buf_addr: u16) -> Vec<u32> {
    vec![
        mov_imm(1, ARGC as u16),
        store_word(1, ZERO, SYS_TRIGGER),
        load_word(2, ZERO, SYS_TRIGGER), // R2 = argc result
        mov_imm(3, 1),
        store_word(3, ZERO, SYS_ARG0), // idx = 1
        mov_imm(4, buf_addr),
        store_word(4, ZERO, SYS_ARG1), // buf addr
        mov_imm(5, 16),
        store_word(5, ZERO, SYS_ARG2), // size
        mov_imm(6, ARGV as u16),
        store_word(6, ZERO, SYS_TRIGGER),
        store_word(2, ZERO, SYS_ARG0), // halt code = argc
        mov_imm(7, HALT as u16),
        store_word(7, ZERO, SYS_TRIGGER),
    ]
}

/// Triggers `Norebo.Trap(trap_code, name_addr, pos)`; the caller must
/// have already written the guest name bytes at `name_addr`.
pub fn trap_program(trap_code: u16, name_addr: u16, pos: u16) -> Vec<u32> {
    vec![
        mov_imm(1, trap_code),
        store_word(1, ZERO, SYS_ARG0),
        mov_imm(2, name_addr),
        store_word(2, ZERO, SYS_ARG1),
        mov_imm(3, pos),
        store_word(3, ZERO, SYS_ARG2),
        mov_imm(4, TRAP as u16),
        store_word(4, ZERO, SYS_TRIGGER),
    ]
}

/// `Files.New(name_addr) -> Files.Write(data_addr, len) ->
/// Files.Register`, then halts 0. The caller must have written the
/// guest name bytes at `name_addr` and the payload at `data_addr`.
pub fn file_publish_program(name_addr: u16, data_addr: u16, len: u16) -> Vec<u32> {
    vec![
        mov_imm(2, name_addr),
        store_word(2, ZERO, SYS_ARG0),
        mov_imm(3, FILES_NEW as u16),
        store_word(3, ZERO, SYS_TRIGGER),
        load_word(1, ZERO, SYS_TRIGGER), // R1 = handle
        store_word(1, ZERO, SYS_ARG0),
        mov_imm(4, data_addr),
        store_word(4, ZERO, SYS_ARG1),
        mov_imm(5, len),
        store_word(5, ZERO, SYS_ARG2),
        mov_imm(6, FILES_WRITE as u16),
        store_word(6, ZERO, SYS_TRIGGER),
        store_word(1, ZERO, SYS_ARG0),
        mov_imm(7, FILES_REGISTER as u16),
        store_word(7, ZERO, SYS_TRIGGER),
        mov_imm(8, 0),
        store_word(8, ZERO, SYS_ARG0),
        mov_imm(9, HALT as u16),
        store_word(9, ZERO, SYS_TRIGGER),
    ]
}

/// Writes an `InnerCore` relocation stream placing `program` at
/// address 0, terminated per the boot loader's format (`size=0` word).
pub fn write_inner_core(dir: &Path, program: &[u32]) {
    let mut bytes = Vec::new();
    let code: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
    bytes.extend_from_slice(&(code.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes()); // addr 0
    bytes.extend_from_slice(&code);
    bytes.extend_from_slice(&0u32.to_le_bytes()); // terminator
    std::fs::write(dir.join("InnerCore"), bytes).unwrap();
}

/// Pads `s` into a `norebo::name::NAME_LENGTH`-byte guest name buffer
/// (NUL-terminated, zero-padded).
pub fn name_buf(s: &str) -> [u8; norebo::name::NAME_LENGTH] {
    let mut buf = [0u8; norebo::name::NAME_LENGTH];
    buf[..s.len()].copy_from_slice(s.as_bytes());
    buf
}
