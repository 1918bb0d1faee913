use crate::bus::Bus;
use crate::error::{EmuError, Stop};
use crate::fpu;
use crate::inst_format::{BranchFields, FamilyBits, MemFields, RegFields};
use crate::pc::ProgramCounter;
use crate::regs::Registers;

/// The 16 opcodes of the register family, in the same order as the
/// reference RISC's `enum { MOV, LSL, ... FDV }` so the numeric value of
/// each variant matches the `op` field directly.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RegOp {
    Mov,
    Lsl,
    Asr,
    Ror,
    And,
    Ann,
    Ior,
    Xor,
    Add,
    Sub,
    Mul,
    Div,
    Fad,
    Fsb,
    Fml,
    Fdv,
}

impl RegOp {
    fn from_bits(op: u32) -> Self {
        match op {
            0 => RegOp::Mov,
            1 => RegOp::Lsl,
            2 => RegOp::Asr,
            3 => RegOp::Ror,
            4 => RegOp::And,
            5 => RegOp::Ann,
            6 => RegOp::Ior,
            7 => RegOp::Xor,
            8 => RegOp::Add,
            9 => RegOp::Sub,
            10 => RegOp::Mul,
            11 => RegOp::Div,
            12 => RegOp::Fad,
            13 => RegOp::Fsb,
            14 => RegOp::Fml,
            _ => RegOp::Fdv,
        }
    }
}

pub enum Inst {
    Reg {
        op: RegOp,
        fields: RegFields,
        family: FamilyBits,
    },
    Mem {
        fields: MemFields,
        family: FamilyBits,
    },
    Branch {
        fields: BranchFields,
        family: FamilyBits,
    },
}

impl Inst {
    pub fn decode(ir: u32) -> Inst {
        let family = FamilyBits::new(ir);
        if !family.p {
            let fields = RegFields::new(ir);
            let op = RegOp::from_bits(fields.op);
            Inst::Reg { op, fields, family }
        } else if !family.q {
            Inst::Mem {
                fields: MemFields::new(ir),
                family,
            }
        } else {
            Inst::Branch {
                fields: BranchFields::new(ir),
                family,
            }
        }
    }

    pub fn execute<B: Bus>(
        self,
        regs: &mut Registers,
        pc: &mut ProgramCounter,
        bus: &mut B,
    ) -> Result<Option<Stop>, EmuError> {
        match self {
            Inst::Reg { op, fields, family } => {
                exec_reg(op, &fields, &family, regs);
                Ok(None)
            }
            Inst::Mem { fields, family } => exec_mem(&fields, &family, regs, bus),
            Inst::Branch { fields, family } => {
                exec_branch(&fields, &family, regs, pc);
                Ok(None)
            }
        }
    }
}

fn c_val(fields: &RegFields, family: &FamilyBits, regs: &Registers) -> u32 {
    if !family.q {
        regs.read(fields.c)
    } else if !family.v {
        fields.im
    } else {
        0xFFFF_0000 | fields.im
    }
}

fn exec_reg(op: RegOp, fields: &RegFields, family: &FamilyBits, regs: &mut Registers) {
    let b_val = regs.read(fields.b);
    let c_val = c_val(fields, family, regs);

    let result = match op {
        RegOp::Mov => {
            if !family.u {
                c_val
            } else if family.q {
                c_val << 16
            } else if family.v {
                regs.flags_word()
            } else {
                regs.h
            }
        }
        RegOp::Lsl => b_val << (c_val & 31),
        RegOp::Asr => ((b_val as i32) >> (c_val & 31)) as u32,
        RegOp::Ror => b_val.rotate_right(c_val & 31),
        RegOp::And => b_val & c_val,
        RegOp::Ann => b_val & !c_val,
        RegOp::Ior => b_val | c_val,
        RegOp::Xor => b_val ^ c_val,
        RegOp::Add => {
            let mut r = b_val.wrapping_add(c_val);
            if family.u {
                r = r.wrapping_add(regs.c as u32);
            }
            regs.c = r < b_val;
            regs.v = ((r ^ c_val) & (r ^ b_val)) >> 31 != 0;
            r
        }
        RegOp::Sub => {
            let mut r = b_val.wrapping_sub(c_val);
            if family.u {
                r = r.wrapping_sub(regs.c as u32);
            }
            regs.c = r > b_val;
            regs.v = ((b_val ^ c_val) & (r ^ b_val)) >> 31 != 0;
            r
        }
        RegOp::Mul => {
            let product: u64 = if !family.u {
                ((b_val as i32 as i64) * (c_val as i32 as i64)) as u64
            } else {
                b_val as u64 * c_val as u64
            };
            regs.h = (product >> 32) as u32;
            product as u32
        }
        RegOp::Div => {
            if (c_val as i32) > 0 {
                if !family.u {
                    let mut q = (b_val as i32).wrapping_div(c_val as i32);
                    let mut r = (b_val as i32).wrapping_rem(c_val as i32);
                    if r < 0 {
                        q -= 1;
                        r += c_val as i32;
                    }
                    regs.h = r as u32;
                    q as u32
                } else {
                    regs.h = b_val % c_val;
                    b_val / c_val
                }
            } else {
                let d = fpu::idiv(b_val, c_val, family.u);
                regs.h = d.remainder;
                d.quotient
            }
        }
        RegOp::Fad => fpu::fp_add(b_val, c_val, family.u, family.v),
        RegOp::Fsb => fpu::fp_add(b_val, c_val ^ 0x8000_0000, family.u, family.v),
        RegOp::Fml => fpu::fp_mul(b_val, c_val),
        RegOp::Fdv => fpu::fp_div(b_val, c_val),
    };
    regs.set(fields.a, result);
}

fn exec_mem<B: Bus>(
    fields: &MemFields,
    family: &FamilyBits,
    regs: &mut Registers,
    bus: &mut B,
) -> Result<Option<Stop>, EmuError> {
    let ea = regs.read(fields.b).wrapping_add(fields.off as u32);
    if !family.u {
        let val = if !family.v {
            bus.read_word(ea)?
        } else {
            bus.read_byte(ea)?
        };
        regs.set(fields.a, val);
        Ok(None)
    } else {
        let val = regs.read(fields.a);
        if !family.v {
            bus.write_word(ea, val)
        } else {
            bus.write_byte(ea, val & 0xFF)
        }
    }
}

fn branch_taken(fields: &BranchFields, regs: &Registers) -> bool {
    let primitive = match fields.cond {
        0 => regs.n,
        1 => regs.z,
        2 => regs.c,
        3 => regs.v,
        4 => regs.c || regs.z,
        5 => regs.n ^ regs.v,
        6 => (regs.n ^ regs.v) || regs.z,
        _ => true,
    };
    fields.t_in ^ primitive
}

fn exec_branch(fields: &BranchFields, family: &FamilyBits, regs: &mut Registers, pc: &mut ProgramCounter) {
    if !branch_taken(fields, regs) {
        return;
    }
    if family.v {
        regs.set(15, pc.get().wrapping_mul(4));
    }
    if !family.u {
        pc.set(regs.read(fields.c) / 4);
    } else {
        pc.set(pc.get().wrapping_add(fields.off as u32));
    }
}
