//! Static opcode tables.
//!
//! Both tables are built at compile time from the x/y/z/p/q layout of the
//! SM83 encoding. A `None` entry marks an opcode the hardware does not
//! define; fetching one locks the CPU.

use std::fmt;

use super::Reg;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    Always,
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

/// Source or destination of an 8-bit transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    /// Memory addressed by a register pair.
    Mem(Reg),
    /// (HL+)
    MemHlInc,
    /// (HL-)
    MemHlDec,
    Imm8,
    /// (0xFF00 + n)
    HighImm,
    /// (0xFF00 + C)
    HighC,
    /// (nn)
    Abs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Nop,
    Ld8(Operand, Operand),
    Ld16Imm(Reg),
    LdAbsSp,
    LdSpHl,
    LdHlSpOffset,
    Push(Reg),
    Pop(Reg),
    Alu(AluOp, Operand),
    Inc8(Operand),
    Dec8(Operand),
    Inc16(Reg),
    Dec16(Reg),
    AddHl(Reg),
    AddSpOffset,
    /// RLCA/RRCA/RLA/RRA: like the 0xCB forms on A but Z is always cleared.
    RotateA(RotOp),
    Daa,
    Cpl,
    Scf,
    Ccf,
    Jp(Cond),
    JpHl,
    Jr(Cond),
    Call(Cond),
    Ret(Cond),
    Reti,
    Rst(u8),
    Di,
    Ei,
    Halt,
    Stop,
    Prefix,
    Rot(RotOp, Operand),
    Bit(u8, Operand),
    Res(u8, Operand),
    Set(u8, Operand),
}

/// One decoded table entry.
///
/// `cycles` is the cost when a conditional branch is not taken (or the only
/// cost); `branch_cycles` is the cost when it is. Extended entries carry the
/// full cost including the 0xCB prefix fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub op: Op,
    pub cycles: u8,
    pub branch_cycles: u8,
}

impl Opcode {
    const fn new(op: Op, cycles: u8) -> Self {
        Self {
            op,
            cycles,
            branch_cycles: cycles,
        }
    }

    const fn branch(op: Op, cycles: u8, branch_cycles: u8) -> Self {
        Self {
            op,
            cycles,
            branch_cycles,
        }
    }

    /// Assembly mnemonic, e.g. `LD A,(HL+)`.
    pub fn mnemonic(&self) -> String {
        self.op.to_string()
    }
}

pub static PRIMARY: [Option<Opcode>; 256] = build_primary();
pub static EXTENDED: [Option<Opcode>; 256] = build_extended();

const R8: [Operand; 8] = [
    Operand::Reg(Reg::B),
    Operand::Reg(Reg::C),
    Operand::Reg(Reg::D),
    Operand::Reg(Reg::E),
    Operand::Reg(Reg::H),
    Operand::Reg(Reg::L),
    Operand::Mem(Reg::HL),
    Operand::Reg(Reg::A),
];
const RP: [Reg; 4] = [Reg::BC, Reg::DE, Reg::HL, Reg::SP];
const RP2: [Reg; 4] = [Reg::BC, Reg::DE, Reg::HL, Reg::AF];
const CC: [Cond; 4] = [Cond::NotZero, Cond::Zero, Cond::NotCarry, Cond::Carry];
const ALU: [AluOp; 8] = [
    AluOp::Add,
    AluOp::Adc,
    AluOp::Sub,
    AluOp::Sbc,
    AluOp::And,
    AluOp::Xor,
    AluOp::Or,
    AluOp::Cp,
];
const ROT: [RotOp; 8] = [
    RotOp::Rlc,
    RotOp::Rrc,
    RotOp::Rl,
    RotOp::Rr,
    RotOp::Sla,
    RotOp::Sra,
    RotOp::Swap,
    RotOp::Srl,
];

const fn build_primary() -> [Option<Opcode>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = decode_primary(i as u8);
        i += 1;
    }
    table
}

const fn build_extended() -> [Option<Opcode>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = Some(decode_extended(i as u8));
        i += 1;
    }
    table
}

/// Cost of an 8-bit operand slot: (HL) adds a memory access.
const fn r8_cost(z: usize, reg: u8, mem: u8) -> u8 {
    if z == 6 {
        mem
    } else {
        reg
    }
}

const fn decode_primary(opcode: u8) -> Option<Opcode> {
    let x = (opcode >> 6) as usize;
    let y = ((opcode >> 3) & 0x07) as usize;
    let z = (opcode & 0x07) as usize;
    let p = y >> 1;
    let q = y & 1;

    let entry = match x {
        0 => match z {
            0 => match y {
                0 => Opcode::new(Op::Nop, 4),
                1 => Opcode::new(Op::LdAbsSp, 20),
                2 => Opcode::new(Op::Stop, 4),
                3 => Opcode::new(Op::Jr(Cond::Always), 12),
                _ => Opcode::branch(Op::Jr(CC[y - 4]), 8, 12),
            },
            1 => {
                if q == 0 {
                    Opcode::new(Op::Ld16Imm(RP[p]), 12)
                } else {
                    Opcode::new(Op::AddHl(RP[p]), 8)
                }
            }
            2 => {
                let mem = match p {
                    0 => Operand::Mem(Reg::BC),
                    1 => Operand::Mem(Reg::DE),
                    2 => Operand::MemHlInc,
                    _ => Operand::MemHlDec,
                };
                if q == 0 {
                    Opcode::new(Op::Ld8(mem, Operand::Reg(Reg::A)), 8)
                } else {
                    Opcode::new(Op::Ld8(Operand::Reg(Reg::A), mem), 8)
                }
            }
            3 => {
                if q == 0 {
                    Opcode::new(Op::Inc16(RP[p]), 8)
                } else {
                    Opcode::new(Op::Dec16(RP[p]), 8)
                }
            }
            4 => Opcode::new(Op::Inc8(R8[y]), r8_cost(y, 4, 12)),
            5 => Opcode::new(Op::Dec8(R8[y]), r8_cost(y, 4, 12)),
            6 => Opcode::new(Op::Ld8(R8[y], Operand::Imm8), r8_cost(y, 8, 12)),
            _ => match y {
                0..=3 => Opcode::new(Op::RotateA(ROT[y]), 4),
                4 => Opcode::new(Op::Daa, 4),
                5 => Opcode::new(Op::Cpl, 4),
                6 => Opcode::new(Op::Scf, 4),
                _ => Opcode::new(Op::Ccf, 4),
            },
        },
        1 => {
            if opcode == 0x76 {
                Opcode::new(Op::Halt, 4)
            } else if y == 6 || z == 6 {
                Opcode::new(Op::Ld8(R8[y], R8[z]), 8)
            } else {
                Opcode::new(Op::Ld8(R8[y], R8[z]), 4)
            }
        }
        2 => Opcode::new(Op::Alu(ALU[y], R8[z]), r8_cost(z, 4, 8)),
        _ => match z {
            0 => match y {
                0..=3 => Opcode::branch(Op::Ret(CC[y]), 8, 20),
                4 => Opcode::new(Op::Ld8(Operand::HighImm, Operand::Reg(Reg::A)), 12),
                5 => Opcode::new(Op::AddSpOffset, 16),
                6 => Opcode::new(Op::Ld8(Operand::Reg(Reg::A), Operand::HighImm), 12),
                _ => Opcode::new(Op::LdHlSpOffset, 12),
            },
            1 => {
                if q == 0 {
                    Opcode::new(Op::Pop(RP2[p]), 12)
                } else {
                    match p {
                        0 => Opcode::new(Op::Ret(Cond::Always), 16),
                        1 => Opcode::new(Op::Reti, 16),
                        2 => Opcode::new(Op::JpHl, 4),
                        _ => Opcode::new(Op::LdSpHl, 8),
                    }
                }
            }
            2 => match y {
                0..=3 => Opcode::branch(Op::Jp(CC[y]), 12, 16),
                4 => Opcode::new(Op::Ld8(Operand::HighC, Operand::Reg(Reg::A)), 8),
                5 => Opcode::new(Op::Ld8(Operand::Abs, Operand::Reg(Reg::A)), 16),
                6 => Opcode::new(Op::Ld8(Operand::Reg(Reg::A), Operand::HighC), 8),
                _ => Opcode::new(Op::Ld8(Operand::Reg(Reg::A), Operand::Abs), 16),
            },
            3 => match y {
                0 => Opcode::new(Op::Jp(Cond::Always), 16),
                1 => Opcode::new(Op::Prefix, 4),
                6 => Opcode::new(Op::Di, 4),
                7 => Opcode::new(Op::Ei, 4),
                _ => return None,
            },
            4 => {
                if y < 4 {
                    Opcode::branch(Op::Call(CC[y]), 12, 24)
                } else {
                    return None;
                }
            }
            5 => {
                if q == 0 {
                    Opcode::new(Op::Push(RP2[p]), 16)
                } else if p == 0 {
                    Opcode::new(Op::Call(Cond::Always), 24)
                } else {
                    return None;
                }
            }
            6 => Opcode::new(Op::Alu(ALU[y], Operand::Imm8), 8),
            _ => Opcode::new(Op::Rst((y as u8) * 8), 16),
        },
    };
    Some(entry)
}

const fn decode_extended(opcode: u8) -> Opcode {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = (opcode & 0x07) as usize;
    let target = R8[z];

    match x {
        0 => Opcode::new(Op::Rot(ROT[y as usize], target), r8_cost(z, 8, 16)),
        1 => Opcode::new(Op::Bit(y, target), r8_cost(z, 8, 12)),
        2 => Opcode::new(Op::Res(y, target), r8_cost(z, 8, 16)),
        _ => Opcode::new(Op::Set(y, target), r8_cost(z, 8, 16)),
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cond::Always => "",
            Cond::NotZero => "NZ",
            Cond::Zero => "Z",
            Cond::NotCarry => "NC",
            Cond::Carry => "C",
        })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => f.write_str(reg.name()),
            Operand::Mem(reg) => write!(f, "({})", reg.name()),
            Operand::MemHlInc => f.write_str("(HL+)"),
            Operand::MemHlDec => f.write_str("(HL-)"),
            Operand::Imm8 => f.write_str("d8"),
            Operand::HighImm => f.write_str("(a8)"),
            Operand::HighC => f.write_str("(C)"),
            Operand::Abs => f.write_str("(a16)"),
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AluOp::Add => "ADD A,",
            AluOp::Adc => "ADC A,",
            AluOp::Sub => "SUB ",
            AluOp::Sbc => "SBC A,",
            AluOp::And => "AND ",
            AluOp::Xor => "XOR ",
            AluOp::Or => "OR ",
            AluOp::Cp => "CP ",
        })
    }
}

impl fmt::Display for RotOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RotOp::Rlc => "RLC",
            RotOp::Rrc => "RRC",
            RotOp::Rl => "RL",
            RotOp::Rr => "RR",
            RotOp::Sla => "SLA",
            RotOp::Sra => "SRA",
            RotOp::Swap => "SWAP",
            RotOp::Srl => "SRL",
        })
    }
}

fn with_cond(f: &mut fmt::Formatter<'_>, name: &str, cond: Cond, arg: &str) -> fmt::Result {
    match (cond, arg.is_empty()) {
        (Cond::Always, true) => f.write_str(name),
        (Cond::Always, false) => write!(f, "{name} {arg}"),
        (_, true) => write!(f, "{name} {cond}"),
        (_, false) => write!(f, "{name} {cond},{arg}"),
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Op::Nop => f.write_str("NOP"),
            Op::Ld8(dst, src) => write!(f, "LD {dst},{src}"),
            Op::Ld16Imm(reg) => write!(f, "LD {},d16", reg.name()),
            Op::LdAbsSp => f.write_str("LD (a16),SP"),
            Op::LdSpHl => f.write_str("LD SP,HL"),
            Op::LdHlSpOffset => f.write_str("LD HL,SP+r8"),
            Op::Push(reg) => write!(f, "PUSH {}", reg.name()),
            Op::Pop(reg) => write!(f, "POP {}", reg.name()),
            Op::Alu(op, src) => write!(f, "{op}{src}"),
            Op::Inc8(target) => write!(f, "INC {target}"),
            Op::Dec8(target) => write!(f, "DEC {target}"),
            Op::Inc16(reg) => write!(f, "INC {}", reg.name()),
            Op::Dec16(reg) => write!(f, "DEC {}", reg.name()),
            Op::AddHl(reg) => write!(f, "ADD HL,{}", reg.name()),
            Op::AddSpOffset => f.write_str("ADD SP,r8"),
            Op::RotateA(op) => write!(f, "{op}A"),
            Op::Daa => f.write_str("DAA"),
            Op::Cpl => f.write_str("CPL"),
            Op::Scf => f.write_str("SCF"),
            Op::Ccf => f.write_str("CCF"),
            Op::Jp(cond) => with_cond(f, "JP", cond, "a16"),
            Op::JpHl => f.write_str("JP HL"),
            Op::Jr(cond) => with_cond(f, "JR", cond, "r8"),
            Op::Call(cond) => with_cond(f, "CALL", cond, "a16"),
            Op::Ret(cond) => with_cond(f, "RET", cond, ""),
            Op::Reti => f.write_str("RETI"),
            Op::Rst(vector) => write!(f, "RST {vector:02X}H"),
            Op::Di => f.write_str("DI"),
            Op::Ei => f.write_str("EI"),
            Op::Halt => f.write_str("HALT"),
            Op::Stop => f.write_str("STOP"),
            Op::Prefix => f.write_str("PREFIX CB"),
            Op::Rot(op, target) => write!(f, "{op} {target}"),
            Op::Bit(bit, target) => write!(f, "BIT {bit},{target}"),
            Op::Res(bit, target) => write!(f, "RES {bit},{target}"),
            Op::Set(bit, target) => write!(f, "SET {bit},{target}"),
        }
    }
}
