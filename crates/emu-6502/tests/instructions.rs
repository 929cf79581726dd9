//! Functional tests for 6502/65C02 instruction behavior.

use emu_6502::{flags, Mos6502};
use emu_core::{Bus, SimpleBus};

/// Load a program at the given address and point PC there.
fn setup(bus: &mut SimpleBus, cpu: &mut Mos6502, address: u16, program: &[u8]) {
    bus.load(address, program);
    cpu.regs.pc = address;
}

/// Run `count` instructions, returning total cycles.
fn run(cpu: &mut Mos6502, bus: &mut SimpleBus, count: usize) -> u64 {
    (0..count).map(|_| cpu.step(bus)).sum()
}

#[test]
fn lda_sta_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDA #$42; STA $2000; LDA $2000
    setup(
        &mut bus,
        &mut cpu,
        0x0800,
        &[0xA9, 0x42, 0x8D, 0x00, 0x20, 0xAD, 0x00, 0x20],
    );
    run(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.regs.a, 0x42);
    assert_eq!(bus.peek(0x2000), 0x42);
}

#[test]
fn documented_cycle_counts() {
    let cases: &[(&[u8], u64)] = &[
        (&[0xA9, 0x01], 2),             // LDA #imm
        (&[0xA5, 0x10], 3),             // LDA zp
        (&[0xB5, 0x10], 4),             // LDA zp,X
        (&[0xAD, 0x00, 0x20], 4),       // LDA abs
        (&[0xBD, 0x00, 0x20], 4),       // LDA abs,X (no page penalty)
        (&[0xA1, 0x10], 6),             // LDA (zp,X)
        (&[0xB1, 0x10], 5),             // LDA (zp),Y
        (&[0x8D, 0x00, 0x20], 4),       // STA abs
        (&[0x9D, 0x00, 0x20], 5),       // STA abs,X
        (&[0x91, 0x10], 6),             // STA (zp),Y
        (&[0x69, 0x01], 2),             // ADC #imm
        (&[0xE6, 0x10], 5),             // INC zp
        (&[0xFE, 0x00, 0x20], 7),       // INC abs,X
        (&[0x4C, 0x00, 0x09], 3),       // JMP abs
        (&[0x6C, 0x00, 0x20], 5),       // JMP (abs)
        (&[0x20, 0x00, 0x09], 6),       // JSR
        (&[0xEA], 2),                   // NOP
        (&[0x0A], 2),                   // ASL A
        (&[0x0E, 0x00, 0x20], 6),       // ASL abs
        (&[0x48], 3),                   // PHA
        (&[0x68], 4),                   // PLA
    ];

    for (program, expected) in cases {
        let mut bus = SimpleBus::new();
        let mut cpu = Mos6502::new();
        setup(&mut bus, &mut cpu, 0x0800, program);
        let cycles = cpu.step(&mut bus);
        assert_eq!(
            cycles, *expected,
            "opcode ${:02X} charged {cycles} cycles, expected {expected}",
            program[0]
        );
    }
}

#[test]
fn every_step_advances_the_clock() {
    // Sweep all 256 opcodes from a fresh CPU; every one must charge at
    // least one cycle, including unknown encodings.
    for opcode in 0u16..=0xFF {
        let mut bus = SimpleBus::new();
        let mut cpu = Mos6502::new();
        setup(&mut bus, &mut cpu, 0x0800, &[opcode as u8, 0x00, 0x00]);
        let cycles = cpu.step(&mut bus);
        assert!(cycles > 0, "opcode ${opcode:02X} charged no cycles");
    }
}

#[test]
fn branch_taken_costs_one_extra_cycle() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // SEC; BCS +2 (taken); BCC +2 (not taken)
    setup(&mut bus, &mut cpu, 0x0800, &[0x38, 0xB0, 0x00, 0x90, 0x00]);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 3, "taken branch");
    assert_eq!(cpu.step(&mut bus), 2, "branch not taken");
}

#[test]
fn backward_branch_wraps_pc() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // BRA -4 from $0002 lands at $FFFE
    setup(&mut bus, &mut cpu, 0x0000, &[0x80, 0xFC]);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0xFFFE);
}

#[test]
fn decimal_adc() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // SED; CLC; LDA #$25; ADC #$17 => A = $42, C clear
    setup(
        &mut bus,
        &mut cpu,
        0x0800,
        &[0xF8, 0x18, 0xA9, 0x25, 0x69, 0x17, 0x08],
    );
    run(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.regs.a, 0x42);

    // PHP exposes the carry
    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x01FF) & flags::C, 0);
}

#[test]
fn decimal_adc_carry_out() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // SED; SEC; LDA #$99; ADC #$00 => A = $00, C set
    setup(
        &mut bus,
        &mut cpu,
        0x0800,
        &[0xF8, 0x38, 0xA9, 0x99, 0x69, 0x00, 0x08],
    );
    run(&mut cpu, &mut bus, 5);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(bus.peek(0x01FF) & flags::C, flags::C);
}

#[test]
fn decimal_sbc() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // SED; SEC; LDA #$42; SBC #$17 => A = $25, C set (no borrow)
    setup(
        &mut bus,
        &mut cpu,
        0x0800,
        &[0xF8, 0x38, 0xA9, 0x42, 0xE9, 0x17, 0x08],
    );
    run(&mut cpu, &mut bus, 5);
    assert_eq!(cpu.regs.a, 0x25);
    assert_eq!(bus.peek(0x01FF) & flags::C, flags::C);
}

#[test]
fn binary_adc_sweep_against_reference() {
    // Binary ADC over a grid of operands, both carry states.
    for a in (0u16..=0xFF).step_by(7) {
        for m in (0u16..=0xFF).step_by(11) {
            for carry_in in [0u16, 1] {
                let mut bus = SimpleBus::new();
                let mut cpu = Mos6502::new();
                let carry_op = if carry_in == 1 { 0x38 } else { 0x18 };
                setup(
                    &mut bus,
                    &mut cpu,
                    0x0800,
                    &[carry_op, 0xA9, a as u8, 0x69, m as u8, 0x08],
                );
                run(&mut cpu, &mut bus, 4);

                let expected = a + m + carry_in;
                assert_eq!(cpu.regs.a, (expected & 0xFF) as u8, "A for {a}+{m}+{carry_in}");
                let p = bus.peek(0x01FF);
                assert_eq!(p & flags::C != 0, expected > 0xFF, "C for {a}+{m}+{carry_in}");
                assert_eq!(
                    p & flags::Z != 0,
                    expected & 0xFF == 0,
                    "Z for {a}+{m}+{carry_in}"
                );
                assert_eq!(
                    p & flags::N != 0,
                    expected & 0x80 != 0,
                    "N for {a}+{m}+{carry_in}"
                );
            }
        }
    }
}

#[test]
fn adc_overflow_flag() {
    // 0x50 + 0x50 = 0xA0 overflows signed; 0x50 + 0x10 does not.
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    setup(&mut bus, &mut cpu, 0x0800, &[0x18, 0xA9, 0x50, 0x69, 0x50]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs.p & flags::V, flags::V);

    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    setup(&mut bus, &mut cpu, 0x0800, &[0x18, 0xA9, 0x50, 0x69, 0x10]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs.p & flags::V, 0);
}

#[test]
fn cmp_sets_carry_when_no_borrow() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDA #$40; CMP #$30 (A >= M: carry, not zero); PHP
    setup(&mut bus, &mut cpu, 0x0800, &[0xA9, 0x40, 0xC9, 0x30, 0x08]);
    run(&mut cpu, &mut bus, 3);
    let p = bus.peek(0x01FF);
    assert_eq!(p & flags::C, flags::C);
    assert_eq!(p & flags::Z, 0);

    // LDA #$30; CMP #$40 (A < M: borrow, negative result)
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    setup(&mut bus, &mut cpu, 0x0800, &[0xA9, 0x30, 0xC9, 0x40, 0x08]);
    run(&mut cpu, &mut bus, 3);
    let p = bus.peek(0x01FF);
    assert_eq!(p & flags::C, 0);
    assert_eq!(p & flags::N, flags::N);
}

#[test]
fn shifts_move_carry() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDA #$81; ASL A (C=1, A=$02); ROL A (A=$05, carry folded in)
    setup(&mut bus, &mut cpu, 0x0800, &[0xA9, 0x81, 0x0A, 0x2A]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs.a, 0x05);

    // LDA #$01; LSR A (C=1, A=0); ROR A (A=$80)
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    setup(&mut bus, &mut cpu, 0x0800, &[0xA9, 0x01, 0x4A, 0x6A]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.regs.a, 0x80);
}

#[test]
fn zero_page_indirect_pointer_wraps() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // Pointer at $FF: low byte at $FF, high byte wraps to $00
    bus.write(0x00FF, 0x34);
    bus.write(0x0000, 0x12);
    bus.write(0x1234, 0x99);

    // LDA ($FF) - 65C02 zero-page indirect
    setup(&mut bus, &mut cpu, 0x0800, &[0xB2, 0xFF]);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x99);
}

#[test]
fn php_pushes_break_and_unused_set() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    setup(&mut bus, &mut cpu, 0x0800, &[0x08]);
    cpu.step(&mut bus);
    let p = bus.peek(0x01FF);
    assert_eq!(p & flags::B, flags::B);
    assert_eq!(p & flags::U, flags::U);
}

#[test]
fn plp_restores_flags_for_branches() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // SEC; PHP; CLC; PLP; BCS +2 -- the pulled carry must drive the branch
    setup(
        &mut bus,
        &mut cpu,
        0x0800,
        &[0x38, 0x08, 0x18, 0x28, 0xB0, 0x00],
    );
    run(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.step(&mut bus), 3, "BCS must see the restored carry");
}

#[test]
fn brk_and_rti_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // BRK vector to $0900, where RTI returns immediately.
    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0x09);
    bus.write(0x0900, 0x40); // RTI

    setup(&mut bus, &mut cpu, 0x0800, &[0x00, 0xEA, 0xEA]);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0900);
    assert_eq!(cpu.regs.p & flags::I, flags::I);

    cpu.step(&mut bus);
    // BRK pushes the address of the byte after the opcode, so RTI
    // lands on the padding byte.
    assert_eq!(cpu.regs.pc, 0x0801);
}

#[test]
fn irq_is_deferred_while_i_set_and_replayed_on_cli() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    bus.write(0xFFFE, 0x00);
    bus.write(0xFFFF, 0x09);
    bus.write(0x0900, 0xEA); // NOP in the handler

    // SEI; NOP; CLI; NOP
    setup(&mut bus, &mut cpu, 0x0800, &[0x78, 0xEA, 0x58, 0xEA]);
    cpu.step(&mut bus); // SEI

    cpu.assert_irq();
    cpu.step(&mut bus); // NOP - IRQ queued, not taken
    assert_ne!(cpu.regs.pc, 0x0900);

    cpu.step(&mut bus); // CLI - re-asserts the queued IRQ
    cpu.step(&mut bus); // interrupt entry happens before this NOP
    assert_eq!(cpu.regs.pc, 0x0901, "queued IRQ must fire after CLI");
}

#[test]
fn nmi_fires_regardless_of_i() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    bus.write(0xFFFA, 0x00);
    bus.write(0xFFFB, 0x0A);
    bus.write(0x0A00, 0xEA); // NOP in the handler

    // SEI; NOP
    setup(&mut bus, &mut cpu, 0x0800, &[0x78, 0xEA]);
    cpu.step(&mut bus);

    cpu.assert_nmi();
    let cycles = cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0A01, "NMI vector plus the NOP executed there");
    assert_eq!(cycles, 7 + 2, "7 interrupt cycles plus the NOP");
}

#[test]
fn jsr_rts_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    bus.write(0x0900, 0x60); // RTS

    // JSR $0900; NOP
    setup(&mut bus, &mut cpu, 0x0800, &[0x20, 0x00, 0x09, 0xEA]);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0900);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0803, "RTS returns past the JSR operand");
}

#[test]
fn stz_and_inc_dec_accumulator() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.write(0x0040, 0xAA);

    // STZ $40; LDA #$01; DEA; INA; INA
    setup(
        &mut bus,
        &mut cpu,
        0x0800,
        &[0x64, 0x40, 0xA9, 0x01, 0x3A, 0x1A, 0x1A],
    );
    run(&mut cpu, &mut bus, 2);
    assert_eq!(bus.peek(0x0040), 0x00);

    cpu.step(&mut bus); // DEA
    assert_eq!(cpu.regs.a, 0x00);
    run(&mut cpu, &mut bus, 2); // INA INA
    assert_eq!(cpu.regs.a, 0x02);
}

#[test]
fn phx_plx_phy_ply() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // LDX #$11; LDY #$22; PHX; PHY; LDX #$00; LDY #$00; PLY; PLX
    setup(
        &mut bus,
        &mut cpu,
        0x0800,
        &[0xA2, 0x11, 0xA0, 0x22, 0xDA, 0x5A, 0xA2, 0x00, 0xA0, 0x00, 0x7A, 0xFA],
    );
    run(&mut cpu, &mut bus, 8);
    assert_eq!(cpu.regs.x, 0x11);
    assert_eq!(cpu.regs.y, 0x22);
}

#[test]
fn tsb_trb_memory_effects() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.write(0x0040, 0b1010_0101);

    // LDA #$0F; TSB $40; TRB $40
    setup(&mut bus, &mut cpu, 0x0800, &[0xA9, 0x0F, 0x04, 0x40, 0x14, 0x40]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(bus.peek(0x0040), 0b1010_1111, "TSB sets mask bits");
    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x0040), 0b1010_0000, "TRB clears mask bits");
}

#[test]
fn jmp_absolute_indexed_indirect() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // Table at $2000: entry 1 (X=2) points to $0900
    bus.write(0x2002, 0x00);
    bus.write(0x2003, 0x09);

    // LDX #$02; JMP ($2000,X)
    setup(&mut bus, &mut cpu, 0x0800, &[0xA2, 0x02, 0x7C, 0x00, 0x20]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.pc, 0x0900);
}

#[test]
fn unknown_opcode_charges_two_cycles_and_continues() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // $02 is unassigned; the next instruction must still execute.
    setup(&mut bus, &mut cpu, 0x0800, &[0x02, 0xA9, 0x55]);
    assert_eq!(cpu.step(&mut bus), 2);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a, 0x55);
}

#[test]
fn power_on_reset_runs_rom_without_crashing() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();

    // A ROM-like image: a loop of INX/JMP at $C000, reset vector there.
    bus.load(0xC000, &[0xE8, 0x4C, 0x00, 0xC0]);
    bus.write(0xFFFC, 0x00);
    bus.write(0xFFFD, 0xC0);

    cpu.assert_reset();
    while cpu.cycles() < 1_000_000 {
        cpu.step(&mut bus);
    }
    assert!((0xC000..=0xC003).contains(&cpu.regs.pc));
}
