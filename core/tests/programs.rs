use chip8_core::constants::{GLYPH_BYTES, PROGRAM_START, SPRITE_SHEET};
use chip8_core::{Config, Error, FrameBuffer, Interpreter, Keypad, Step};

fn boot(program: &[u8]) -> Interpreter<FrameBuffer, Keypad> {
    let config = Config {
        seed: Some(0x5EED),
        ..Config::default()
    };
    let mut interpreter = Interpreter::new(FrameBuffer::new(), Keypad::new(), config);
    interpreter.load_program(program).unwrap();
    interpreter
}

#[test]
fn call_and_return() {
    let mut interpreter = boot(&[
        0x22, 0x06, // 200: call 206
        0x61, 0x02, // 202: V1 = 2
        0x12, 0x04, // 204: spin
        0x60, 0x01, // 206: V0 = 1
        0x00, 0xEE, // 208: ret
    ]);

    assert_eq!(interpreter.run_for(2).unwrap(), Step::Continue);
    assert_eq!(interpreter.cpu().stack_depth(), 1);
    assert_eq!(interpreter.cpu().v[0x0], 1);

    interpreter.run().unwrap();
    assert_eq!(interpreter.cpu().stack_depth(), 0);
    assert_eq!(interpreter.cpu().v[0x1], 2);
    assert_eq!(interpreter.cpu().pc, 0x204);
}

#[test]
fn repeated_returns_do_not_halt() {
    let mut interpreter = boot(&[
        0x22, 0x06, // 200: call 206
        0x12, 0x02, // 202: spin
        0x00, 0x00, // 204
        0x22, 0x0A, // 206: call 20A
        0x00, 0xEE, // 208: ret
        0x00, 0xEE, // 20A: ret
    ]);
    // two consecutive 00EE fetches
    assert_eq!(interpreter.run_for(5).unwrap(), Step::Continue);
    assert_eq!(interpreter.cpu().pc, 0x202);
}

#[test]
fn ping_pong_jumps_do_not_halt() {
    let mut interpreter = boot(&[0x12, 0x02, 0x12, 0x00]);
    assert_eq!(interpreter.run_for(50).unwrap(), Step::Continue);
}

#[test]
fn halts_on_idle_loop() {
    let mut interpreter = boot(&[
        0x60, 0x05, // V0 = 5
        0x12, 0x02, // spin
    ]);
    assert_eq!(interpreter.run_for(10).unwrap(), Step::Halted);
    assert_eq!(interpreter.cpu().pc, 0x202);
    assert_eq!(interpreter.cpu().v[0x0], 5);
}

#[test]
fn skip_moves_four_bytes() {
    let mut interpreter = boot(&[
        0x60, 0x07, // 200: V0 = 7
        0x30, 0x07, // 202: skip if V0 == 7
        0x61, 0xFF, // 204: skipped
        0x62, 0x01, // 206: V2 = 1
    ]);
    interpreter.run_for(3).unwrap();
    assert_eq!(interpreter.cpu().pc, 0x208);
    assert_eq!(interpreter.cpu().v[0x1], 0);
    assert_eq!(interpreter.cpu().v[0x2], 1);
}

#[test]
fn draws_font_glyph() {
    let mut interpreter = boot(&[
        0x60, 0x0A, // V0 = A
        0xF0, 0x29, // I = glyph(V0)
        0x61, 0x00, // V1 = 0
        0xD1, 0x15, // draw 5 rows at (V1, V1)
        0x12, 0x08, // spin
    ]);
    interpreter.run().unwrap();

    assert_eq!(interpreter.cpu().i, 0xA * GLYPH_BYTES);
    let glyph = &SPRITE_SHEET[50..55];
    let frame = interpreter.display();
    for (y, row) in glyph.iter().enumerate() {
        for x in 0..8 {
            assert_eq!(frame.is_lit(x, y), row & (0x80 >> x) != 0, "({}, {})", x, y);
        }
    }
    assert_eq!(interpreter.cpu().v[0xF], 0);
}

#[test]
fn redraw_erases_and_flags() {
    let mut interpreter = boot(&[
        0xA2, 0x0A, // 200: I = 20A
        0xD0, 0x01, // 202: draw
        0xD0, 0x01, // 204: draw again
        0x12, 0x06, // 206: spin
        0x00, 0x00, // 208
        0xFF, 0x00, // 20A: sprite
    ]);
    interpreter.run_for(2).unwrap();
    assert_eq!(interpreter.display().lit_count(), 8);
    assert_eq!(interpreter.cpu().v[0xF], 0);

    interpreter.run().unwrap();
    assert_eq!(interpreter.display().lit_count(), 0);
    assert_eq!(interpreter.cpu().v[0xF], 1);
}

#[test]
fn store_and_read_registers() {
    let mut interpreter = boot(&[
        0x60, 0x11, // V0 = 11
        0x61, 0x22, // V1 = 22
        0x62, 0x33, // V2 = 33
        0xA3, 0x00, // I = 300
        0xF2, 0x55, // mem[300..=302] = V0..=V2
        0x60, 0x00, // V0 = 0
        0x61, 0x00, // V1 = 0
        0xF1, 0x65, // V0..=V1 = mem[300..=301]
    ]);
    interpreter.run_for(8).unwrap();
    assert_eq!(interpreter.memory().slice(0x300..0x303), &[0x11, 0x22, 0x33]);
    assert_eq!(interpreter.cpu().v[..3], [0x11, 0x22, 0x33]);
    assert_eq!(interpreter.cpu().i, 0x300);
}

#[test]
fn delay_timer_is_loaded_and_read() {
    let mut interpreter = boot(&[
        0x60, 0x2A, // V0 = 2A
        0xF0, 0x15, // DT = V0
        0xF1, 0x07, // V1 = DT
    ]);
    interpreter.run_for(3).unwrap();
    // nothing ticks the timers here
    assert_eq!(interpreter.timers().snapshot().delay, 0x2A);
    assert_eq!(interpreter.cpu().v[0x1], 0x2A);
}

#[test]
fn seeded_rand_is_reproducible() {
    let program = [0xC0, 0xFF, 0xC1, 0x0F];
    let mut a = boot(&program);
    let mut b = boot(&program);
    a.run_for(2).unwrap();
    b.run_for(2).unwrap();
    assert_eq!(a.cpu().v[0x0], b.cpu().v[0x0]);
    assert_eq!(a.cpu().v[0x1] & 0xF0, 0);
}

#[test]
fn return_with_empty_stack_fails() {
    let mut interpreter = boot(&[0x00, 0xEE]);
    assert!(matches!(
        interpreter.step(),
        Err(Error::StackUnderflow { pc }) if pc == PROGRAM_START
    ));
}

#[test]
fn unbounded_recursion_overflows_stack() {
    let mut interpreter = boot(&[0x22, 0x00]);
    let err = interpreter.run_for(100).unwrap_err();
    assert!(matches!(err, Error::StackOverflow { pc } if pc == PROGRAM_START));
    assert_eq!(interpreter.cpu().stack_depth(), 16);
}

#[test]
fn oversized_program_is_rejected() {
    let mut interpreter = Interpreter::new(FrameBuffer::new(), Keypad::new(), Config::default());
    let program = vec![0xAA; 4096 - 0x200 + 1];
    assert!(matches!(
        interpreter.load_program(&program),
        Err(Error::MemoryOutOfBounds { .. })
    ));
    assert_eq!(interpreter.memory().read_byte(0x200).unwrap(), 0);
}

#[test]
fn loads_program_from_reader() {
    let mut interpreter = Interpreter::new(FrameBuffer::new(), Keypad::new(), Config::default());
    let mut rom: &[u8] = &[0x60, 0x42];
    assert_eq!(interpreter.load_from(&mut rom).unwrap(), 2);
    interpreter.step().unwrap();
    assert_eq!(interpreter.cpu().v[0x0], 0x42);
}
