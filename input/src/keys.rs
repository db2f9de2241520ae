// input/src/keys.rs

use std::num::NonZeroU8;

/// Códigos de tecla del host (virtual key codes estilo AWT).
/// Las letras y los dígitos coinciden con su ASCII en mayúscula.
pub mod vk {
    pub const BACK_SPACE: u32 = 8;
    pub const TAB: u32 = 9;
    pub const ENTER: u32 = 10;
    pub const SHIFT: u32 = 16;
    pub const CONTROL: u32 = 17;
    pub const ALT: u32 = 18;
    pub const PAUSE: u32 = 19;
    pub const ESCAPE: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const COMMA: u32 = 44;
    pub const MINUS: u32 = 45;
    pub const PERIOD: u32 = 46;
    pub const SLASH: u32 = 47;
    pub const SEMICOLON: u32 = 59;
    pub const EQUALS: u32 = 61;
    pub const F1: u32 = 112;
    pub const F2: u32 = 113;
    pub const F3: u32 = 114;
    pub const F4: u32 = 115;
    pub const F5: u32 = 116;
    pub const F6: u32 = 117;
    pub const F7: u32 = 118;
    pub const F8: u32 = 119;
    pub const F9: u32 = 120;
    pub const F10: u32 = 121;
    pub const F11: u32 = 122;
    pub const F12: u32 = 123;
}

/// Códigos de tecla que entiende el motor.
pub mod engine_key {
    pub const TAB: u8 = 9;
    pub const ENTER: u8 = 13;
    pub const ESCAPE: u8 = 27;
    pub const MINUS: u8 = 0x2D;
    pub const EQUALS: u8 = 0x3D;
    pub const BACKSPACE: u8 = 0x7F;
    pub const RSHIFT: u8 = 0x80 + 0x36;
    pub const RALT: u8 = 0x80 + 0x38;
    pub const USE: u8 = 0xA2;
    pub const FIRE: u8 = 0xA3;
    pub const LEFT_ARROW: u8 = 0xAC;
    pub const UP_ARROW: u8 = 0xAD;
    pub const RIGHT_ARROW: u8 = 0xAE;
    pub const DOWN_ARROW: u8 = 0xAF;
    pub const F1: u8 = 0x80 + 0x3B;
    pub const F2: u8 = 0x80 + 0x3C;
    pub const F3: u8 = 0x80 + 0x3D;
    pub const F4: u8 = 0x80 + 0x3E;
    pub const F5: u8 = 0x80 + 0x3F;
    pub const F6: u8 = 0x80 + 0x40;
    pub const F7: u8 = 0x80 + 0x41;
    pub const F8: u8 = 0x80 + 0x42;
    pub const F9: u8 = 0x80 + 0x43;
    pub const F10: u8 = 0x80 + 0x44;
    pub const F11: u8 = 0x80 + 0x57;
    pub const F12: u8 = 0x80 + 0x58;
    pub const PAUSE: u8 = 0xFF;
}

// Un 0 en la tabla rompe la compilación en lugar de colarse como "sin evento".
const fn key(code: u8) -> NonZeroU8 {
    match NonZeroU8::new(code) {
        Some(code) => code,
        None => panic!("el código de tecla 0 está reservado"),
    }
}

/// Tabla estándar host -> motor.
pub const STANDARD_BINDINGS: [(u32, NonZeroU8); 27] = [
    (vk::ENTER, key(engine_key::ENTER)),
    (vk::ESCAPE, key(engine_key::ESCAPE)),
    (vk::LEFT, key(engine_key::LEFT_ARROW)),
    (vk::RIGHT, key(engine_key::RIGHT_ARROW)),
    (vk::UP, key(engine_key::UP_ARROW)),
    (vk::DOWN, key(engine_key::DOWN_ARROW)),
    (vk::CONTROL, key(engine_key::FIRE)),
    (vk::SPACE, key(engine_key::USE)),
    (vk::SHIFT, key(engine_key::RSHIFT)),
    (vk::ALT, key(engine_key::RALT)),
    (vk::TAB, key(engine_key::TAB)),
    (vk::F1, key(engine_key::F1)),
    (vk::F2, key(engine_key::F2)),
    (vk::F3, key(engine_key::F3)),
    (vk::F4, key(engine_key::F4)),
    (vk::F5, key(engine_key::F5)),
    (vk::F6, key(engine_key::F6)),
    (vk::F7, key(engine_key::F7)),
    (vk::F8, key(engine_key::F8)),
    (vk::F9, key(engine_key::F9)),
    (vk::F10, key(engine_key::F10)),
    (vk::F11, key(engine_key::F11)),
    (vk::F12, key(engine_key::F12)),
    (vk::BACK_SPACE, key(engine_key::BACKSPACE)),
    (vk::EQUALS, key(engine_key::EQUALS)),
    (vk::PAUSE, key(engine_key::PAUSE)),
    (vk::MINUS, key(engine_key::MINUS)),
];
