// display/src/keys.rs

use input::vk;
use winit::event::VirtualKeyCode;

/// Traduce una tecla de winit al código de tecla del host (VK_*) que entiende la cola.
/// Las teclas sin equivalente devuelven `None` y no se reenvían.
pub fn host_key_code(key: VirtualKeyCode) -> Option<u32> {
    use VirtualKeyCode as K;

    let code = match key {
        K::Return | K::NumpadEnter => vk::ENTER,
        K::Escape => vk::ESCAPE,
        K::Left => vk::LEFT,
        K::Right => vk::RIGHT,
        K::Up => vk::UP,
        K::Down => vk::DOWN,
        K::LControl | K::RControl => vk::CONTROL,
        K::LShift | K::RShift => vk::SHIFT,
        K::LAlt | K::RAlt => vk::ALT,
        K::Space => vk::SPACE,
        K::Tab => vk::TAB,
        K::Back => vk::BACK_SPACE,
        K::Pause => vk::PAUSE,
        K::Equals => vk::EQUALS,
        K::Minus => vk::MINUS,
        K::Comma => vk::COMMA,
        K::Period => vk::PERIOD,
        K::Slash => vk::SLASH,
        K::Semicolon => vk::SEMICOLON,
        K::F1 => vk::F1,
        K::F2 => vk::F2,
        K::F3 => vk::F3,
        K::F4 => vk::F4,
        K::F5 => vk::F5,
        K::F6 => vk::F6,
        K::F7 => vk::F7,
        K::F8 => vk::F8,
        K::F9 => vk::F9,
        K::F10 => vk::F10,
        K::F11 => vk::F11,
        K::F12 => vk::F12,
        // Letras y dígitos: el código VK es el ASCII en mayúscula
        K::A => b'A' as u32,
        K::B => b'B' as u32,
        K::C => b'C' as u32,
        K::D => b'D' as u32,
        K::E => b'E' as u32,
        K::F => b'F' as u32,
        K::G => b'G' as u32,
        K::H => b'H' as u32,
        K::I => b'I' as u32,
        K::J => b'J' as u32,
        K::K => b'K' as u32,
        K::L => b'L' as u32,
        K::M => b'M' as u32,
        K::N => b'N' as u32,
        K::O => b'O' as u32,
        K::P => b'P' as u32,
        K::Q => b'Q' as u32,
        K::R => b'R' as u32,
        K::S => b'S' as u32,
        K::T => b'T' as u32,
        K::U => b'U' as u32,
        K::V => b'V' as u32,
        K::W => b'W' as u32,
        K::X => b'X' as u32,
        K::Y => b'Y' as u32,
        K::Z => b'Z' as u32,
        K::Key0 | K::Numpad0 => b'0' as u32,
        K::Key1 | K::Numpad1 => b'1' as u32,
        K::Key2 | K::Numpad2 => b'2' as u32,
        K::Key3 | K::Numpad3 => b'3' as u32,
        K::Key4 | K::Numpad4 => b'4' as u32,
        K::Key5 | K::Numpad5 => b'5' as u32,
        K::Key6 | K::Numpad6 => b'6' as u32,
        K::Key7 | K::Numpad7 => b'7' as u32,
        K::Key8 | K::Numpad8 => b'8' as u32,
        K::Key9 | K::Numpad9 => b'9' as u32,
        _ => return None,
    };
    Some(code)
}
