use engine::Command;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Arrow keys and WASD map onto the engine's normalized command set; every
/// other key is someone else's business.
pub(crate) fn command_for_key(key: PhysicalKey) -> Option<Command> {
    match key {
        PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
            Some(Command::Up)
        }
        PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
            Some(Command::Down)
        }
        PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
            Some(Command::Left)
        }
        PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
            Some(Command::Right)
        }
        _ => None,
    }
}
