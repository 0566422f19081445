/// The normalized movement command set consumed by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
}

const COMMAND_COUNT: usize = 4;

impl Command {
    const fn index(self) -> usize {
        match self {
            Command::Up => 0,
            Command::Down => 1,
            Command::Left => 2,
            Command::Right => 3,
        }
    }

    /// Unit vector in tile coordinates; y grows downward.
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Command::Up => (0, -1),
            Command::Down => (0, 1),
            Command::Left => (-1, 0),
            Command::Right => (1, 0),
        }
    }

    const ALL: [Command; COMMAND_COUNT] =
        [Command::Up, Command::Down, Command::Left, Command::Right];
}

/// A combined movement request: one step along each non-zero axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub dx: i32,
    pub dy: i32,
}

impl MoveIntent {
    pub fn is_diagonal(&self) -> bool {
        self.dx != 0 && self.dy != 0
    }

    fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Turns raw press/release command events into debounced movement intents.
///
/// A fresh press arms a short validity delay before the queue is drained, so
/// two keys pressed near-simultaneously merge into one diagonal intent
/// instead of two sequential single-axis moves. OS auto-repeat presses are
/// ignored; only the edge-triggered first press and the continuously sampled
/// held state matter. Releasing the last held key invalidates the queue
/// until the next fresh press.
#[derive(Debug)]
pub struct InputCommandGate {
    held: [bool; COMMAND_COUNT],
    pressed_at_ms: [f64; COMMAND_COUNT],
    queue: Vec<Command>,
    ready_at_ms: f64,
    combine_window_ms: f64,
}

impl InputCommandGate {
    pub fn new(combine_window_ms: f64) -> Self {
        Self {
            held: [false; COMMAND_COUNT],
            pressed_at_ms: [0.0; COMMAND_COUNT],
            queue: Vec::new(),
            ready_at_ms: 0.0,
            combine_window_ms,
        }
    }

    pub fn handle_command(&mut self, command: Command, pressed: bool, timestamp_ms: f64) {
        let index = command.index();
        if pressed {
            if self.held[index] {
                // OS auto-repeat while held; not a new movement edge.
                return;
            }
            self.held[index] = true;
            self.pressed_at_ms[index] = timestamp_ms;
            self.queue.push(command);
            self.ready_at_ms = timestamp_ms + self.combine_window_ms;
        } else {
            self.held[index] = false;
            if !self.held.iter().any(|held| *held) {
                self.queue.clear();
            }
        }
    }

    pub fn is_held(&self, command: Command) -> bool {
        self.held[command.index()]
    }

    /// Timestamp of the edge-triggered press, while the command is held.
    pub fn held_since(&self, command: Command) -> Option<f64> {
        let index = command.index();
        self.held[index].then_some(self.pressed_at_ms[index])
    }

    /// Drains the queue into one combined intent once the validity delay has
    /// elapsed. Returns `None` while the window is still open, when nothing
    /// is queued, or when held commands cancel out.
    pub fn poll_intent(&mut self, now_ms: f64) -> Option<MoveIntent> {
        if self.queue.is_empty() || now_ms < self.ready_at_ms {
            return None;
        }
        self.queue.clear();
        self.sample_held()
    }

    /// Combined intent from the currently held commands; opposite directions
    /// cancel. Used to continue movement at completion instants without
    /// re-processing the queue.
    pub fn sample_held(&self) -> Option<MoveIntent> {
        let mut intent = MoveIntent { dx: 0, dy: 0 };
        for command in Command::ALL {
            if self.held[command.index()] {
                let (dx, dy) = command.vector();
                intent.dx += dx;
                intent.dy += dy;
            }
        }
        intent.dx = intent.dx.clamp(-1, 1);
        intent.dy = intent.dy.clamp(-1, 1);
        if intent.is_zero() {
            None
        } else {
            Some(intent)
        }
    }
}
