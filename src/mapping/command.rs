use std::fmt::{self, Display};

/// Operator command produced by a single keypress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    IncreaseForward,
    DecreaseForward,
    IncreaseRight,
    DecreaseRight,
    IncreaseAngular,
    DecreaseAngular,
    /// Zeroes every velocity component
    Stop,
    NoOp,
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::IncreaseForward => write!(f, "+forward"),
            Command::DecreaseForward => write!(f, "-forward"),
            Command::IncreaseRight => write!(f, "+right"),
            Command::DecreaseRight => write!(f, "-right"),
            Command::IncreaseAngular => write!(f, "+angular"),
            Command::DecreaseAngular => write!(f, "-angular"),
            Command::Stop => write!(f, "stop"),
            Command::NoOp => write!(f, "noop"),
        }
    }
}
