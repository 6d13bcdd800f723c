use std::fmt;

use thiserror::Error;

/// Largest servo angle the firmware accepts.
pub const MAX_SERVO_ANGLE: u16 = 180;

/// Longest numeric payload after `V` the firmware will buffer.
const MAX_ANGLE_DIGITS: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("command too short ({0} bytes)")]
    TooShort(usize),
    #[error("servo angle {0} exceeds 180")]
    AngleOutOfRange(u32),
    #[error("invalid servo angle payload")]
    InvalidAngle,
    #[error("unknown command")]
    Unknown,
}

/// Motion command understood by the robot controller's serial parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCommand {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Stop,
    Servo(u16),
}

impl DriveCommand {
    /// Wire form: `cmdF`, `cmdB`, `cmdL`, `cmdR`, `cmdS`, or `V<angle>`.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            DriveCommand::Forward => b"cmdF".to_vec(),
            DriveCommand::Backward => b"cmdB".to_vec(),
            DriveCommand::TurnLeft => b"cmdL".to_vec(),
            DriveCommand::TurnRight => b"cmdR".to_vec(),
            DriveCommand::Stop => b"cmdS".to_vec(),
            DriveCommand::Servo(angle) => format!("V{angle}").into_bytes(),
        }
    }

    /// Parses one command, accepting the same inputs as the firmware.
    ///
    /// Bytes after a 4-byte `cmdX` token are ignored; a servo payload must
    /// be all digits (trailing CR/LF allowed).
    pub fn parse(data: &[u8]) -> Result<Self, CommandParseError> {
        if let Some(payload) = data.strip_prefix(b"V") {
            return parse_servo(payload);
        }
        if data.len() < 4 {
            return Err(CommandParseError::TooShort(data.len()));
        }
        match &data[..4] {
            b"cmdF" => Ok(DriveCommand::Forward),
            b"cmdB" => Ok(DriveCommand::Backward),
            b"cmdL" => Ok(DriveCommand::TurnLeft),
            b"cmdR" => Ok(DriveCommand::TurnRight),
            b"cmdS" => Ok(DriveCommand::Stop),
            _ => Err(CommandParseError::Unknown),
        }
    }
}

fn parse_servo(payload: &[u8]) -> Result<DriveCommand, CommandParseError> {
    let digits = std::str::from_utf8(payload)
        .map_err(|_| CommandParseError::InvalidAngle)?
        .trim_end_matches(['\r', '\n']);
    if digits.is_empty()
        || digits.len() > MAX_ANGLE_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(CommandParseError::InvalidAngle);
    }
    let angle: u32 = digits
        .parse()
        .map_err(|_| CommandParseError::InvalidAngle)?;
    if angle > MAX_SERVO_ANGLE as u32 {
        return Err(CommandParseError::AngleOutOfRange(angle));
    }
    Ok(DriveCommand::Servo(angle as u16))
}

impl fmt::Display for DriveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveCommand::Forward => write!(f, "forward"),
            DriveCommand::Backward => write!(f, "backward"),
            DriveCommand::TurnLeft => write!(f, "turn left"),
            DriveCommand::TurnRight => write!(f, "turn right"),
            DriveCommand::Stop => write!(f, "stop"),
            DriveCommand::Servo(angle) => write!(f, "servo {angle}\u{b0}"),
        }
    }
}
