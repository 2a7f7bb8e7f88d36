//! Teleoperation link to the onboard receiver.
//!
//! A persistent TCP connection to the robot carrying short ASCII commands:
//! timed motion commands of the form `"<verb> <power> <duration>"` (power
//! 0..=9, duration in seconds) and single-character toggle tokens. The only
//! inbound traffic is the acknowledgment to the initial hello; there is no
//! further inbound protocol.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

const HELLO: &[u8] = b"PC Connected\n";
const MAX_POWER: u8 = 9;

/// Motion verbs understood by the onboard receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    TranslateLeft,
    TranslateRight,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Forward => "forward",
            Verb::Backward => "backward",
            Verb::TurnLeft => "turn_left",
            Verb::TurnRight => "turn_right",
            Verb::TranslateLeft => "translate_left",
            Verb::TranslateRight => "translate_right",
        }
    }
}

/// Command sent over the teleop link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Timed motion burst.
    Motion { verb: Verb, power: u8, duration_s: u8 },
    /// Open the gripper servo.
    GripperOpen,
    /// Close the gripper servo.
    GripperClose,
    /// Immediate motor stop.
    Stop,
}

impl Command {
    /// Motion command with validated power (0..=9).
    pub fn motion(verb: Verb, power: u8, duration_s: u8) -> Result<Self> {
        if power > MAX_POWER {
            return Err(anyhow!("power {} out of range 0..={}", power, MAX_POWER));
        }
        Ok(Self::Motion {
            verb,
            power,
            duration_s,
        })
    }

    /// Wire encoding, without trailing newline.
    pub fn encode(&self) -> String {
        match self {
            Command::Motion {
                verb,
                power,
                duration_s,
            } => format!("{} {} {}", verb.as_str(), power, duration_s),
            Command::GripperOpen => "o".to_string(),
            Command::GripperClose => "c".to_string(),
            Command::Stop => "x".to_string(),
        }
    }
}

/// Map a pressed key to a command. Motion keys send a moderate-power,
/// one-second burst.
pub fn map_key(key: char) -> Option<Command> {
    let motion = |verb| Command::Motion {
        verb,
        power: 4,
        duration_s: 1,
    };
    match key.to_ascii_lowercase() {
        'w' => Some(motion(Verb::Forward)),
        's' => Some(motion(Verb::Backward)),
        'a' => Some(motion(Verb::TurnLeft)),
        'd' => Some(motion(Verb::TurnRight)),
        'q' => Some(motion(Verb::TranslateLeft)),
        'e' => Some(motion(Verb::TranslateRight)),
        'o' => Some(Command::GripperOpen),
        'c' => Some(Command::GripperClose),
        'x' => Some(Command::Stop),
        _ => None,
    }
}

/// Persistent teleop connection.
pub struct TeleopLink {
    stream: TcpStream,
    peer: String,
}

impl TeleopLink {
    /// Connect to the receiver and perform the hello handshake.
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        let sock_addr = addr
            .to_socket_addrs()
            .with_context(|| format!("resolve teleop address '{}'", addr))?
            .next()
            .ok_or_else(|| anyhow!("teleop address '{}' resolved to nothing", addr))?;
        let stream = TcpStream::connect_timeout(&sock_addr, timeout)
            .with_context(|| format!("connect to receiver at {}", addr))?;
        stream
            .set_read_timeout(Some(timeout))
            .context("set read timeout")?;
        stream
            .set_write_timeout(Some(timeout))
            .context("set write timeout")?;

        let mut link = Self {
            stream,
            peer: addr.to_string(),
        };
        link.handshake()?;
        Ok(link)
    }

    /// Send the hello line and wait for the acknowledgment. A missing ack
    /// within the timeout is tolerated; a closed connection is not.
    fn handshake(&mut self) -> Result<()> {
        self.stream.write_all(HELLO).context("send hello")?;
        let mut buf = [0u8; 1024];
        match self.stream.read(&mut buf) {
            Ok(0) => Err(anyhow!("receiver closed connection during handshake")),
            Ok(n) => {
                log::info!(
                    "receiver ack: {}",
                    String::from_utf8_lossy(&buf[..n]).trim_end()
                );
                Ok(())
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                log::warn!("no handshake ack from {} within timeout", self.peer);
                Ok(())
            }
            Err(e) => Err(e).context("read handshake ack"),
        }
    }

    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.send_raw(&command.encode())
    }

    /// Send a free-form line as-is.
    pub fn send_raw(&mut self, msg: &str) -> Result<()> {
        self.stream
            .write_all(msg.as_bytes())
            .with_context(|| format!("send '{}' to {}", msg, self.peer))
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_commands_encode_verb_power_duration() {
        let cmd = Command::motion(Verb::Forward, 4, 2).unwrap();
        assert_eq!(cmd.encode(), "forward 4 2");

        let cmd = Command::motion(Verb::TranslateRight, 9, 1).unwrap();
        assert_eq!(cmd.encode(), "translate_right 9 1");
    }

    #[test]
    fn toggles_encode_as_single_characters() {
        assert_eq!(Command::GripperOpen.encode(), "o");
        assert_eq!(Command::GripperClose.encode(), "c");
        assert_eq!(Command::Stop.encode(), "x");
    }

    #[test]
    fn power_above_nine_is_rejected() {
        assert!(Command::motion(Verb::Forward, 10, 1).is_err());
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(
            map_key('w'),
            Some(Command::Motion {
                verb: Verb::Forward,
                power: 4,
                duration_s: 1
            })
        );
        assert_eq!(map_key('A'), map_key('a'));
        assert_eq!(map_key('x'), Some(Command::Stop));
        assert_eq!(map_key('z'), None);
    }
}
