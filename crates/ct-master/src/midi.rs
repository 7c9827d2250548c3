//! MIDI input: decodes channel messages from a port into the event channel.

use crossbeam_channel::Sender;
use ct_engine::NoteEvent;
use log::{info, trace};
use midir::{Ignore, MidiInput, MidiInputConnection};

const CLIENT_NAME: &str = "chiptone";

/// Error type for MIDI input setup.
#[derive(Debug)]
pub enum MidiError {
    /// Failed to create a MIDI client
    Init(String),
    /// No port at the requested index
    NoPort(usize),
    /// Failed to open the port
    Connect(String),
}

impl std::fmt::Display for MidiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MidiError::Init(msg) => write!(f, "MIDI init error: {}", msg),
            MidiError::NoPort(index) => write!(f, "No MIDI input port {}", index),
            MidiError::Connect(msg) => write!(f, "MIDI connect error: {}", msg),
        }
    }
}

impl std::error::Error for MidiError {}

/// Names of the available input ports, in index order.
pub fn list_ports() -> Result<Vec<String>, MidiError> {
    let input = MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::Init(e.to_string()))?;
    Ok(input
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| input.port_name(port).unwrap_or_else(|_| format!("port {}", i)))
        .collect())
}

/// An open input port. Events stop when this is dropped.
pub struct MidiConnection {
    _connection: MidiInputConnection<()>,
    port_name: String,
}

impl MidiConnection {
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Open input port `index` and forward every decodable message to `events`.
pub fn connect(index: usize, events: Sender<NoteEvent>) -> Result<MidiConnection, MidiError> {
    let mut input = MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::Init(e.to_string()))?;
    input.ignore(Ignore::All);

    let ports = input.ports();
    let port = ports.get(index).ok_or(MidiError::NoPort(index))?;
    let port_name = input
        .port_name(port)
        .unwrap_or_else(|_| format!("port {}", index));

    let connection = input
        .connect(
            port,
            "chiptone-in",
            move |_stamp, message, _| match NoteEvent::from_midi(message) {
                Some(event) => {
                    let _ = events.send(event);
                }
                None => trace!("skipping MIDI message {:02X?}", message),
            },
            (),
        )
        .map_err(|e| MidiError::Connect(e.to_string()))?;

    info!("listening on MIDI input '{}'", port_name);
    Ok(MidiConnection {
        _connection: connection,
        port_name,
    })
}
