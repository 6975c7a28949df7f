pub mod cot;
pub mod esp32;
pub mod status;

use crate::{MessageKind, TGResult};

/// Trait implemented by protocols for rendering telemetry messages.
pub trait TelemMsg {
    const KIND: MessageKind;
    fn to_payload(&self) -> TGResult<String>;
}
