//! The subset of the RFC 1035 wire format this responder speaks: the
//! 12-byte header, a single question, and the label encoding of names.

use crate::buffer::PacketBuffer;

pub const HEADER_LEN: usize = 12;

pub const FLAGS_INDEX: usize = 2;
pub const QUESTION_COUNT_INDEX: usize = 4;
pub const ANSWER_COUNT_INDEX: usize = 6;
pub const AUTHORITY_COUNT_INDEX: usize = 8;
pub const ADDITIONAL_COUNT_INDEX: usize = 10;

pub const TYPE_A: u16 = 1;
pub const TYPE_PTR: u16 = 12;
pub const CLASS_IN: u16 = 1;

pub const FLAG_QR: u16 = 0x8000;
pub const FLAG_AA: u16 = 0x0400;
pub const OPCODE_MASK: u16 = 0x7800;

pub const RCODE_NAME_ERROR: u16 = 3;
pub const RCODE_NOT_IMPLEMENTED: u16 = 4;

/// Replaces each dot with the length of the segment that follows it,
/// scanning backward so every offset is known in a single pass. The caller
/// supplies the leading separator; there is no trailing root byte.
pub fn undot(name: &mut [u8]) {
    let mut seg_len = 0u8;
    for i in (0..name.len()).rev() {
        if name[i] == b'.' {
            name[i] = seg_len;
            seg_len = 0;
        } else {
            seg_len += 1;
        }
    }
}

/// Dotted name to label-encoded bytes, aligned with how a query name
/// arrives on the wire (minus the terminating root byte).
pub fn encode_name(name: &str) -> Vec<u8> {
    let mut vec = Vec::with_capacity(name.len() + 1);
    vec.push(b'.');
    vec.extend(name.bytes());
    undot(&mut vec);
    vec
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

impl Header {
    pub fn from(buffer: &mut PacketBuffer) -> Self {
        Header {
            id: u16::from_be_bytes([buffer.take(), buffer.take()]),
            flags: u16::from_be_bytes([buffer.take(), buffer.take()]),
            question_count: u16::from_be_bytes([buffer.take(), buffer.take()]),
            answer_count: u16::from_be_bytes([buffer.take(), buffer.take()]),
            authority_count: u16::from_be_bytes([buffer.take(), buffer.take()]),
            additional_count: u16::from_be_bytes([buffer.take(), buffer.take()]),
        }
    }

    pub fn is_response(&self) -> bool {
        self.flags & FLAG_QR != 0
    }

    pub fn is_standard_query(&self) -> bool {
        self.flags & OPCODE_MASK == 0
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Question {
    pub name: Vec<u8>,
    pub _type: u16,
    pub class: u16,
}

impl Question {
    /// Decodes the question at the cursor. The name is scanned to its zero
    /// terminator without interpreting labels; compression pointers are not
    /// unwrapped. Returns None if the name never terminates inside the
    /// packet or the type/class fields are truncated.
    pub fn from(buffer: &mut PacketBuffer, packet_len: usize) -> Option<Self> {
        let mut name = Vec::new();
        loop {
            if buffer.get_current_index() >= packet_len {
                return None;
            }
            let byte = buffer.take();
            if byte == 0 {
                break;
            }
            name.push(byte);
        }
        if buffer.get_current_index() + 4 > packet_len {
            return None;
        }
        let _type = u16::from_be_bytes([buffer.take(), buffer.take()]);
        let class = u16::from_be_bytes([buffer.take(), buffer.take()]);
        Some(Question { name, _type, class })
    }

    /// Name with terminator plus type and class.
    pub fn encoded_len(&self) -> usize {
        self.name.len() + 1 + 4
    }

    pub fn is_supported(&self) -> bool {
        (self._type == TYPE_A || self._type == TYPE_PTR)
            && self.class == CLASS_IN
    }

    /// Dotted rendition for log lines only. Must not panic on names that
    /// are not well-formed label sequences.
    pub fn readable_name(&self) -> String {
        let mut vec = Vec::new();
        let mut index = 0usize;
        while index < self.name.len() {
            let seg_len = self.name[index] as usize;
            index += 1;
            if !vec.is_empty() {
                vec.push(b'.');
            }
            let end = (index + seg_len).min(self.name.len());
            vec.extend(&self.name[index..end]);
            index = end.max(index + 1);
        }
        String::from_utf8_lossy(&vec).to_string()
    }
}
