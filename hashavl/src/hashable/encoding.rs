//! Binary encoding of a hashable node for per-node storage.
//!
//! A record is a presence byte followed by the fields, in fixed order:
//!
//! ```text
//! [presence: u8]
//! [hash?]       bit 0
//! [key]         always present
//! [left_key?]   bit 1
//! [right_key?]  bit 2
//! [height]      i16, big-endian, 2 bytes
//! [left_hash?]  bit 3
//! [right_hash?] bit 4
//! ```
//!
//! Every byte-string field is length-prefixed with an unsigned varint.
//! Decoding rejects trailing bytes, an empty key, and a record whose
//! child key lacks the matching child hash.

use integer_encoding::VarInt;

use crate::{
    error::{Error, Result},
    hashable::{HashableNode, node::HashNode},
    node::Node,
};

const FLAG_HASH: u8 = 0b0000_0001;
const FLAG_LEFT_KEY: u8 = 0b0000_0010;
const FLAG_RIGHT_KEY: u8 = 0b0000_0100;
const FLAG_LEFT_HASH: u8 = 0b0000_1000;
const FLAG_RIGHT_HASH: u8 = 0b0001_0000;

impl HashNode {
    /// Serialize this node into its storage record.
    ///
    /// The node hash must have been computed; saving a tree forces that
    /// by computing the root hash first.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let hash = self.hash().ok_or_else(|| {
            Error::InvalidNode(format!(
                "node {} has no computed hash to encode",
                hex::encode(self.key()),
            ))
        })?;

        let key = self.key();
        let left_key = self.left_key();
        let right_key = self.right_key();
        let left_hash = self.left_hash();
        let right_hash = self.right_hash();

        let mut presence = FLAG_HASH;
        if left_key.is_some() {
            presence |= FLAG_LEFT_KEY;
        }
        if right_key.is_some() {
            presence |= FLAG_RIGHT_KEY;
        }
        if left_hash.is_some() {
            presence |= FLAG_LEFT_HASH;
        }
        if right_hash.is_some() {
            presence |= FLAG_RIGHT_HASH;
        }

        let mut buf = Vec::new();
        buf.push(presence);
        write_bytes(&mut buf, &hash);
        write_bytes(&mut buf, &key);
        if let Some(bytes) = &left_key {
            write_bytes(&mut buf, bytes);
        }
        if let Some(bytes) = &right_key {
            write_bytes(&mut buf, bytes);
        }
        buf.extend_from_slice(&self.height().to_be_bytes());
        if let Some(bytes) = &left_hash {
            write_bytes(&mut buf, bytes);
        }
        if let Some(bytes) = &right_hash {
            write_bytes(&mut buf, bytes);
        }

        Ok(buf)
    }

    /// Deserialize a node from its storage record.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let presence = reader.byte()?;

        let hash = if presence & FLAG_HASH != 0 {
            Some(reader.bytes()?)
        } else {
            None
        };
        let key = reader.bytes()?;
        if key.is_empty() {
            return Err(Error::InvalidNode("record key is empty".into()));
        }
        let left_key = if presence & FLAG_LEFT_KEY != 0 {
            Some(reader.bytes()?)
        } else {
            None
        };
        let right_key = if presence & FLAG_RIGHT_KEY != 0 {
            Some(reader.bytes()?)
        } else {
            None
        };
        let height = reader.height()?;
        let left_hash = if presence & FLAG_LEFT_HASH != 0 {
            Some(reader.bytes()?)
        } else {
            None
        };
        let right_hash = if presence & FLAG_RIGHT_HASH != 0 {
            Some(reader.bytes()?)
        } else {
            None
        };
        reader.finish()?;

        if height < 0 {
            return Err(Error::InvalidNode(format!(
                "record height must not be negative; height={height}"
            )));
        }
        if left_key.is_some() && left_hash.is_none() {
            return Err(Error::InvalidNode(
                "record has a left key but no left hash".into(),
            ));
        }
        if right_key.is_some() && right_hash.is_none() {
            return Err(Error::InvalidNode(
                "record has a right key but no right hash".into(),
            ));
        }

        Ok(HashNode::from_record(
            key, height, left_key, right_key, hash, left_hash, right_hash,
        ))
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u64).encode_var_vec());
    buf.extend_from_slice(bytes);
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn byte(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::InvalidNode("record truncated".into()))?;
        self.pos += 1;
        Ok(byte)
    }

    fn bytes(&mut self) -> Result<Vec<u8>> {
        let (len, read) = u64::decode_var(&self.data[self.pos..])
            .ok_or_else(|| Error::InvalidNode("record has a malformed length".into()))?;
        self.pos += read;

        let len = len as usize;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| Error::InvalidNode("record truncated".into()))?;

        let bytes = self.data[self.pos..end].to_vec();
        self.pos = end;
        Ok(bytes)
    }

    fn height(&mut self) -> Result<i16> {
        let hi = self.byte()?;
        let lo = self.byte()?;
        Ok(i16::from_be_bytes([hi, lo]))
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.data.len() {
            return Err(Error::InvalidNode(format!(
                "record has {} trailing byte(s)",
                self.data.len() - self.pos
            )));
        }
        Ok(())
    }
}
