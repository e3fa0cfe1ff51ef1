/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::io::{Error, ErrorKind};

/// A cursor over an in-memory byte buffer whose byte order can be switched
/// mid-stream; the shapefile format mixes big- and little-endian fields.
/// Reads past the end of the buffer return `UnexpectedEof` rather than panic.
pub struct ByteOrderReader {
    pub byte_order: Endianness,
    pub buffer: Vec<u8>,
    pub pos: usize,
}

impl ByteOrderReader {
    pub fn new(buffer: Vec<u8>, byte_order: Endianness) -> ByteOrderReader {
        ByteOrderReader {
            buffer,
            byte_order,
            pos: 0usize,
        }
    }

    pub fn seek(&mut self, position: usize) {
        self.pos = position;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.pos)
    }

    fn take(&mut self, num_bytes: usize) -> Result<&[u8], Error> {
        if self.pos + num_bytes > self.buffer.len() {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "Attempt to read {} bytes at offset {} of a {} byte buffer.",
                    num_bytes,
                    self.pos,
                    self.buffer.len()
                ),
            ));
        }
        let start = self.pos;
        self.pos += num_bytes;
        Ok(&self.buffer[start..start + num_bytes])
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    pub fn peek_u8(&self) -> Result<u8, Error> {
        match self.buffer.get(self.pos) {
            Some(b) => Ok(*b),
            None => Err(Error::new(
                ErrorKind::UnexpectedEof,
                "Attempt to peek past the end of the buffer.",
            )),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let little = self.byte_order == Endianness::LittleEndian;
        let buf = self.take(2)?;
        Ok(if little {
            LittleEndian::read_u16(buf)
        } else {
            BigEndian::read_u16(buf)
        })
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let little = self.byte_order == Endianness::LittleEndian;
        let buf = self.take(4)?;
        Ok(if little {
            LittleEndian::read_u32(buf)
        } else {
            BigEndian::read_u32(buf)
        })
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        let little = self.byte_order == Endianness::LittleEndian;
        let buf = self.take(4)?;
        Ok(if little {
            LittleEndian::read_i32(buf)
        } else {
            BigEndian::read_i32(buf)
        })
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        let little = self.byte_order == Endianness::LittleEndian;
        let buf = self.take(8)?;
        Ok(if little {
            LittleEndian::read_f64(buf)
        } else {
            BigEndian::read_f64(buf)
        })
    }

    /// Reads `length` bytes as (lossy) UTF-8 text.
    pub fn read_utf8(&mut self, length: usize) -> Result<String, Error> {
        let buf = self.take(length)?;
        Ok(String::from_utf8_lossy(buf).to_string())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum Endianness {
    #[default]
    LittleEndian,
    BigEndian,
}
