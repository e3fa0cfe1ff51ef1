/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT

NOTE: Structures and functions for handling the Shapefile attribute table info
contained with the associated .dbf file.
*/
use std::fmt;
use std::io::{Error, ErrorKind};

#[derive(Debug, Default, Clone)]
pub struct AttributeHeader {
    pub version: u8,
    pub year: u32,
    pub month: u8,
    pub day: u8,
    pub num_records: u32,
    pub num_fields: u32, // not actually stored in file but derived
    pub bytes_in_header: u16,
    pub bytes_in_record: u16,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DateData {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for DateData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Int(i32),
    Real(f64),
    Text(String),
    Date(DateData),
    Bool(bool),
    Null,
}

impl FieldData {
    /// The numeric value of an Int or Real field.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldData::Int(v) => Some(*v as f64),
            FieldData::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Parses the trimmed text of a .dbf cell according to its field descriptor.
    pub fn parse(text: &str, field: &AttributeField) -> Result<FieldData, Error> {
        if text.replace(' ', "").replace('?', "").is_empty() {
            return Ok(FieldData::Null);
        }
        let bad_value = || {
            Error::new(
                ErrorKind::InvalidData,
                format!("Could not parse '{}' in field {}.", text, field.name),
            )
        };
        let fd = match field.field_type {
            'N' | 'F' | 'I' | 'O' => {
                if field.decimal_count == 0 {
                    match text.parse::<i32>() {
                        Ok(v) => FieldData::Int(v),
                        // too wide for an i32
                        Err(_) => FieldData::Real(text.parse::<f64>().map_err(|_| bad_value())?),
                    }
                } else {
                    FieldData::Real(text.parse::<f64>().map_err(|_| bad_value())?)
                }
            }
            'D' => {
                if text.len() < 8 || !text.is_char_boundary(8) {
                    return Err(bad_value());
                }
                FieldData::Date(DateData {
                    year: text[0..4].parse::<u16>().map_err(|_| bad_value())?,
                    month: text[4..6].parse::<u8>().map_err(|_| bad_value())?,
                    day: text[6..8].parse::<u8>().map_err(|_| bad_value())?,
                })
            }
            'L' => FieldData::Bool(matches!(
                text.to_lowercase().chars().next(),
                Some('t') | Some('y')
            )),
            _ => FieldData::Text(text.to_string()),
        };
        Ok(fd)
    }

    /// Renders the value as exactly `field.field_length` bytes.
    pub fn to_dbf_bytes(&self, field: &AttributeField) -> Vec<u8> {
        let fl = field.field_length as usize;
        let (s, right_align) = match self {
            FieldData::Null => (String::new(), false),
            FieldData::Int(v) => (v.to_string(), true),
            FieldData::Real(v) => (format!("{:.*}", field.decimal_count as usize, v), true),
            FieldData::Bool(v) => (if *v { "T" } else { "F" }.to_string(), false),
            FieldData::Date(v) => (v.to_string(), false),
            FieldData::Text(v) => (v.clone(), false),
        };
        let mut bytes = s.into_bytes();
        if bytes.len() > fl {
            if right_align {
                bytes = bytes[bytes.len() - fl..].to_vec();
            } else {
                bytes.truncate(fl);
            }
        }
        let padding = vec![b' '; fl - bytes.len()];
        if right_align {
            [padding, bytes].concat()
        } else {
            [bytes, padding].concat()
        }
    }
}

impl fmt::Display for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldData::Int(v) => write!(f, "{}", v),
            FieldData::Real(v) => write!(f, "{}", v),
            FieldData::Text(v) => write!(f, "{}", v),
            FieldData::Date(v) => write!(f, "{}", v),
            FieldData::Bool(v) => write!(f, "{}", v),
            FieldData::Null => write!(f, "null"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttributeField {
    pub name: String,
    pub field_type: char,
    pub field_length: u8,
    pub decimal_count: u8,
}

impl AttributeField {
    pub fn new(name: &str, field_type: char, field_length: u8, decimal_count: u8) -> AttributeField {
        AttributeField {
            name: name.to_string(),
            field_type,
            field_length,
            decimal_count,
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct ShapefileAttributes {
    pub header: AttributeHeader,
    pub fields: Vec<AttributeField>,
    data: Vec<Vec<FieldData>>,
    pub is_deleted: Vec<bool>,
}

impl ShapefileAttributes {
    pub fn add_field(&mut self, field: &AttributeField) {
        self.fields.push(field.clone());
        self.header.num_fields = self.fields.len() as u32;
        for rec in self.data.iter_mut() {
            rec.push(FieldData::Null);
        }
    }

    pub fn add_record(&mut self, rec: Vec<FieldData>, deleted: bool) {
        self.data.push(rec);
        self.is_deleted.push(deleted);
        self.header.num_records = self.data.len() as u32;
    }

    pub fn get_record(&self, index: usize) -> &[FieldData] {
        &self.data[index]
    }

    pub fn get_num_records(&self) -> usize {
        self.data.len()
    }

    pub fn get_field_num(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Value of the named field for a record; Null if the field does not exist.
    pub fn get_value(&self, record_index: usize, field_name: &str) -> FieldData {
        match self.get_field_num(field_name) {
            Some(j) => self.data[record_index]
                .get(j)
                .cloned()
                .unwrap_or(FieldData::Null),
            None => FieldData::Null,
        }
    }

    pub fn is_field_numeric(&self, index: usize) -> bool {
        match self.fields.get(index) {
            Some(f) => matches!(f.field_type, 'N' | 'F' | 'I' | 'O'),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_numeric_fields() {
        let n = AttributeField::new("RD03alt", 'N', 12, 3);
        assert_eq!(FieldData::parse("-4.250", &n).unwrap(), FieldData::Real(-4.25));
        let i = AttributeField::new("FID", 'N', 9, 0);
        assert_eq!(FieldData::parse("42", &i).unwrap(), FieldData::Int(42));
        assert_eq!(FieldData::parse("   ", &i).unwrap(), FieldData::Null);
        assert!(FieldData::parse("abc", &n).is_err());
    }

    #[test]
    fn test_dbf_cell_padding() {
        let n = AttributeField::new("DEPTH", 'N', 8, 2);
        assert_eq!(FieldData::Real(3.14159).to_dbf_bytes(&n), b"    3.14".to_vec());
        let c = AttributeField::new("CHAN_TYPE", 'C', 6, 0);
        assert_eq!(
            FieldData::Text("SUPPLY".to_string()).to_dbf_bytes(&c),
            b"SUPPLY".to_vec()
        );
        assert_eq!(FieldData::Text("ESC".to_string()).to_dbf_bytes(&c), b"ESC   ".to_vec());
        assert_eq!(FieldData::Null.to_dbf_bytes(&c), b"      ".to_vec());
    }

    #[test]
    fn test_get_value_by_name() {
        let mut atts = ShapefileAttributes::default();
        atts.add_field(&AttributeField::new("CHAN_TYPE", 'C', 10, 0));
        atts.add_record(vec![FieldData::Text("SUPPLY".to_string())], false);
        assert_eq!(
            atts.get_value(0, "CHAN_TYPE"),
            FieldData::Text("SUPPLY".to_string())
        );
        assert_eq!(atts.get_value(0, "MISSING"), FieldData::Null);
        assert!(!atts.is_field_numeric(0));
    }
}
