/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT

Notes: The logic behind working with the ESRI Shapefile format.
*/
pub mod attributes;
pub mod geometry;

pub use self::attributes::{
    AttributeField, AttributeHeader, DateData, FieldData, ShapefileAttributes,
};
pub use self::geometry::{ShapeType, ShapeTypeDimension, ShapefileGeometry};
use crate::utils::{ByteOrderReader, Endianness};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use chrono::prelude::*;
use std::f64;
use std::fmt;
use std::fs;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufWriter, Error, ErrorKind};
use std::path::Path;

// 100 bytes in size
#[derive(Default, Clone, Debug)]
pub struct ShapefileHeader {
    file_code: i32,            // BigEndian; value is 9994
    pub file_length: i32,      // BigEndian; in 16-bit words
    pub version: i32,          // LittleEndian
    pub shape_type: ShapeType, // LittleEndian
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_min: f64, // set to 0f64 if shapeType not z or measured
    pub z_max: f64,
    pub m_min: f64,
    pub m_max: f64,
}

impl fmt::Display for ShapefileHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "file_code: {}\nfile_length: {}\nversion: {}\nshape_type: {}\nx_min: {}\nx_max: {}\ny_min: {}\ny_max: {}",
            self.file_code,
            self.file_length,
            self.version,
            self.shape_type,
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max
        )
    }
}

#[derive(Default, Clone, Debug)]
pub struct Shapefile {
    pub file_name: String,
    pub file_mode: String,
    pub header: ShapefileHeader,
    pub num_records: usize,
    pub records: Vec<ShapefileGeometry>,
    pub attributes: ShapefileAttributes,
    pub projection: String,
}

impl Shapefile {
    /// Opens an existing shapefile for reading.
    pub fn read(file_name: &str) -> Result<Shapefile, Error> {
        let mut sf = Shapefile {
            file_name: file_name.to_string(),
            file_mode: "r".to_string(),
            ..Default::default()
        };
        sf.read_file()?;
        Ok(sf)
    }

    /// Creates an empty shapefile in write mode.
    pub fn new(file_name: &str, shape_type: ShapeType) -> Result<Shapefile, Error> {
        let mut sf = Shapefile {
            file_name: file_name.to_string(),
            file_mode: "w".to_string(),
            ..Default::default()
        };
        sf.header.shape_type = shape_type;
        Ok(sf)
    }

    /// Creates an empty write-mode shapefile sharing another file's projection
    /// and, optionally, its attribute fields.
    pub fn initialize_using_file(
        file_name: &str,
        other: &Shapefile,
        shape_type: ShapeType,
        copy_fields: bool,
    ) -> Result<Shapefile, Error> {
        let mut sf = Shapefile::new(file_name, shape_type)?;
        sf.projection = other.projection.clone();
        if copy_fields {
            for field in &other.attributes.fields {
                sf.attributes.add_field(field);
            }
        }
        Ok(sf)
    }

    pub fn get_record(&self, index: usize) -> &ShapefileGeometry {
        &self.records[index]
    }

    pub fn add_record(&mut self, geometry: ShapefileGeometry) {
        self.records.push(geometry);
        self.num_records = self.records.len();
    }

    pub fn get_short_filename(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn sidecar(&self, extension: &str) -> String {
        Path::new(&self.file_name)
            .with_extension(extension)
            .to_string_lossy()
            .to_string()
    }

    fn read_file(&mut self) -> Result<(), Error> {
        ///////////////////////////////
        // First read the geometries //
        ///////////////////////////////
        let buffer = fs::read(&self.file_name).map_err(|e| {
            Error::new(e.kind(), format!("Could not open {}: {}", self.file_name, e))
        })?;
        let file_size = buffer.len();
        if file_size < 100 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{} is too short to be a shapefile.", self.file_name),
            ));
        }

        // The shapefile format uses mixed endianness, so the reader switches
        // byte order as it goes.
        let mut bor = ByteOrderReader::new(buffer, Endianness::BigEndian);
        self.header.file_code = bor.read_i32()?;
        if self.header.file_code != 9994 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("{} is not a valid shapefile.", self.file_name),
            ));
        }
        bor.seek(24);
        self.header.file_length = bor.read_i32()?;

        // the rest of the header is in LittleEndian format
        bor.byte_order = Endianness::LittleEndian;
        self.header.version = bor.read_i32()?;
        self.header.shape_type = ShapeType::from_int(bor.read_i32()?)?;
        self.header.x_min = bor.read_f64()?;
        self.header.y_min = bor.read_f64()?;
        self.header.x_max = bor.read_f64()?;
        self.header.y_max = bor.read_f64()?;
        self.header.z_min = bor.read_f64()?;
        self.header.z_max = bor.read_f64()?;
        self.header.m_min = bor.read_f64()?;
        self.header.m_max = bor.read_f64()?;

        // record headers are big-endian, contents little-endian
        while bor.remaining() >= 8 {
            bor.byte_order = Endianness::BigEndian;
            let _record_number = bor.read_i32()?;
            let content_length = bor.read_i32()?.max(0) as usize * 2;
            let content_start = bor.pos;
            bor.byte_order = Endianness::LittleEndian;
            let sfg = ShapefileGeometry::read(&mut bor, content_length)?;
            self.records.push(sfg);
            bor.seek(content_start + content_length);
        }
        self.num_records = self.records.len();

        //////////////////////////////
        // Read the projection file //
        //////////////////////////////
        if let Ok(prj) = fs::read_to_string(self.sidecar("prj")) {
            self.projection = prj.lines().collect::<Vec<&str>>().join("");
        }

        ///////////////////////////////
        // Read the attributes table //
        ///////////////////////////////
        let dbf_file = self.sidecar("dbf");
        let buffer = fs::read(&dbf_file)
            .map_err(|e| Error::new(e.kind(), format!("Could not open {}: {}", dbf_file, e)))?;
        let mut bor = ByteOrderReader::new(buffer, Endianness::LittleEndian);
        let header = &mut self.attributes.header;
        header.version = bor.read_u8()?;
        header.year = 1900u32 + bor.read_u8()? as u32;
        header.month = bor.read_u8()?;
        header.day = bor.read_u8()?;
        let num_records = bor.read_u32()?;
        header.bytes_in_header = bor.read_u16()?;
        header.bytes_in_record = bor.read_u16()?;
        let bytes_in_header = header.bytes_in_header as usize;
        bor.seek(32);

        // field descriptor array, terminated by 0x0d
        let mut fields = vec![];
        while bor.pos + 32 <= bytes_in_header && bor.peek_u8()? != 0x0d {
            let name = bor.read_utf8(11)?.replace(char::from(0), "");
            let field_type = char::from(bor.read_u8()?);
            bor.pos += 4;
            let field_length = bor.read_u8()?;
            let decimal_count = bor.read_u8()?;
            bor.pos += 14;
            fields.push(AttributeField::new(
                name.trim(),
                field_type,
                field_length,
                decimal_count,
            ));
        }
        for field in &fields {
            self.attributes.add_field(field);
        }

        bor.seek(bytes_in_header);
        for _ in 0..num_records {
            let deleted = bor.read_u8()? == 0x2A;
            let mut rec: Vec<FieldData> = Vec::with_capacity(fields.len());
            for field in &fields {
                let text = bor.read_utf8(field.field_length as usize)?;
                let text = text.replace(char::from(0), "");
                rec.push(FieldData::parse(text.trim(), field)?);
            }
            self.attributes.add_record(rec, deleted);
        }

        if self.attributes.get_num_records() != self.num_records {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "{} has {} geometries but {} attribute records.",
                    self.file_name,
                    self.num_records,
                    self.attributes.get_num_records()
                ),
            ));
        }

        Ok(())
    }

    /// Writes the .shp, .shx, .dbf, and (when a projection is set) .prj files.
    /// A shapefile with no records is valid and is written with a zero extent.
    pub fn write(&mut self) -> Result<(), Error> {
        if self.file_mode == "r" {
            return Err(Error::new(
                ErrorKind::Other,
                "The file was opened in read-only mode.",
            ));
        }
        self.num_records = self.records.len();
        if self.attributes.get_num_records() != self.num_records {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The number of attribute records does not match the number of geometries.",
            ));
        }
        self.calculate_extent();

        /////////////////////////////////////////////////
        // Write the geometry and index (.shp, .shx)   //
        /////////////////////////////////////////////////
        let mut size = 100i32;
        for rec in &self.records {
            size += 8 + rec.get_length();
        }
        let shx_size = 100i32 + 8 * self.num_records as i32;

        let mut shp = BufWriter::new(File::create(&self.file_name)?);
        let mut shx = BufWriter::new(File::create(self.sidecar("shx"))?);
        self.write_main_header(&mut shp, size / 2)?;
        self.write_main_header(&mut shx, shx_size / 2)?;

        let mut offset = 100i32;
        for (i, rec) in self.records.iter().enumerate() {
            let content_length = rec.get_length() / 2;
            shx.write_i32::<BigEndian>(offset / 2)?;
            shx.write_i32::<BigEndian>(content_length)?;
            shp.write_i32::<BigEndian>(i as i32 + 1i32)?; // Record number
            shp.write_i32::<BigEndian>(content_length)?; // Content length in 16-bit words
            rec.write(&mut shp)?;
            offset += 8 + rec.get_length();
        }
        shp.flush()?;
        shx.flush()?;

        ///////////////////////////////
        // Write the projection file //
        ///////////////////////////////
        if !self.projection.is_empty() {
            let mut writer = BufWriter::new(File::create(self.sidecar("prj"))?);
            writer.write_all(self.projection.as_bytes())?;
            writer.flush()?;
        }

        ///////////////////////////////
        // Write the attributes file //
        ///////////////////////////////
        let mut writer = BufWriter::new(File::create(self.sidecar("dbf"))?);
        self.attributes.header.version = 3;
        writer.write_u8(3u8)?;

        let now = Local::now();
        writer.write_u8((now.year() - 1900) as u8)?;
        writer.write_u8(now.month() as u8)?;
        writer.write_u8(now.day() as u8)?;

        let num_fields = self.attributes.fields.len();
        writer.write_u32::<LittleEndian>(self.num_records as u32)?;
        let header_size = 32u16 + num_fields as u16 * 32u16 + 1u16;
        self.attributes.header.bytes_in_header = header_size;
        writer.write_u16::<LittleEndian>(header_size)?;

        let bytes_in_record = 1u16
            + self
                .attributes
                .fields
                .iter()
                .map(|f| f.field_length as u16)
                .sum::<u16>();
        self.attributes.header.bytes_in_record = bytes_in_record;
        writer.write_u16::<LittleEndian>(bytes_in_record)?;

        // reserved or unused bytes
        for _ in 0..20 {
            writer.write_u8(0u8)?;
        }

        // Field descriptor array
        for field in &self.attributes.fields {
            let mut name = field.name.as_bytes().to_vec();
            name.truncate(10);
            name.resize(11, 0u8);
            writer.write_all(&name)?;
            writer.write_u8(field.field_type as u8)?;
            for _ in 0..4 {
                writer.write_u8(0u8)?;
            }
            writer.write_u8(field.field_length)?;
            writer.write_u8(field.decimal_count)?;
            for _ in 0..14 {
                writer.write_u8(0u8)?;
            }
        }
        writer.write_u8(0x0D)?; // terminator byte

        for i in 0..self.num_records {
            writer.write_u8(if self.attributes.is_deleted[i] { 0x2A } else { 0x20 })?;
            let rec = self.attributes.get_record(i);
            for (j, field) in self.attributes.fields.iter().enumerate() {
                let value = rec.get(j).unwrap_or(&FieldData::Null);
                writer.write_all(&value.to_dbf_bytes(field))?;
            }
        }
        writer.write_u8(0x1A)?; // file terminator byte
        writer.flush()?;

        Ok(())
    }

    fn write_main_header<W: Write>(&self, writer: &mut W, length_in_words: i32) -> Result<(), Error> {
        writer.write_i32::<BigEndian>(9994i32)?;
        for _ in 0..5 {
            writer.write_i32::<BigEndian>(0i32)?;
        }
        writer.write_i32::<BigEndian>(length_in_words)?;
        writer.write_i32::<LittleEndian>(1000i32)?;
        writer.write_i32::<LittleEndian>(self.header.shape_type.to_int())?;
        writer.write_f64::<LittleEndian>(self.header.x_min)?;
        writer.write_f64::<LittleEndian>(self.header.y_min)?;
        writer.write_f64::<LittleEndian>(self.header.x_max)?;
        writer.write_f64::<LittleEndian>(self.header.y_max)?;
        writer.write_f64::<LittleEndian>(self.header.z_min)?;
        writer.write_f64::<LittleEndian>(self.header.z_max)?;
        writer.write_f64::<LittleEndian>(self.header.m_min)?;
        writer.write_f64::<LittleEndian>(self.header.m_max)?;
        Ok(())
    }

    fn calculate_extent(&mut self) {
        let mut h = ShapefileHeader {
            file_code: 9994,
            version: 1000,
            shape_type: self.header.shape_type,
            x_min: f64::INFINITY,
            y_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_max: f64::NEG_INFINITY,
            z_min: f64::INFINITY,
            z_max: f64::NEG_INFINITY,
            m_min: f64::INFINITY,
            m_max: f64::NEG_INFINITY,
            ..Default::default()
        };
        for rec in &self.records {
            for p in &rec.points {
                h.x_min = h.x_min.min(p.x);
                h.x_max = h.x_max.max(p.x);
                h.y_min = h.y_min.min(p.y);
                h.y_max = h.y_max.max(p.y);
            }
            for z in &rec.z_array {
                h.z_min = h.z_min.min(*z);
                h.z_max = h.z_max.max(*z);
            }
            for m in &rec.m_array {
                h.m_min = h.m_min.min(*m);
                h.m_max = h.m_max.max(*m);
            }
        }
        for v in [
            &mut h.x_min,
            &mut h.x_max,
            &mut h.y_min,
            &mut h.y_max,
            &mut h.z_min,
            &mut h.z_max,
            &mut h.m_min,
            &mut h.m_max,
        ] {
            if !v.is_finite() {
                *v = 0f64;
            }
        }
        h.file_length = self.header.file_length;
        self.header = h;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::structures::Point2D;

    #[test]
    fn test_write_then_read_points() {
        let dir = tempfile::tempdir().unwrap();
        let file_name = dir.path().join("depths.shp").to_string_lossy().to_string();
        let mut output = Shapefile::new(&file_name, ShapeType::Point).unwrap();
        output.projection = "PROJCS[\"test\"]".to_string();
        output
            .attributes
            .add_field(&AttributeField::new("RD03alt", 'N', 12, 4));
        for (i, (x, y)) in [(1.0, 2.0), (3.5, -4.0)].iter().enumerate() {
            let mut sfg = ShapefileGeometry::new(ShapeType::Point);
            sfg.add_point(Point2D::new(*x, *y));
            output.add_record(sfg);
            output
                .attributes
                .add_record(vec![FieldData::Real(-1.5 * (i + 1) as f64)], false);
        }
        output.write().unwrap();

        let input = Shapefile::read(&file_name).unwrap();
        assert_eq!(input.num_records, 2);
        assert_eq!(input.header.shape_type, ShapeType::Point);
        assert_eq!(input.get_record(1).points[0], Point2D::new(3.5, -4.0));
        assert_eq!(input.attributes.get_value(1, "RD03alt"), FieldData::Real(-3.0));
        assert_eq!(input.projection, "PROJCS[\"test\"]");
        assert_eq!(input.header.y_min, -4.0);
        assert!(dir.path().join("depths.shx").exists());
    }

    #[test]
    fn test_empty_shapefile_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let file_name = dir.path().join("empty.shp").to_string_lossy().to_string();
        let mut output = Shapefile::new(&file_name, ShapeType::PolyLine).unwrap();
        output
            .attributes
            .add_field(&AttributeField::new("CHAN_TYPE", 'C', 10, 0));
        output.write().unwrap();
        let input = Shapefile::read(&file_name).unwrap();
        assert_eq!(input.num_records, 0);
        assert_eq!(input.attributes.fields.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(Shapefile::read("/nonexistent/nothing.shp").is_err());
    }
}
