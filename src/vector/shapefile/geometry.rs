/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::algorithms::{
    is_clockwise_order, point_in_poly, point_on_poly_boundary, point_polyline_distance,
};
use crate::structures::{BoundingBox, Point2D};
use crate::utils::ByteOrderReader;
use byteorder::{LittleEndian, WriteBytesExt};
use std::f64;
use std::fmt;
use std::io::{Error, ErrorKind, Write};
use std::ops::Range;

#[derive(Clone, Debug)]
pub struct ShapefileGeometry {
    pub shape_type: ShapeType,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub num_parts: i32,
    pub num_points: i32,
    pub parts: Vec<i32>,
    pub points: Vec<Point2D>,
    pub z_min: f64,
    pub z_max: f64,
    pub z_array: Vec<f64>,
    pub m_min: f64,
    pub m_max: f64,
    pub m_array: Vec<f64>,
}

impl ShapefileGeometry {
    /// ShapefileGeometry constructor method.
    pub fn new(shape_type: ShapeType) -> ShapefileGeometry {
        ShapefileGeometry {
            shape_type,
            ..Default::default()
        }
    }

    fn update_extent(&mut self, p: &Point2D) {
        if p.x < self.x_min {
            self.x_min = p.x;
        }
        if p.x > self.x_max {
            self.x_max = p.x;
        }
        if p.y < self.y_min {
            self.y_min = p.y;
        }
        if p.y > self.y_max {
            self.y_max = p.y;
        }
    }

    /// Adds a single Point2D to the ShapefileGeometry's points array.
    pub fn add_point(&mut self, p: Point2D) {
        self.update_extent(&p);
        self.points.push(p);
        self.num_points += 1;
    }

    /// Adds a single Point2D, measure, and z-value to the ShapefileGeometry.
    pub fn add_pointz(&mut self, p: Point2D, m: f64, z: f64) {
        self.add_point(p);
        self.m_array.push(m);
        self.z_array.push(z);
        self.m_min = self.m_min.min(m);
        self.m_max = self.m_max.max(m);
        self.z_min = self.z_min.min(z);
        self.z_max = self.z_max.max(z);
    }

    /// Adds a part of Point2Ds to the ShapefileGeometry.
    pub fn add_part(&mut self, points: &[Point2D]) {
        self.parts.push(self.points.len() as i32);
        self.num_parts += 1i32;
        for p in points {
            self.update_extent(p);
            self.points.push(*p);
        }
        self.num_points += points.len() as i32;
    }

    /// Adds a part of Point2Ds and z-values to the ShapefileGeometry. Measures are set to zero.
    pub fn add_partz(&mut self, points: &[Point2D], z_values: &[f64]) -> Result<(), Error> {
        if points.len() != z_values.len() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Error adding part to ShapefileGeometry. Points and z array must be equal length.",
            ));
        }
        self.add_part(points);
        for z in z_values {
            self.z_array.push(*z);
            self.z_min = self.z_min.min(*z);
            self.z_max = self.z_max.max(*z);
            self.m_array.push(0f64);
        }
        self.m_min = 0f64;
        self.m_max = 0f64;
        Ok(())
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.x_min, self.x_max, self.y_min, self.y_max)
    }

    /// The range of indices into `points` occupied by a part. Geometries
    /// without parts (points, multipoints) are treated as one part.
    pub fn get_part_range(&self, part: usize) -> Range<usize> {
        if self.parts.is_empty() {
            return 0..self.points.len();
        }
        let start = (self.parts[part].max(0) as usize).min(self.points.len());
        let end = if part + 1 < self.parts.len() {
            (self.parts[part + 1].max(0) as usize).min(self.points.len())
        } else {
            self.points.len()
        };
        start..end.max(start)
    }

    /// The points of one part.
    pub fn get_part(&self, part: usize) -> &[Point2D] {
        &self.points[self.get_part_range(part)]
    }

    /// Number of parts, counting a part-less geometry as one.
    pub fn part_count(&self) -> usize {
        if self.parts.is_empty() {
            1
        } else {
            self.parts.len()
        }
    }

    /// Checks whether or not a part in a polygon is a hole. Holes are rings
    /// with vertices in counter-clockwise order.
    pub fn is_hole(&self, part_num: usize) -> bool {
        if self.shape_type.base_shape_type() != ShapeType::Polygon {
            return false;
        }
        if part_num >= self.parts.len() {
            return false;
        }
        let ring = self.get_part(part_num);
        if ring.len() < 3 {
            return false;
        }
        !is_clockwise_order(ring)
    }

    /// Returns the length of the record content (shape type onwards), in bytes.
    pub fn get_length(&self) -> i32 {
        4i32 + match self.shape_type {
            ShapeType::Null => 0i32,
            ShapeType::Point => 16i32,
            ShapeType::MultiPoint => 36i32 + self.num_points * 16i32,
            ShapeType::PolyLine | ShapeType::Polygon => {
                40i32 + self.num_parts * 4i32 + self.num_points * 16i32
            }
            ShapeType::PointM => 24i32,
            ShapeType::MultiPointM => 52i32 + self.num_points * 24i32,
            ShapeType::PolyLineM | ShapeType::PolygonM => {
                56i32 + self.num_parts * 4i32 + self.num_points * 24i32
            }
            ShapeType::PointZ => 32i32,
            ShapeType::MultiPointZ => 68i32 + self.num_points * 32i32,
            ShapeType::PolyLineZ | ShapeType::PolygonZ => {
                72i32 + self.num_parts * 4i32 + self.num_points * 32i32
            }
        }
    }

    /// Reads one record's content (shape type onwards). `content_length` is in
    /// bytes and is used to detect optional measure blocks.
    pub fn read(bor: &mut ByteOrderReader, content_length: usize) -> Result<ShapefileGeometry, Error> {
        let content_start = bor.pos;
        let shape_type = ShapeType::from_int(bor.read_i32()?)?;
        let mut sfg = ShapefileGeometry::new(shape_type);
        match shape_type {
            ShapeType::Null => {}
            ShapeType::Point | ShapeType::PointM | ShapeType::PointZ => {
                let p = Point2D::new(bor.read_f64()?, bor.read_f64()?);
                sfg.add_point(p);
                if shape_type == ShapeType::PointZ {
                    let z = bor.read_f64()?;
                    sfg.z_array.push(z);
                    sfg.z_min = z;
                    sfg.z_max = z;
                }
                if shape_type != ShapeType::Point && bor.pos - content_start + 8 <= content_length {
                    let m = bor.read_f64()?;
                    sfg.m_array.push(m);
                    sfg.m_min = m;
                    sfg.m_max = m;
                }
            }
            _ => {
                // skip the stored box; it is rebuilt from the points
                for _ in 0..4 {
                    bor.read_f64()?;
                }
                let has_parts = shape_type.base_shape_type() != ShapeType::MultiPoint;
                let num_parts = if has_parts { bor.read_i32()? } else { 0 };
                let num_points = bor.read_i32()?;
                if num_parts < 0 || num_points < 0 {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        "Negative part or point count in shapefile record.",
                    ));
                }
                let needed = 4 * num_parts as usize + 16 * num_points as usize;
                if bor.pos - content_start + needed > content_length {
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        format!(
                            "Shapefile record claims {} parts and {} points, more than its {} bytes can hold.",
                            num_parts, num_points, content_length
                        ),
                    ));
                }
                let mut parts = Vec::with_capacity(num_parts as usize);
                for _ in 0..num_parts {
                    parts.push(bor.read_i32()?);
                }
                let mut points = Vec::with_capacity(num_points as usize);
                for _ in 0..num_points {
                    points.push(Point2D::new(bor.read_f64()?, bor.read_f64()?));
                }
                for p in &points {
                    sfg.add_point(*p);
                }
                sfg.parts = parts;
                sfg.num_parts = num_parts;

                if shape_type.dimension() == ShapeTypeDimension::Z {
                    sfg.z_min = bor.read_f64()?;
                    sfg.z_max = bor.read_f64()?;
                    for _ in 0..num_points {
                        sfg.z_array.push(bor.read_f64()?);
                    }
                }
                let m_block = 16 + 8 * num_points as usize;
                if shape_type.dimension() != ShapeTypeDimension::XY
                    && bor.pos - content_start + m_block <= content_length
                {
                    sfg.m_min = bor.read_f64()?;
                    sfg.m_max = bor.read_f64()?;
                    for _ in 0..num_points {
                        sfg.m_array.push(bor.read_f64()?);
                    }
                }
            }
        }
        Ok(sfg)
    }

    /// Writes the record content (shape type onwards) in little-endian order.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writer.write_i32::<LittleEndian>(self.shape_type.to_int())?;
        let dimension = self.shape_type.dimension();
        let z_or_zero = |i: usize, a: &Vec<f64>| *a.get(i).unwrap_or(&0f64);
        match self.shape_type {
            ShapeType::Null => {}
            ShapeType::Point | ShapeType::PointM | ShapeType::PointZ => {
                let p = self.points.first().copied().unwrap_or_default();
                writer.write_f64::<LittleEndian>(p.x)?;
                writer.write_f64::<LittleEndian>(p.y)?;
                if dimension == ShapeTypeDimension::Z {
                    writer.write_f64::<LittleEndian>(z_or_zero(0, &self.z_array))?;
                }
                if dimension != ShapeTypeDimension::XY {
                    writer.write_f64::<LittleEndian>(z_or_zero(0, &self.m_array))?;
                }
            }
            _ => {
                let bb = self.extent_or_zero();
                writer.write_f64::<LittleEndian>(bb.min_x)?;
                writer.write_f64::<LittleEndian>(bb.min_y)?;
                writer.write_f64::<LittleEndian>(bb.max_x)?;
                writer.write_f64::<LittleEndian>(bb.max_y)?;
                if self.shape_type.base_shape_type() != ShapeType::MultiPoint {
                    writer.write_i32::<LittleEndian>(self.num_parts)?;
                }
                writer.write_i32::<LittleEndian>(self.num_points)?;
                if self.shape_type.base_shape_type() != ShapeType::MultiPoint {
                    for part in &self.parts {
                        writer.write_i32::<LittleEndian>(*part)?;
                    }
                }
                for pt in &self.points {
                    writer.write_f64::<LittleEndian>(pt.x)?;
                    writer.write_f64::<LittleEndian>(pt.y)?;
                }
                if dimension == ShapeTypeDimension::Z {
                    let (z_min, z_max) = min_max_or_zero(&self.z_array);
                    writer.write_f64::<LittleEndian>(z_min)?;
                    writer.write_f64::<LittleEndian>(z_max)?;
                    for i in 0..self.points.len() {
                        writer.write_f64::<LittleEndian>(z_or_zero(i, &self.z_array))?;
                    }
                }
                if dimension != ShapeTypeDimension::XY {
                    let (m_min, m_max) = min_max_or_zero(&self.m_array);
                    writer.write_f64::<LittleEndian>(m_min)?;
                    writer.write_f64::<LittleEndian>(m_max)?;
                    for i in 0..self.points.len() {
                        writer.write_f64::<LittleEndian>(z_or_zero(i, &self.m_array))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether a point falls inside the polygon: inside at least one outer
    /// ring and inside none of the holes. Always false for non-polygons.
    pub fn contains_point(&self, p: &Point2D) -> bool {
        if self.shape_type.base_shape_type() != ShapeType::Polygon || self.points.is_empty() {
            return false;
        }
        if !self.get_bounding_box().is_point_in_box(p.x, p.y) {
            return false;
        }
        let mut in_outer = false;
        for part in 0..self.part_count() {
            if point_in_poly(p, self.get_part(part)) {
                if self.is_hole(part) {
                    return false;
                }
                in_outer = true;
            }
        }
        in_outer
    }

    /// Whether a point lies within `tolerance` of any ring of the polygon.
    pub fn is_on_boundary(&self, p: &Point2D, tolerance: f64) -> bool {
        if self.shape_type.base_shape_type() != ShapeType::Polygon {
            return false;
        }
        (0..self.part_count()).any(|part| point_on_poly_boundary(p, self.get_part(part), tolerance))
    }

    /// Minimum planar distance from a point to this geometry. Polygons are
    /// solid, so interior points are at distance zero. Null shapes are
    /// infinitely far away.
    pub fn distance_to_point(&self, p: &Point2D) -> f64 {
        match self.shape_type.base_shape_type() {
            ShapeType::Null => f64::INFINITY,
            ShapeType::Point | ShapeType::MultiPoint => self
                .points
                .iter()
                .map(|q| q.distance(p))
                .fold(f64::INFINITY, f64::min),
            ShapeType::Polygon if self.contains_point(p) => 0f64,
            _ => {
                let closes_ring = self.shape_type.base_shape_type() == ShapeType::Polygon;
                let mut min_dist = f64::INFINITY;
                for part in 0..self.part_count() {
                    let vertices = self.get_part(part);
                    let d = if closes_ring && vertices.len() > 2 && !vertices[0].nearly_equals(&vertices[vertices.len() - 1]) {
                        let mut ring = vertices.to_vec();
                        ring.push(vertices[0]);
                        point_polyline_distance(p, &ring)
                    } else {
                        point_polyline_distance(p, vertices)
                    };
                    min_dist = min_dist.min(d);
                }
                min_dist
            }
        }
    }

    fn extent_or_zero(&self) -> BoundingBox {
        if self.points.is_empty() {
            BoundingBox::new(0f64, 0f64, 0f64, 0f64)
        } else {
            self.get_bounding_box()
        }
    }
}

fn min_max_or_zero(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0f64, 0f64);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

impl Default for ShapefileGeometry {
    fn default() -> ShapefileGeometry {
        ShapefileGeometry {
            shape_type: ShapeType::Null,
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
            num_parts: 0i32,
            num_points: 0i32,
            parts: vec![],
            points: vec![],
            z_min: f64::INFINITY,
            z_max: f64::NEG_INFINITY,
            z_array: vec![],
            m_min: f64::INFINITY,
            m_max: f64::NEG_INFINITY,
            m_array: vec![],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum ShapeType {
    #[default]
    Null = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
}

impl ShapeType {
    pub fn from_int(value: i32) -> Result<ShapeType, Error> {
        let st = match value {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Unrecognized ShapeType value {}.", value),
                ))
            }
        };
        Ok(st)
    }

    pub fn to_int(&self) -> i32 {
        *self as i32
    }

    pub fn base_shape_type(&self) -> ShapeType {
        match self {
            ShapeType::Null => ShapeType::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
                ShapeType::PolyLine
            }
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeType::MultiPoint
            }
        }
    }

    pub fn dimension(&self) -> ShapeTypeDimension {
        match self {
            ShapeType::PointZ
            | ShapeType::PolyLineZ
            | ShapeType::PolygonZ
            | ShapeType::MultiPointZ => ShapeTypeDimension::Z,
            ShapeType::PointM
            | ShapeType::PolyLineM
            | ShapeType::PolygonM
            | ShapeType::MultiPointM => ShapeTypeDimension::Measure,
            _ => ShapeTypeDimension::XY,
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeTypeDimension {
    XY,
    Measure,
    Z,
}
