#![allow(dead_code)]

use vc_marshal::object::{self, Marshalable};
use vc_marshal::primitive;
use vc_marshal::scalar::{self, Scalar};
use vc_marshal::{ErrorKind, Marshaller, Result, Unmarshaller};

// -----------------------------------------------------------------------------
// Shape

/// A shape whose wire layout depends on its leading `kind` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f64 },
    Rect { width: f32, height: f32 },
    Polygon { points: Vec<[i32; 2]> },
    Label { text: String, value: Scalar },
}

impl Default for Shape {
    fn default() -> Self {
        Self::Circle { radius: 0.0 }
    }
}

impl Shape {
    const CIRCLE: i32 = 1;
    const RECT: i32 = 2;
    const POLYGON: i32 = 3;
    const LABEL: i32 = 4;

    fn kind(&self) -> i32 {
        match self {
            Self::Circle { .. } => Self::CIRCLE,
            Self::Rect { .. } => Self::RECT,
            Self::Polygon { .. } => Self::POLYGON,
            Self::Label { .. } => Self::LABEL,
        }
    }
}

fn write_point(m: &mut dyn Marshaller, name: Option<&str>, point: &[i32; 2]) -> Result<()> {
    primitive::write_array(m, name, point)
}

fn read_point(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<[i32; 2]> {
    primitive::read_fixed(u, name)
}

impl Marshalable for Shape {
    fn marshal(&self, m: &mut dyn Marshaller, name: Option<&str>) -> Result<()> {
        m.open_map(name)?;
        m.write_i32(Some("kind"), self.kind())?;
        match self {
            Self::Circle { radius } => m.write_f64(Some("radius"), *radius)?,
            Self::Rect { width, height } => {
                m.write_f32(Some("width"), *width)?;
                m.write_f32(Some("height"), *height)?;
            }
            Self::Polygon { points } => object::marshal_slice_with(m, Some("points"), points, write_point)?,
            Self::Label { text, value } => {
                m.write_str(Some("text"), text)?;
                scalar::marshal_scalar(m, Some("value"), value)?;
            }
        }
        m.close_map()
    }

    fn unmarshal(&mut self, u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<()> {
        u.open_map(name)?;
        *self = match u.read_i32(Some("kind"))? {
            Self::CIRCLE => Self::Circle {
                radius: u.read_f64(Some("radius"))?,
            },
            Self::RECT => Self::Rect {
                width: u.read_f32(Some("width"))?,
                height: u.read_f32(Some("height"))?,
            },
            Self::POLYGON => Self::Polygon {
                points: object::unmarshal_vec_with(u, Some("points"), read_point)?,
            },
            Self::LABEL => Self::Label {
                text: u.read_string(Some("text"))?,
                value: scalar::unmarshal_scalar(u, Some("value"))?,
            },
            other => return Err(u.fail(Some("kind"), ErrorKind::UnknownVariant(other))),
        };
        u.close_map()
    }
}

// -----------------------------------------------------------------------------
// Region

/// A circular region holding shapes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub center: [f64; 2],
    pub radius: f64,
    pub shapes: Vec<Shape>,
}

impl Marshalable for Region {
    fn marshal(&self, m: &mut dyn Marshaller, name: Option<&str>) -> Result<()> {
        m.open_map(name)?;
        m.write_str(Some("name"), &self.name)?;
        primitive::write_array(m, Some("center"), &self.center)?;
        m.write_f64(Some("radius"), self.radius)?;
        object::marshal_slice(m, Some("shapes"), &self.shapes)?;
        m.close_map()
    }

    fn unmarshal(&mut self, u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<()> {
        u.open_map(name)?;
        self.name = u.read_string(Some("name"))?;
        self.center = primitive::read_fixed(u, Some("center"))?;
        self.radius = u.read_f64(Some("radius"))?;
        self.shapes = object::unmarshal_vec(u, Some("shapes"))?;
        u.close_map()
    }
}

pub fn shapes() -> Vec<Shape> {
    vec![
        Shape::Circle { radius: 2.5 },
        Shape::Rect {
            width: 0.1,
            height: 3.0,
        },
        Shape::Polygon {
            points: vec![[0, 0], [4, 0], [-2, i32::MAX]],
        },
        Shape::Label {
            text: "origin".into(),
            value: Scalar::Long(i64::MIN),
        },
    ]
}

pub fn region() -> Region {
    Region {
        name: "disc".into(),
        center: [1.0, -1.0],
        radius: 10.0,
        shapes: shapes(),
    }
}

// -----------------------------------------------------------------------------
// Extremes

/// One field per primitive kind, filled with edge values.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extremes {
    pub ints: Vec<i32>,
    pub longs: Vec<i64>,
    pub floats: Vec<f32>,
    pub doubles: Vec<f64>,
    pub flags: Vec<bool>,
    pub texts: Vec<String>,
}

impl Marshalable for Extremes {
    fn marshal(&self, m: &mut dyn Marshaller, name: Option<&str>) -> Result<()> {
        m.open_map(name)?;
        primitive::write_array(m, Some("ints"), &self.ints)?;
        primitive::write_array(m, Some("longs"), &self.longs)?;
        primitive::write_array(m, Some("floats"), &self.floats)?;
        primitive::write_array(m, Some("doubles"), &self.doubles)?;
        primitive::write_array(m, Some("flags"), &self.flags)?;
        primitive::write_array(m, Some("texts"), &self.texts)?;
        m.close_map()
    }

    fn unmarshal(&mut self, u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<()> {
        u.open_map(name)?;
        self.ints = primitive::read_array(u, Some("ints"))?;
        self.longs = primitive::read_array(u, Some("longs"))?;
        self.floats = primitive::read_array(u, Some("floats"))?;
        self.doubles = primitive::read_array(u, Some("doubles"))?;
        self.flags = primitive::read_array(u, Some("flags"))?;
        self.texts = primitive::read_array(u, Some("texts"))?;
        u.close_map()
    }
}

pub fn extremes() -> Extremes {
    Extremes {
        ints: vec![i32::MIN, -1, 0, 1, i32::MAX],
        longs: vec![i64::MIN, 0, i64::MAX],
        floats: vec![f32::MIN, f32::MIN_POSITIVE, 0.0, 1.0e-7, f32::MAX],
        doubles: vec![f64::MIN, f64::MIN_POSITIVE, 0.0, f64::EPSILON, f64::MAX],
        flags: vec![true, false],
        texts: vec![String::new(), "plain".into(), "quote \" and \\ and \u{1F600}".into()],
    }
}
