//! Flat `[x0, y0, x1, y1, ...]` encoding for point lists.

use kurbo::Point;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serializer};

fn write_flat<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(points.len() * 2))?;
    for point in points {
        seq.serialize_element(&point.x)?;
        seq.serialize_element(&point.y)?;
    }
    seq.end()
}

fn read_flat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
    let raw = Vec::<f64>::deserialize(deserializer)?;
    if raw.len() % 2 != 0 {
        return Err(<D::Error as serde::de::Error>::custom(format!(
            "point list has odd length {}",
            raw.len()
        )));
    }
    Ok(raw.chunks_exact(2).map(|xy| Point::new(xy[0], xy[1])).collect())
}

/// Variable-length point lists.
pub mod list {
    use super::*;

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        write_flat(points, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        read_flat(deserializer)
    }
}

/// Fixed-length point lists (measurements, angles).
pub mod fixed {
    use super::*;

    pub fn serialize<S: Serializer, const N: usize>(
        points: &[Point; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        write_flat(points, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[Point; N], D::Error> {
        let points = read_flat(deserializer)?;
        if points.len() != N {
            return Err(<D::Error as serde::de::Error>::custom(format!(
                "expected {} points, found {}",
                N,
                points.len()
            )));
        }
        Ok(std::array::from_fn(|i| points[i]))
    }
}
