//! Exported simulation output: geocoded points per timestep.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One geocoded sample of the combustion field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Combustion intensity (0.0-1.0)
    pub intensity: f64,
}

/// One timestep's exported snapshot. Point order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    points: Vec<FramePoint>,
}

impl Frame {
    /// Create an empty frame
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame from existing points
    #[must_use]
    pub fn from_points(points: Vec<FramePoint>) -> Self {
        Self { points }
    }

    pub(crate) fn push(&mut self, point: FramePoint) {
        self.points.push(point);
    }

    /// All points in this frame
    #[must_use]
    pub fn points(&self) -> &[FramePoint] {
        &self.points
    }

    /// Number of points
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the frame has no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over points
    pub fn iter(&self) -> std::slice::Iter<'_, FramePoint> {
        self.points.iter()
    }

    /// Highest intensity in the frame, if any
    #[must_use]
    pub fn peak_intensity(&self) -> Option<f64> {
        self.points.iter().map(|p| p.intensity).reduce(f64::max)
    }

    /// Bounding box as `(min_lat, max_lat, min_lon, max_lon)`
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.points.first()?;
        let init = (
            first.latitude,
            first.latitude,
            first.longitude,
            first.longitude,
        );
        Some(self.points.iter().fold(init, |(lat0, lat1, lon0, lon1), p| {
            (
                lat0.min(p.latitude),
                lat1.max(p.latitude),
                lon0.min(p.longitude),
                lon1.max(p.longitude),
            )
        }))
    }

    /// GeoJSON `FeatureCollection` of `Point` features.
    ///
    /// Coordinates are `[longitude, latitude]` as GeoJSON requires; intensity
    /// goes into each feature's properties.
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .points
            .iter()
            .map(|p| {
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [p.longitude, p.latitude] },
                    "properties": { "intensity": p.intensity },
                })
            })
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a FramePoint;
    type IntoIter = std::slice::Iter<'a, FramePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Ordered frames of a finished run. Index is timestep order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    frames: Vec<Frame>,
}

impl History {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the history has no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames in timestep order
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at a timestep index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Iterate over frames in timestep order
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Index of the frame with the most points (earliest wins ties)
    #[must_use]
    pub fn peak_frame(&self) -> Option<usize> {
        self.frames
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, usize)>, (i, frame)| match best {
                Some((_, len)) if len >= frame.len() => best,
                _ => Some((i, frame.len())),
            })
            .map(|(i, _)| i)
    }

    /// Total number of points across all frames
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }

    /// One GeoJSON `FeatureCollection` per frame
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        Value::Array(self.frames.iter().map(Frame::to_geojson).collect())
    }

    /// Consume the history, returning its frames
    #[must_use]
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl FromIterator<Frame> for History {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64, intensity: f64) -> FramePoint {
        FramePoint {
            latitude,
            longitude,
            intensity,
        }
    }

    #[test]
    fn test_frame_serializes_as_point_array() {
        let frame = Frame::from_points(vec![point(38.5, -121.5, 0.75)]);
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"[{"latitude":38.5,"longitude":-121.5,"intensity":0.75}]"#
        );
    }

    #[test]
    fn test_geojson_uses_lon_lat_order() {
        let frame = Frame::from_points(vec![point(38.5, -121.5, 0.6)]);
        let geo = frame.to_geojson();
        assert_eq!(geo["type"], "FeatureCollection");
        let coords = &geo["features"][0]["geometry"]["coordinates"];
        assert_eq!(coords[0], -121.5);
        assert_eq!(coords[1], 38.5);
        assert_eq!(geo["features"][0]["properties"]["intensity"], 0.6);
    }

    #[test]
    fn test_bounds_and_peak() {
        let frame = Frame::from_points(vec![
            point(38.5, -121.5, 0.2),
            point(38.6, -121.7, 0.9),
            point(38.4, -121.4, 0.5),
        ]);
        assert_eq!(frame.bounds(), Some((38.4, 38.6, -121.7, -121.4)));
        assert_eq!(frame.peak_intensity(), Some(0.9));
        assert_eq!(Frame::new().bounds(), None);
        assert_eq!(Frame::new().peak_intensity(), None);
    }

    #[test]
    fn test_history_peak_frame() {
        let history: History = vec![
            Frame::from_points(vec![point(0.0, 0.0, 0.5)]),
            Frame::from_points(vec![point(0.0, 0.0, 0.5), point(0.1, 0.0, 0.5)]),
            Frame::from_points(vec![point(0.0, 0.0, 0.5), point(0.1, 0.0, 0.5)]),
        ]
        .into_iter()
        .collect();
        assert_eq!(history.peak_frame(), Some(1));
        assert_eq!(history.total_points(), 5);
        assert_eq!(History::default().peak_frame(), None);
    }
}
