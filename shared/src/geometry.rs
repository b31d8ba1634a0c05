//! GeoJSON area handling: parsing, centroid and geodesic area

use geo::{
    coord, ChamberlainDuquetteArea, Coord, CoordsIter, LineString, MultiPolygon, Point, Polygon,
    Rect,
};
use geojson::GeoJson;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::Centroid;

/// Sphere radius behind `ChamberlainDuquetteArea` (WGS84 equatorial radius)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Half-width in degrees of the box used when a point is sent to an
/// area-based service
const POINT_BUFFER_DEG: f64 = 0.0005;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Unsupported geometry type: {0}")]
    Unsupported(String),

    #[error("Malformed geometry: {0}")]
    Malformed(String),
}

/// Supported area geometries. Polygon rings are always closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Geometry {
    /// Parse a bare geometry or a Feature wrapping one. Rings are closed if
    /// the caller left them open.
    pub fn from_geojson(value: &serde_json::Value) -> Result<Self, GeometryError> {
        let parsed = GeoJson::from_json_value(value.clone())
            .map_err(|e| GeometryError::Malformed(e.to_string()))?;

        let geometry = match parsed {
            GeoJson::Geometry(geometry) => geometry,
            GeoJson::Feature(feature) => feature
                .geometry
                .ok_or_else(|| GeometryError::Malformed("Feature without geometry".to_string()))?,
            GeoJson::FeatureCollection(_) => {
                return Err(GeometryError::Unsupported("FeatureCollection".to_string()))
            }
        };

        match geometry.value {
            geojson::Value::Point(position) => Ok(Geometry::Point(to_coord(&position)?.into())),
            geojson::Value::Polygon(rings) => Ok(Geometry::Polygon(to_polygon(&rings)?)),
            geojson::Value::MultiPolygon(polygons) => {
                if polygons.is_empty() {
                    return Err(GeometryError::Malformed(
                        "MultiPolygon has no polygons".to_string(),
                    ));
                }
                let polygons = polygons
                    .iter()
                    .map(|rings| to_polygon(rings))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
            }
            other => Err(GeometryError::Unsupported(type_name(&other).to_string())),
        }
    }

    /// Vertex-mean centroid; the closing vertex of each ring is not counted
    pub fn centroid(&self) -> Result<Centroid, GeometryError> {
        let (sum_lon, sum_lat, count) = self
            .vertices()
            .fold((0.0, 0.0, 0usize), |(lon, lat, n), c| (lon + c.x, lat + c.y, n + 1));

        if count == 0 {
            return Err(GeometryError::Malformed("geometry has no vertices".to_string()));
        }

        let centroid = Centroid {
            lon: sum_lon / count as f64,
            lat: sum_lat / count as f64,
        };
        if !centroid.lon.is_finite() || !centroid.lat.is_finite() {
            return Err(GeometryError::Malformed("centroid is not finite".to_string()));
        }
        Ok(centroid)
    }

    /// Geodesic area in hectares; holes are subtracted, points have no area
    pub fn area_hectares(&self) -> f64 {
        let square_meters = match self {
            Geometry::Point(_) => 0.0,
            Geometry::Polygon(polygon) => polygon_area(polygon),
            Geometry::MultiPolygon(polygons) => polygons.iter().map(polygon_area).sum(),
        };
        square_meters / SQUARE_METERS_PER_HECTARE
    }

    /// Geometry suitable for services that need an area: points become a
    /// small box around the point.
    pub fn to_area_geometry(&self) -> Geometry {
        match self {
            Geometry::Point(point) => {
                let d = POINT_BUFFER_DEG;
                let rect = Rect::new(
                    coord! { x: point.x() - d, y: point.y() - d },
                    coord! { x: point.x() + d, y: point.y() + d },
                );
                Geometry::Polygon(rect.to_polygon())
            }
            other => other.clone(),
        }
    }

    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point(Point::new(lon, lat))
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        let value = match self {
            Geometry::Point(point) => geojson::Value::from(point),
            Geometry::Polygon(polygon) => geojson::Value::from(polygon),
            Geometry::MultiPolygon(polygons) => geojson::Value::from(polygons),
        };
        geojson::Geometry::new(value)
    }

    fn vertices(&self) -> Box<dyn Iterator<Item = Coord<f64>> + '_> {
        match self {
            Geometry::Point(point) => Box::new(std::iter::once(point.0)),
            Geometry::Polygon(polygon) => Box::new(polygon_vertices(polygon)),
            Geometry::MultiPolygon(polygons) => {
                Box::new(polygons.iter().flat_map(polygon_vertices))
            }
        }
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_geojson().serialize(serializer)
    }
}

fn type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn to_coord(position: &[f64]) -> Result<Coord<f64>, GeometryError> {
    if position.len() < 2 {
        return Err(GeometryError::Malformed(
            "position needs longitude and latitude".to_string(),
        ));
    }
    let (lon, lat) = (position[0], position[1]);
    if !lon.is_finite() || !lat.is_finite() {
        return Err(GeometryError::Malformed("non-finite coordinate".to_string()));
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(GeometryError::Malformed(format!(
            "coordinate out of range: [{}, {}]",
            lon, lat
        )));
    }
    Ok(coord! { x: lon, y: lat })
}

fn to_ring(positions: &[Vec<f64>]) -> Result<LineString<f64>, GeometryError> {
    let coords = positions
        .iter()
        .map(|p| to_coord(p))
        .collect::<Result<Vec<_>, _>>()?;
    let mut ring = LineString::new(coords);
    ring.close();
    if ring.0.len() < 4 {
        return Err(GeometryError::Malformed(
            "polygon ring needs at least three distinct vertices".to_string(),
        ));
    }
    Ok(ring)
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, GeometryError> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| GeometryError::Malformed("polygon has no rings".to_string()))?;
    let interiors = interiors
        .iter()
        .map(|ring| to_ring(ring))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(to_ring(exterior)?, interiors))
}

fn polygon_vertices(polygon: &Polygon<f64>) -> impl Iterator<Item = Coord<f64>> + '_ {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(|ring| ring.coords_iter().take(ring.0.len().saturating_sub(1)))
}

/// Outer ring minus holes, each ring measured on its own
fn polygon_area(polygon: &Polygon<f64>) -> f64 {
    let ring_area = |ring: &LineString<f64>| {
        Polygon::new(ring.clone(), Vec::new()).chamberlain_duquette_unsigned_area()
    };
    let outer = ring_area(polygon.exterior());
    let holes: f64 = polygon.interiors().iter().map(ring_area).sum();
    (outer - holes).max(0.0)
}
