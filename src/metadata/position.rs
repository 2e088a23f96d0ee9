//! Position validation for a visit.
//!
//! Positions are delivered as WGS84 degree-minute values (`DDMM.mmm`)
//! or, from some providers, as SWEREF99 TM grid coordinates. Grid
//! coordinates are recognized by their magnitude and converted with a
//! Gauss-Kruger inverse projection on the GRS80 ellipsoid before the
//! common rough-area test: monitoring positions must fall inside the
//! box latitude 53°48'-66°00' N, longitude 4°00'-31°00' E.
use super::{MetadataFlag, MetadataQcField, Visit};

const SOUTHERN_LIMIT: f64 = 5348.0;
const NORTHERN_LIMIT: f64 = 6600.0;
const WESTERN_LIMIT: f64 = 400.0;
const EASTERN_LIMIT: f64 = 3100.0;

// SWEREF99 TM coverage in grid meters; values outside cannot be grid
// coordinates and values inside cannot be sane degree-minutes.
const SWEREF_NORTHING: (f64, f64) = (6_090_353.78, 7_689_478.31);
const SWEREF_EASTING: (f64, f64) = (181_896.33, 1_086_312.94);

pub(super) fn check(visit: &mut Visit) {
    let mut bad_position = false;

    for (latitude, longitude) in visit.positions() {
        let parsed = match (latitude.trim().parse::<f64>(), longitude.trim().parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Some((lat, lon)),
            _ => None,
        };

        let (lat_dm, lon_dm) = match parsed {
            Some((lat, lon)) if is_sweref99tm(lat, lon) => sweref99tm_to_wgs84_dm(lat, lon),
            Some((lat, lon)) if is_wgs84_dm(lat, lon) => (lat, lon),
            _ => {
                bad_position = true;
                visit.record_issue(
                    MetadataQcField::Position,
                    "LATIT, LONGI",
                    format!("Bad position format: {latitude}, {longitude}"),
                );
                continue;
            }
        };

        if !(SOUTHERN_LIMIT..=NORTHERN_LIMIT).contains(&lat_dm)
            || !(WESTERN_LIMIT..=EASTERN_LIMIT).contains(&lon_dm)
        {
            bad_position = true;
            visit.record_issue(
                MetadataQcField::Position,
                "LATIT, LONGI",
                format!("Position outside rough area: {lat_dm}, {lon_dm}"),
            );
        }
    }

    let flag = if bad_position {
        MetadataFlag::BadData
    } else {
        MetadataFlag::GoodData
    };
    visit.set_flag(MetadataQcField::Position, flag);
}

fn is_sweref99tm(northing: f64, easting: f64) -> bool {
    (SWEREF_NORTHING.0..=SWEREF_NORTHING.1).contains(&northing)
        && (SWEREF_EASTING.0..=SWEREF_EASTING.1).contains(&easting)
}

/// Split a `DDMM.mmm` value into whole degrees and decimal minutes.
fn split_degree_minutes(value: f64) -> (f64, f64) {
    let magnitude = value.abs();
    ((magnitude / 100.0).trunc(), magnitude % 100.0)
}

fn is_wgs84_dm(latitude: f64, longitude: f64) -> bool {
    let (lat_degrees, lat_minutes) = split_degree_minutes(latitude);
    let (lon_degrees, lon_minutes) = split_degree_minutes(longitude);
    lat_degrees <= 90.0 && lat_minutes < 60.0 && lon_degrees <= 180.0 && lon_minutes < 60.0
}

fn decimal_degrees_to_dm(dd: f64) -> f64 {
    let degrees = dd.trunc();
    degrees * 100.0 + (dd - degrees) * 60.0
}

/// Inverse Gauss-Kruger projection from SWEREF99 TM grid coordinates to
/// WGS84, returned in degree-minute form.
///
/// Uses Krüger's series on GRS80 with the SWEREF99 TM projection
/// parameters (central meridian 15° E, scale 0.9996, false easting
/// 500 km). The series is accurate to well below a millimeter over the
/// projection's coverage, far beyond what the rough-area test needs.
fn sweref99tm_to_wgs84_dm(northing: f64, easting: f64) -> (f64, f64) {
    // GRS80 ellipsoid.
    let axis: f64 = 6_378_137.0;
    let flattening: f64 = 1.0 / 298.257_222_101;
    // SWEREF99 TM projection parameters.
    let central_meridian: f64 = 15.0;
    let scale: f64 = 0.9996;
    let false_northing: f64 = 0.0;
    let false_easting: f64 = 500_000.0;

    let e2 = flattening * (2.0 - flattening);
    let n = flattening / (2.0 - flattening);
    let a_hat = axis / (1.0 + n) * (1.0 + n * n / 4.0 + n * n * n * n / 64.0);

    let xi = (northing - false_northing) / (scale * a_hat);
    let eta = (easting - false_easting) / (scale * a_hat);

    let delta1 = n / 2.0 - 2.0 * n.powi(2) / 3.0 + 37.0 * n.powi(3) / 96.0 - n.powi(4) / 360.0;
    let delta2 = n.powi(2) / 48.0 + n.powi(3) / 15.0 - 437.0 * n.powi(4) / 1440.0;
    let delta3 = 17.0 * n.powi(3) / 480.0 - 37.0 * n.powi(4) / 840.0;
    let delta4 = 4397.0 * n.powi(4) / 161_280.0;

    let xi_prime = xi
        - delta1 * (2.0 * xi).sin() * (2.0 * eta).cosh()
        - delta2 * (4.0 * xi).sin() * (4.0 * eta).cosh()
        - delta3 * (6.0 * xi).sin() * (6.0 * eta).cosh()
        - delta4 * (8.0 * xi).sin() * (8.0 * eta).cosh();
    let eta_prime = eta
        - delta1 * (2.0 * xi).cos() * (2.0 * eta).sinh()
        - delta2 * (4.0 * xi).cos() * (4.0 * eta).sinh()
        - delta3 * (6.0 * xi).cos() * (6.0 * eta).sinh()
        - delta4 * (8.0 * xi).cos() * (8.0 * eta).sinh();

    let phi_star = (xi_prime.sin() / eta_prime.cosh()).asin();
    let delta_lambda = (eta_prime.sinh() / xi_prime.cos()).atan();

    let a_star = e2 + e2.powi(2) + e2.powi(3) + e2.powi(4);
    let b_star = -(7.0 * e2.powi(2) + 17.0 * e2.powi(3) + 30.0 * e2.powi(4)) / 6.0;
    let c_star = (224.0 * e2.powi(3) + 889.0 * e2.powi(4)) / 120.0;
    let d_star = -(4279.0 * e2.powi(4)) / 1260.0;

    let sin_phi = phi_star.sin();
    let phi = phi_star
        + sin_phi
            * phi_star.cos()
            * (a_star + b_star * sin_phi.powi(2) + c_star * sin_phi.powi(4)
                + d_star * sin_phi.powi(6));

    let latitude_dd = phi.to_degrees();
    let longitude_dd = central_meridian + delta_lambda.to_degrees();
    (
        decimal_degrees_to_dm(latitude_dd),
        decimal_degrees_to_dm(longitude_dd),
    )
}
