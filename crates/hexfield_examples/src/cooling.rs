//! Water and cooling suitability for Texas data-center sites.
//!
//! The raw cooling value of a point blends three parts on a 0..100 scale:
//! - water availability interpolated from river-basin scores,
//! - a temperature score from interpolated annual normals (cooler is better), with a
//!   bonus for the elevated terrain of far West Texas,
//! - an aridity score from longitude (humid east, dry west).
use hexfield::prelude::*;
use serde::{Deserialize, Serialize};

/// Relative weight of each cooling component.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoolingWeights {
    pub water: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for CoolingWeights {
    fn default() -> Self {
        Self {
            water: 0.45,
            temperature: 0.40,
            humidity: 0.15,
        }
    }
}

impl CoolingWeights {
    pub fn validate(&self) -> Result<()> {
        let all = [self.water, self.temperature, self.humidity];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidConfig(
                "cooling weights must be finite and >= 0".into(),
            ));
        }
        if all.iter().sum::<f64>() <= 0.0 {
            return Err(Error::InvalidConfig(
                "at least one cooling weight must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Blend of basin water, temperature and aridity at a point.
#[derive(Clone, Debug)]
pub struct CoolingModel {
    water: IdwModel,
    temperature: IdwModel,
    /// Coolest and hottest annual mean (°F) mapped to temperature scores 100 and 0.
    temperature_range: (f64, f64),
    weights: CoolingWeights,
}

impl CoolingModel {
    pub fn new(
        water: IdwModel,
        temperature: IdwModel,
        temperature_range: (f64, f64),
        weights: CoolingWeights,
    ) -> Result<Self> {
        let (coolest, hottest) = temperature_range;
        if !coolest.is_finite() || !hottest.is_finite() || hottest <= coolest {
            return Err(Error::InvalidConfig(
                "temperature range must be finite with hottest > coolest".into(),
            ));
        }
        weights.validate()?;
        Ok(Self {
            water,
            temperature,
            temperature_range,
            weights,
        })
    }

    pub fn water_score(&self, p: GeoPoint) -> f64 {
        self.water.sample(p).clamp(0.0, 100.0)
    }

    pub fn temperature_score(&self, p: GeoPoint) -> f64 {
        let (coolest, hottest) = self.temperature_range;
        let t = self.temperature.sample(p);
        let score = (100.0 * (1.0 - (t - coolest) / (hottest - coolest))).clamp(0.0, 100.0);
        (score + elevation_bonus(p)).min(100.0)
    }

    pub fn humidity_score(&self, p: GeoPoint) -> f64 {
        humidity_score(p.lng)
    }
}

impl FieldModel for CoolingModel {
    fn sample(&self, p: GeoPoint) -> f64 {
        let w = &self.weights;
        let v = w.water * self.water_score(p)
            + w.temperature * self.temperature_score(p)
            + w.humidity * self.humidity_score(p);
        v.min(100.0)
    }
}

/// Highland proxy: west of 101°W and north of 29.5°N, up to 8 points.
fn elevation_bonus(p: GeoPoint) -> f64 {
    if p.lng < -101.0 && p.lat > 29.5 {
        ((p.lng.abs() - 101.0) * 2.0).min(8.0)
    } else {
        0.0
    }
}

/// Aridity from longitude: 35 at 96°W falling eastward, 65 at 100°W rising westward,
/// linear in between.
fn humidity_score(lng: f64) -> f64 {
    let score = if lng > -96.0 {
        35.0 - (lng + 96.0) * 5.0
    } else if lng < -100.0 {
        65.0 + (lng.abs() - 100.0) * 7.0
    } else {
        35.0 + (-96.0 - lng) / 4.0 * 30.0
    };
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CoolingModel {
        let water = IdwModel::new(
            vec![
                Station::new(31.5, -94.0, 92.0),
                Station::new(30.5, -102.5, 12.0),
            ],
            1.5,
        )
        .unwrap();
        let normals = IdwModel::new(
            vec![
                Station::new(26.2, -97.7, 73.5),
                Station::new(35.2, -101.8, 57.6),
            ],
            2.0,
        )
        .unwrap();
        CoolingModel::new(water, normals, (55.0, 74.5), CoolingWeights::default()).unwrap()
    }

    #[test]
    fn humidity_is_continuous_across_bands() {
        assert_eq!(humidity_score(-96.0), 35.0);
        assert_eq!(humidity_score(-100.0), 65.0);
        assert_eq!(humidity_score(-98.0), 50.0);
        assert_eq!(humidity_score(-94.0), 25.0);
        assert_eq!(humidity_score(-106.0), 100.0);
    }

    #[test]
    fn highlands_get_a_capped_bonus() {
        assert_eq!(elevation_bonus(GeoPoint::new(31.0, -102.0)), 2.0);
        assert_eq!(elevation_bonus(GeoPoint::new(31.8, -106.4)), 8.0);
        assert_eq!(elevation_bonus(GeoPoint::new(29.0, -103.0)), 0.0);
        assert_eq!(elevation_bonus(GeoPoint::new(31.0, -97.0)), 0.0);
    }

    #[test]
    fn components_stay_on_percent_scale() {
        let m = model();
        for &(lat, lng) in &[(26.2, -97.7), (35.2, -101.8), (31.5, -94.0), (30.0, -104.0)] {
            let p = GeoPoint::new(lat, lng);
            for v in [
                m.water_score(p),
                m.temperature_score(p),
                m.humidity_score(p),
                m.sample(p),
            ] {
                assert!((0.0..=100.0).contains(&v), "{v} at {lat},{lng}");
            }
        }
    }

    #[test]
    fn wet_east_beats_dry_west_on_water() {
        let m = model();
        assert!(m.water_score(GeoPoint::new(31.5, -94.2)) > m.water_score(GeoPoint::new(30.5, -102.3)));
    }

    #[test]
    fn invalid_ranges_and_weights_are_rejected() {
        let idw = || IdwModel::new(vec![Station::new(30.0, -97.0, 1.0)], 2.0).unwrap();
        assert!(CoolingModel::new(idw(), idw(), (70.0, 60.0), CoolingWeights::default()).is_err());
        let zero = CoolingWeights {
            water: 0.0,
            temperature: 0.0,
            humidity: 0.0,
        };
        assert!(CoolingModel::new(idw(), idw(), (55.0, 75.0), zero).is_err());
    }
}
